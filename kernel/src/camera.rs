//! Pan/zoom view over the world.
//!
//! Events reach the kernel in world coordinates, so the camera is only used
//! to derive the view `scale` and to pan in response to wheel and middle-drag
//! gestures. The rendering collaborator reads it back to position the scene.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::MINVALUE;
use crate::geom::Point;

/// `pan` is the screen position of the world origin, in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan: Point::default(), zoom: 1.0 }
    }
}

impl Camera {
    /// Zoom, or 1 when the stored value is unusable.
    #[must_use]
    pub fn scale(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > MINVALUE { self.zoom } else { 1.0 }
    }

    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale()
    }

    /// Shift the view by a screen-space delta. Non-finite deltas are ignored.
    pub fn pan_by(&mut self, screen_delta: Point) {
        if screen_delta.is_finite() {
            self.pan = self.pan + screen_delta;
        }
    }

    /// Shift the view so the world moves by `world_delta` under the pointer.
    pub fn pan_by_world(&mut self, world_delta: Point) {
        self.pan_by(world_delta * self.scale());
    }
}
