//! Kernel tunables.
//!
//! Every field has a default from [`crate::consts`], so a partial JSON file
//! (or none at all) yields a usable configuration.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::bbox::HandleSizes;
use crate::consts::{
    DEFAULT_SHAPE_SIZE, HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX, ROTATE_HANDLE_RADIUS_PX, ROTATION_LOOSE_SNAP_DEG,
    SNAP_THRESHOLD_PX,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KernelConfig {
    /// Snap distance in screen pixels.
    pub snap_threshold_px: f64,
    /// Grid spacing in world units; `None` disables grid snapping.
    pub grid_size: Option<f64>,
    pub handle_radius_px: f64,
    pub rotate_handle_offset_px: f64,
    pub rotate_handle_radius_px: f64,
    pub rotation_loose_snap_deg: f64,
    /// Size of a shape created by a click without drag.
    pub default_shape_size: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            snap_threshold_px: SNAP_THRESHOLD_PX,
            grid_size: None,
            handle_radius_px: HANDLE_RADIUS_PX,
            rotate_handle_offset_px: ROTATE_HANDLE_OFFSET_PX,
            rotate_handle_radius_px: ROTATE_HANDLE_RADIUS_PX,
            rotation_loose_snap_deg: ROTATION_LOOSE_SNAP_DEG,
            default_shape_size: DEFAULT_SHAPE_SIZE,
        }
    }
}

impl KernelConfig {
    #[must_use]
    pub fn handle_sizes(&self) -> HandleSizes {
        HandleSizes {
            radius_px: self.handle_radius_px,
            rotate_offset_px: self.rotate_handle_offset_px,
            rotate_radius_px: self.rotate_handle_radius_px,
        }
    }

    /// Grid size if it is usable for snapping.
    #[must_use]
    pub fn grid(&self) -> Option<f64> {
        self.grid_size.filter(|g| g.is_finite() && *g > 0.0)
    }
}
