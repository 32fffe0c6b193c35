//! Selection bounding box: handle hit-testing and the resize/rotate affines
//! that dragging a handle produces.
//!
//! A box is a 4-point polygon, clockwise from its local top-left, plus the
//! rotation of its local frame. Every affine is built in that local frame and
//! conjugated back into world space, so rotated boxes resize along their own
//! edges.

#[cfg(test)]
#[path = "bbox_test.rs"]
mod bbox_test;

use serde::Serialize;

use crate::consts::{
    HANDLE_RADIUS_PX, MINVALUE, ROTATE_HANDLE_OFFSET_PX, ROTATE_HANDLE_RADIUS_PX, ROTATION_LOOSE_SNAP_DEG,
    ROTATION_SNAP_STEP,
};
use crate::geom::{AffineMatrix, Point, Polygon, Rect, Segment, is_on_polygon, polygon_center, snap_angle};

/// Which part of the box a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum BoxHit {
    /// Corner handle, 0-3 clockwise from the local top-left.
    Corner(usize),
    /// Edge handle; edge `i` joins corner `i` to corner `i + 1`.
    Segment(usize),
    Rotation,
    Area,
}

/// Handle sizes in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSizes {
    pub radius_px: f64,
    pub rotate_offset_px: f64,
    pub rotate_radius_px: f64,
}

impl Default for HandleSizes {
    fn default() -> Self {
        Self {
            radius_px: HANDLE_RADIUS_PX,
            rotate_offset_px: ROTATE_HANDLE_OFFSET_PX,
            rotate_radius_px: ROTATE_HANDLE_RADIUS_PX,
        }
    }
}

/// Fixed point and moving direction of a resize drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResizingBase {
    pub origin: Point,
    pub direction: Point,
}

impl ResizingBase {
    /// World position of the handle being dragged.
    #[must_use]
    pub fn handle(&self) -> Point {
        self.origin + self.direction
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeOptions {
    /// Force equal x/y factors.
    pub keep_aspect: bool,
    /// Scale around the box center instead of the opposite handle.
    pub centralize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub polygon: Polygon,
    pub rotation: f64,
    handles: HandleSizes,
}

impl BoundingBox {
    #[must_use]
    pub fn new(polygon: Polygon, rotation: f64) -> Self {
        Self { polygon, rotation, handles: HandleSizes::default() }
    }

    #[must_use]
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.to_polygon(), 0.0)
    }

    #[must_use]
    pub fn with_handles(mut self, handles: HandleSizes) -> Self {
        self.handles = handles;
        self
    }

    #[must_use]
    pub fn center(&self) -> Point {
        polygon_center(&self.polygon)
    }

    fn edge(&self, i: usize) -> Segment {
        Segment(self.polygon[i % 4], self.polygon[(i + 1) % 4])
    }

    /// Center of the rotate handle: outside the top-right corner along the diagonal.
    #[must_use]
    pub fn rotation_anchor(&self, scale: f64) -> Point {
        let corner = self.polygon[1];
        let mut outward = (corner - self.center()).normalize();
        if outward.length() < MINVALUE {
            outward = Point::new(0.0, -1.0).rotate(self.rotation);
        }
        corner + outward * (self.handles.rotate_offset_px / safe_scale(scale))
    }

    /// Classify `p`. Corners win over edges, edges over the rotate handle,
    /// and the rotate handle over the interior.
    ///
    /// Inside the box the handle tolerance is capped at a quarter of the
    /// short side, so small boxes keep an interior that hits as `Area`.
    #[must_use]
    pub fn hit_test(&self, p: Point, scale: f64) -> Option<BoxHit> {
        let scale = safe_scale(scale);
        let inside = is_on_polygon(p, &self.polygon);
        let mut tolerance = self.handles.radius_px / scale;
        let short_side = self.edge(0).direction().length().min(self.edge(1).direction().length());
        if inside && short_side > MINVALUE {
            tolerance = tolerance.min(short_side / 4.0);
        }

        if let Some(i) = (0..4).find(|&i| self.polygon[i].distance(p) <= tolerance) {
            return Some(BoxHit::Corner(i));
        }
        if let Some(i) = (0..4).find(|&i| {
            let edge = self.edge(i);
            edge.direction().length() > MINVALUE && edge.distance_to(p) <= tolerance
        }) {
            return Some(BoxHit::Segment(i));
        }
        if self.rotation_anchor(scale).distance(p) <= self.handles.rotate_radius_px / scale {
            return Some(BoxHit::Rotation);
        }
        if inside {
            return Some(BoxHit::Area);
        }
        None
    }

    /// Fixed origin and drag direction for a corner or edge handle.
    #[must_use]
    pub fn get_resizing_base(&self, hit: BoxHit) -> Option<ResizingBase> {
        match hit {
            BoxHit::Corner(i) => {
                let origin = self.polygon[(i + 2) % 4];
                Some(ResizingBase { origin, direction: self.polygon[i % 4] - origin })
            }
            BoxHit::Segment(i) => {
                let origin = self.edge(i + 2).midpoint();
                Some(ResizingBase { origin, direction: self.edge(i).midpoint() - origin })
            }
            BoxHit::Rotation | BoxHit::Area => None,
        }
    }

    /// Resize session for a handle hit, or `None` for the rotate handle and interior.
    #[must_use]
    pub fn resizing(&self, hit: BoxHit) -> Option<BoundingBoxResizing> {
        self.get_resizing_base(hit)
            .map(|base| BoundingBoxResizing { base, center: self.center(), rotation: self.rotation })
    }

    /// Rotation session around the box center.
    #[must_use]
    pub fn rotating(&self) -> BoundingBoxRotating {
        BoundingBoxRotating::new(self.center(), self.rotation)
    }
}

fn safe_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > MINVALUE { scale } else { 1.0 }
}

// =============================================================
// Resizing
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxResizing {
    pub base: ResizingBase,
    center: Point,
    rotation: f64,
}

impl BoundingBoxResizing {
    /// Affine for the handle dragged by `diff` (world units).
    ///
    /// Factors are `(dir + diff) / dir` per local axis. An axis the handle does
    /// not move along, or a zero-length one, keeps factor 1.
    #[must_use]
    pub fn get_affine(&self, diff: Point, options: ResizeOptions) -> AffineMatrix {
        let (origin, direction) = if options.centralize {
            (self.center, self.base.handle() - self.center)
        } else {
            (self.base.origin, self.base.direction)
        };
        let local_dir = direction.rotate(-self.rotation);
        let local_diff = diff.rotate(-self.rotation);

        let x_active = local_dir.x.abs() > MINVALUE;
        let y_active = local_dir.y.abs() > MINVALUE;
        let mut sx = if x_active { (local_dir.x + local_diff.x) / local_dir.x } else { 1.0 };
        let mut sy = if y_active { (local_dir.y + local_diff.y) / local_dir.y } else { 1.0 };

        if options.keep_aspect {
            let s = match (x_active, y_active) {
                (true, true) => sx.max(sy),
                (true, false) => sx,
                (false, true) => sy,
                (false, false) => 1.0,
            };
            sx = s;
            sy = s;
        }
        if !sx.is_finite() || !sy.is_finite() {
            return AffineMatrix::IDENTITY;
        }

        AffineMatrix::rotate_around(origin, self.rotation)
            .then_after(&AffineMatrix::scale_around(origin, sx, sy))
            .then_after(&AffineMatrix::rotate_around(origin, -self.rotation))
    }
}

// =============================================================
// Rotating
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxRotating {
    pub origin: Point,
    /// Rotation of the box when the drag started.
    pub rotation: f64,
    loose_snap: f64,
}

impl BoundingBoxRotating {
    #[must_use]
    pub fn new(origin: Point, rotation: f64) -> Self {
        Self { origin, rotation, loose_snap: ROTATION_LOOSE_SNAP_DEG.to_radians() }
    }

    #[must_use]
    pub fn with_loose_snap_deg(mut self, degrees: f64) -> Self {
        self.loose_snap = degrees.to_radians();
        self
    }

    /// Absolute box rotation the drag from `start` to `current` lands on.
    #[must_use]
    pub fn get_target_rotation(&self, start: Point, current: Point, force_snap: bool) -> f64 {
        let from = start - self.origin;
        let to = current - self.origin;
        if from.length() < MINVALUE || to.length() < MINVALUE {
            return self.rotation;
        }
        let target = self.rotation + (to.angle() - from.angle());
        let snapped = snap_angle(target, ROTATION_SNAP_STEP);
        if force_snap || (target - snapped).abs() < self.loose_snap { snapped } else { target }
    }

    /// Pure rotation about `origin` taking the box from its start rotation to
    /// the dragged one.
    #[must_use]
    pub fn get_affine(&self, start: Point, current: Point, force_snap: bool) -> AffineMatrix {
        let delta = self.get_target_rotation(start, current, force_snap) - self.rotation;
        if delta.abs() < MINVALUE || !delta.is_finite() {
            return AffineMatrix::IDENTITY;
        }
        AffineMatrix::rotate_around(self.origin, delta)
    }
}
