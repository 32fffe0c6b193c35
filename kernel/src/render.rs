//! Render overlay: the interaction layer drawn on top of the shapes.
//!
//! The kernel never touches a drawing surface. States describe what the
//! rendering collaborator should draw for the current gesture (selection box,
//! handles, snap guides, a draft shape) by filling a [`RenderOverlay`]. Shapes
//! themselves are drawn by the collaborator from the merged shape list.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::bbox::BoundingBox;
use crate::doc::Shape;
use crate::geom::{Point, Polygon, Segment};

/// Selection UI for one bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOverlay {
    pub polygon: Polygon,
    pub rotation: f64,
    /// Corner handles then edge midpoints, both clockwise from top-left.
    pub handles: Vec<Point>,
    pub rotation_anchor: Point,
}

impl SelectionOverlay {
    #[must_use]
    pub fn new(bbox: &BoundingBox, scale: f64) -> Self {
        let corners = bbox.polygon.iter().copied();
        let midpoints = (0..4).map(|i| bbox.polygon[i].midpoint(bbox.polygon[(i + 1) % 4]));
        Self {
            polygon: bbox.polygon,
            rotation: bbox.rotation,
            handles: corners.chain(midpoints).collect(),
            rotation_anchor: bbox.rotation_anchor(scale),
        }
    }
}

/// Everything the interaction layer wants drawn this frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOverlay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionOverlay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapping_lines: Vec<Segment>,
    /// Shape being drawn but not yet created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<Shape>,
}

impl RenderOverlay {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_none() && self.snapping_lines.is_empty() && self.draft.is_none()
    }

    pub fn draw_selection(&mut self, bbox: &BoundingBox, scale: f64) {
        self.selection = Some(SelectionOverlay::new(bbox, scale));
    }
}
