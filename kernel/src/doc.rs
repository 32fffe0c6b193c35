//! Document model: shapes, their optional relations, and sparse patches.
//!
//! This module defines the record every shape is stored as (`Shape`), the
//! tag that selects its geometry implementation (`ShapeKind`), the sparse
//! update produced by gestures (`PartialShape`, collected in a `PatchMap`),
//! and the two optional relations a shape can carry: an `Attachment` to a
//! host shape and per-axis `GroupConstraint`s toward its parent group.
//!
//! Shapes arrive from the persistence collaborator as JSON and leave the
//! kernel only as patch maps; nothing in here knows about geometry.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Unique identifier for a shape.
pub type ShapeId = String;

/// Sparse updates keyed by shape id.
pub type PatchMap = HashMap<ShapeId, PartialShape>;

/// The kind of a shape. Selects the [`crate::shape::ShapeStruct`] that governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle of `width` x `height`, rotated around its center.
    Rectangle,
    /// Ellipse inscribed in its `width` x `height` box.
    Ellipse,
    /// Straight segment from `p` to `q`.
    Line,
    /// Container whose geometry is always derived from its children.
    Group,
}

/// How an attached shape's rotation relates to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentRotation {
    /// Rotation is stored as-is and ignores the host.
    #[default]
    Absolute,
    /// Rotation is an offset from the host's own direction.
    Relative,
}

/// Anchoring of a shape to a point on a host shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Host shape id.
    pub id: ShapeId,
    /// Rate coordinate on the host. For a line host `to.x` is the rate from `p` to `q`.
    pub to: Point,
    /// Rate coordinate inside the attached shape's own box that sits on `to`.
    pub anchor: Point,
    #[serde(default)]
    pub rotation_type: AttachmentRotation,
    /// Rotation offset used when `rotation_type` is relative.
    #[serde(default)]
    pub rotation: f64,
}

/// Per-axis behavior of a child when an ancestor group is resized.
///
/// Serialized as the integers 0-6. Unknown integers read back as `None`
/// so a bad value never blocks a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GroupConstraint {
    /// Scale with the group.
    #[default]
    None,
    /// Keep the start margin.
    PinStart,
    /// Keep the size and the center rate.
    PinCenter,
    /// Keep the end margin.
    PinEnd,
    /// Keep the start margin and the size.
    PinStartSize,
    /// Keep both margins; the size stretches.
    PinStartEnd,
    /// Keep the size and the end margin.
    PinSizeEnd,
}

impl From<u8> for GroupConstraint {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::PinStart,
            2 => Self::PinCenter,
            3 => Self::PinEnd,
            4 => Self::PinStartSize,
            5 => Self::PinStartEnd,
            6 => Self::PinSizeEnd,
            _ => Self::None,
        }
    }
}

impl From<GroupConstraint> for u8 {
    fn from(value: GroupConstraint) -> Self {
        match value {
            GroupConstraint::None => 0,
            GroupConstraint::PinStart => 1,
            GroupConstraint::PinCenter => 2,
            GroupConstraint::PinEnd => 3,
            GroupConstraint::PinStartSize => 4,
            GroupConstraint::PinStartEnd => 5,
            GroupConstraint::PinSizeEnd => 6,
        }
    }
}

/// A shape as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Parent group, if any. A weak reference resolved through the composite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ShapeId>,
    /// Top-left of the unrotated box, or the start point of a line.
    pub p: Point,
    /// Clockwise rotation in radians around the box center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// End point of a line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, rename = "gcV", skip_serializing_if = "Option::is_none")]
    pub gc_v: Option<GroupConstraint>,
    #[serde(default, rename = "gcH", skip_serializing_if = "Option::is_none")]
    pub gc_h: Option<GroupConstraint>,
}

impl Shape {
    /// A bare shape of `kind` at the origin. Mostly useful as a builder seed.
    #[must_use]
    pub fn new(id: impl Into<ShapeId>, kind: ShapeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parent_id: None,
            p: Point::default(),
            rotation: 0.0,
            width: 0.0,
            height: 0.0,
            q: None,
            attachment: None,
            gc_v: None,
            gc_h: None,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == ShapeKind::Group
    }

    /// Vertical constraint, treating an absent value as none.
    #[must_use]
    pub fn gc_v(&self) -> GroupConstraint {
        self.gc_v.unwrap_or_default()
    }

    /// Horizontal constraint, treating an absent value as none.
    #[must_use]
    pub fn gc_h(&self) -> GroupConstraint {
        self.gc_h.unwrap_or_default()
    }

    /// Apply a partial update in place.
    pub fn apply_partial(&mut self, partial: &PartialShape) {
        if let Some(p) = partial.p {
            self.p = p;
        }
        if let Some(r) = partial.rotation {
            self.rotation = r;
        }
        if let Some(w) = partial.width {
            self.width = w;
        }
        if let Some(h) = partial.height {
            self.height = h;
        }
        if let Some(q) = partial.q {
            self.q = Some(q);
        }
        if let Some(ref attachment) = partial.attachment {
            self.attachment = Some(attachment.clone());
        }
    }

    /// A copy with `partial` applied.
    #[must_use]
    pub fn patched(&self, partial: &PartialShape) -> Self {
        let mut next = self.clone();
        next.apply_partial(partial);
        next
    }
}

/// Sparse update for a shape. Only present fields are applied.
///
/// The parent relation is deliberately absent: gestures never reparent, so a
/// patch can never introduce a cycle into the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl PartialShape {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.p.is_none()
            && self.rotation.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.q.is_none()
            && self.attachment.is_none()
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        if other.p.is_some() {
            self.p = other.p;
        }
        if other.rotation.is_some() {
            self.rotation = other.rotation;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
        if other.q.is_some() {
            self.q = other.q;
        }
        if other.attachment.is_some() {
            self.attachment.clone_from(&other.attachment);
        }
        self
    }
}

/// Merge `next` into `base` shape by shape, field by field.
#[must_use]
pub fn merge_patch_maps(mut base: PatchMap, next: &PatchMap) -> PatchMap {
    for (id, patch) in next {
        let merged = base.remove(id).unwrap_or_default().merge(patch);
        if !merged.is_empty() {
            base.insert(id.clone(), merged);
        }
    }
    base
}

/// Apply a patch map to a list of shapes, preserving order.
#[must_use]
pub fn patch_shapes(shapes: &[Shape], patch: &PatchMap) -> Vec<Shape> {
    shapes
        .iter()
        .map(|s| match patch.get(&s.id) {
            Some(partial) => s.patched(partial),
            None => s.clone(),
        })
        .collect()
}
