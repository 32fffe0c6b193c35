//! Attachment helpers: keep attached shapes consistent with their hosts.

#[cfg(test)]
#[path = "attach_test.rs"]
mod attach_test;

use crate::composite::{AttachKind, SceneComposite};
use crate::doc::{Attachment, AttachmentRotation, PartialShape, PatchMap, Shape, ShapeKind};
use crate::geom::{Point, approx_eq, normalize_radian, radian_eq};
use crate::shape::line_points;

/// Attachment to store alongside a rotation change to `rotation`.
///
/// Only relative attachments carry their rotation as an offset from the
/// host, so only they change. Returns `None` when nothing needs patching.
#[must_use]
pub fn get_attachment_by_updating_rotation(shape: &Shape, rotation: f64) -> Option<Attachment> {
    let attachment = shape.attachment.as_ref()?;
    if attachment.rotation_type != AttachmentRotation::Relative || radian_eq(rotation, shape.rotation) {
        return None;
    }
    Some(Attachment {
        rotation: normalize_radian(attachment.rotation + (rotation - shape.rotation)),
        ..attachment.clone()
    })
}

/// Add attachment patches for every shape in `patch` that carries a relative
/// attachment and has a rotation change.
#[must_use]
pub fn with_attachment_rotation(composite: &SceneComposite, mut patch: PatchMap) -> PatchMap {
    for (id, partial) in &mut patch {
        let (Some(rotation), Ok(shape)) = (partial.rotation, composite.merged_shape(id)) else {
            continue;
        };
        if let Some(attachment) = get_attachment_by_updating_rotation(shape, rotation) {
            partial.attachment = Some(attachment);
        }
    }
    patch
}

/// World point a rate coordinate refers to on `host`.
#[must_use]
pub fn host_point(host: &Shape, to: Point) -> Point {
    if host.kind == ShapeKind::Line {
        let (p, q) = line_points(host);
        return p + (q - p) * to.x;
    }
    box_point(host, to)
}

/// Direction of a line host, in radians.
#[must_use]
pub fn host_angle(host: &Shape) -> f64 {
    if host.kind == ShapeKind::Line {
        let (p, q) = line_points(host);
        return (q - p).angle();
    }
    host.rotation
}

/// World point at a rate coordinate inside a box shape.
fn box_point(shape: &Shape, rate: Point) -> Point {
    let local = shape.p + Point::new(shape.width * rate.x, shape.height * rate.y);
    let center = shape.p + Point::new(shape.width * 0.5, shape.height * 0.5);
    local.rotate_around(center, shape.rotation)
}

/// Patches moving shapes attached to line hosts changed in `patch`, so their
/// anchor stays on the host. Shapes already in `patch` are left alone.
#[must_use]
pub fn follow_line_hosts(composite: &SceneComposite, patch: &PatchMap) -> PatchMap {
    let mut out = PatchMap::new();
    for shape in composite.merged_shapes() {
        if patch.contains_key(&shape.id) || !composite.attached(shape, AttachKind::Line) {
            continue;
        }
        let Some(attachment) = shape.attachment.as_ref() else {
            continue;
        };
        let Some(host_patch) = patch.get(&attachment.id) else {
            continue;
        };
        let Ok(host) = composite.merged_shape(&attachment.id) else {
            continue;
        };
        let host_after = host.patched(host_patch);

        let mut next = PartialShape::default();
        let mut moved = shape.clone();
        if attachment.rotation_type == AttachmentRotation::Relative {
            let rotation = normalize_radian(host_angle(&host_after) + attachment.rotation);
            if !radian_eq(rotation, shape.rotation) {
                next.rotation = Some(rotation);
                moved.rotation = rotation;
            }
        }
        let diff = host_point(&host_after, attachment.to) - box_point(&moved, attachment.anchor);
        if !approx_eq(diff.x, 0.0) || !approx_eq(diff.y, 0.0) {
            next.p = Some(shape.p + diff);
        }
        if !next.is_empty() {
            out.insert(shape.id.clone(), next);
        }
    }
    out
}
