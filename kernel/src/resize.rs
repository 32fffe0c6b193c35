//! Tree-constrained resize: apply one affine to a set of shape branches while
//! honoring each child's group constraints.
//!
//! DESIGN
//! ======
//! The walk runs root-to-leaf over a sub-composite holding only the affected
//! branches. Walk roots receive the caller's affine unchanged. Every group on
//! the way computes a [`GroupResizeContext`] describing its frame before and
//! after the resize; each child is measured in that frame twice (before, and
//! after the naive inherited affine) and its `gcV`/`gcH` constraints produce a
//! correction applied on top of the inherited affine.
//!
//! Both axes go through the same 1D rule ([`constrain_axis`]), called with x
//! components for `gcH` and y components for `gcV`, so the two directions
//! cannot drift apart.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use std::collections::HashSet;

use crate::composite::SceneComposite;
use crate::consts::MINVALUE;
use crate::doc::{GroupConstraint, PatchMap, Shape, ShapeId};
use crate::geom::{AffineMatrix, Polygon, Rect, derotated_rect, polygon_center};
use crate::shape::ShapeContext;

/// 1D span along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub size: f64,
}

impl Interval {
    #[must_use]
    pub const fn new(start: f64, size: f64) -> Self {
        Self { start, size }
    }

    fn end(self) -> f64 {
        self.start + self.size
    }

    fn horizontal(rect: &Rect) -> Self {
        Self::new(rect.x, rect.width)
    }

    fn vertical(rect: &Rect) -> Self {
        Self::new(rect.y, rect.height)
    }
}

/// Where a constrained child lands on one axis.
///
/// `parent_before`/`child_before` are measured before the resize,
/// `parent_after` is the resized parent and `naive` is the child after the
/// unconstrained inherited affine.
#[must_use]
pub fn constrain_axis(
    gc: GroupConstraint,
    parent_before: Interval,
    child_before: Interval,
    parent_after: Interval,
    naive: Interval,
) -> Interval {
    let m0 = child_before.start - parent_before.start;
    let m1 = parent_before.end() - child_before.end();
    let q0 = parent_after.start;
    let ql = parent_after.size;
    let cl = child_before.size;
    let nl = naive.size;

    match gc {
        GroupConstraint::None => naive,
        GroupConstraint::PinStart => Interval::new(q0 + m0, nl),
        GroupConstraint::PinCenter => {
            let rate = if parent_before.size.abs() < MINVALUE {
                0.5
            } else {
                (child_before.start + cl * 0.5 - parent_before.start) / parent_before.size
            };
            Interval::new(q0 + rate * ql - cl * 0.5, cl)
        }
        GroupConstraint::PinEnd => Interval::new(q0 + ql - m1 - nl, nl),
        GroupConstraint::PinStartSize => Interval::new(q0 + m0, cl),
        GroupConstraint::PinStartEnd => Interval::new(q0 + m0, (ql - m0 - m1).max(0.0)),
        GroupConstraint::PinSizeEnd => Interval::new(q0 + ql - m1 - cl, cl),
    }
}

/// A group's frame before and after the resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupResizeContext {
    /// Affine the group itself received; children inherit it.
    pub affine: AffineMatrix,
    /// Group rect in its own frame before the resize.
    pub src_rect: Rect,
    /// Group rect in its own frame after the resize.
    pub resized_rect: Rect,
    /// Into the pre-resize frame.
    pub derotate_before: AffineMatrix,
    /// Into the post-resize frame.
    pub derotate_after: AffineMatrix,
    /// Out of the post-resize frame.
    pub rotate_after: AffineMatrix,
}

impl GroupResizeContext {
    #[must_use]
    pub fn new(ctx: &dyn ShapeContext, group: &Shape, affine: &AffineMatrix, rotation_after: f64) -> Self {
        let before = ctx.local_rect_polygon(group);
        let after = affine.apply_polygon(&before);
        let center_before = polygon_center(&before);
        let center_after = polygon_center(&after);
        Self {
            affine: *affine,
            src_rect: derotated_rect(&before, center_before, group.rotation),
            resized_rect: derotated_rect(&after, center_after, rotation_after),
            derotate_before: AffineMatrix::rotate_around(center_before, -group.rotation),
            derotate_after: AffineMatrix::rotate_around(center_after, -rotation_after),
            rotate_after: AffineMatrix::rotate_around(center_after, rotation_after),
        }
    }

    /// Affine for a direct child: the inherited affine, corrected by the
    /// child's constraints when it has any.
    #[must_use]
    pub fn child_affine(&self, ctx: &dyn ShapeContext, child: &Shape) -> AffineMatrix {
        let (gc_v, gc_h) = (child.gc_v(), child.gc_h());
        if gc_v == GroupConstraint::None && gc_h == GroupConstraint::None {
            return self.affine;
        }
        let poly = ctx.local_rect_polygon(child);
        let before = wrap(&self.derotate_before.apply_polygon(&poly));
        let naive = wrap(&self.derotate_after.apply_polygon(&self.affine.apply_polygon(&poly)));

        let x = constrain_axis(
            gc_h,
            Interval::horizontal(&self.src_rect),
            Interval::horizontal(&before),
            Interval::horizontal(&self.resized_rect),
            Interval::horizontal(&naive),
        );
        let y = constrain_axis(
            gc_v,
            Interval::vertical(&self.src_rect),
            Interval::vertical(&before),
            Interval::vertical(&self.resized_rect),
            Interval::vertical(&naive),
        );

        let sx = if naive.width.abs() < MINVALUE { 1.0 } else { x.size / naive.width };
        let sy = if naive.height.abs() < MINVALUE { 1.0 } else { y.size / naive.height };
        let local = AffineMatrix([sx, 0.0, 0.0, sy, x.start - sx * naive.x, y.start - sy * naive.y]);
        if local.is_identity() || !local.is_finite() {
            return self.affine;
        }
        let adjust = self.rotate_after.then_after(&local).then_after(&self.derotate_after);
        adjust.then_after(&self.affine)
    }
}

fn wrap(polygon: &Polygon) -> Rect {
    Rect::wrap_points(polygon.iter().copied()).unwrap_or_default()
}

/// Patch every shape in the branches under `ids` for `affine`.
///
/// Ids nested under another targeted id are reached through that ancestor.
/// Only non-empty patches are returned, so the identity yields an empty map.
#[must_use]
pub fn resize_shape_trees(composite: &SceneComposite, ids: &[ShapeId], affine: &AffineMatrix) -> PatchMap {
    let mut out = PatchMap::new();
    if affine.is_identity() || !affine.is_finite() {
        return out;
    }

    let targets: HashSet<&str> = ids.iter().map(String::as_str).filter(|id| composite.contains(id)).collect();
    let mut roots: Vec<ShapeId> = Vec::new();
    for id in ids {
        if targets.contains(id.as_str()) && !composite.has_ancestor_in(id, &targets) && !roots.contains(id) {
            roots.push(id.clone());
        }
    }
    if roots.is_empty() {
        return out;
    }

    let branch: Vec<Shape> = composite
        .get_all_branch_merged_shapes(&roots)
        .into_iter()
        .map(|mut s| {
            if roots.contains(&s.id) {
                s.parent_id = None;
            }
            s
        })
        .collect();
    let sub = match SceneComposite::new(branch) {
        Ok(sub) => sub,
        Err(e) => {
            tracing::error!(error = %e, "failed to build resize sub-composite");
            return out;
        }
    };

    for root in &roots {
        if let Ok(shape) = sub.merged_shape(root) {
            walk(&sub, shape, affine, &mut out);
        }
    }
    out
}

fn walk(sub: &SceneComposite, shape: &Shape, affine: &AffineMatrix, out: &mut PatchMap) {
    let patch = sub.transform_shape(shape, affine);
    let rotation_after = patch.rotation.unwrap_or(shape.rotation);
    if !patch.is_empty() {
        out.insert(shape.id.clone(), patch);
    }
    if !shape.is_group() {
        return;
    }

    let context = GroupResizeContext::new(sub, shape, affine, rotation_after);
    for child in sub.children_of(&shape.id) {
        let child_affine = context.child_affine(sub, child);
        walk(sub, child, &child_affine, out);
    }
}
