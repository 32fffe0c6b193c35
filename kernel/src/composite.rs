//! Scene composite: an immutable, per-revision index over the shape list.
//!
//! DESIGN
//! ======
//! A `SceneComposite` is built from the committed shape list plus an optional
//! temporary patch map (the live-drag overlay). It owns both views: the
//! committed `shapes` and the `merged` shapes with the overlay applied. The
//! parent/child tree is derived from `parent_id` back-references and is
//! validated to be acyclic at build time, so every later walk can recurse
//! without cycle checks.
//!
//! A composite is never mutated. Any change to the shapes or the overlay
//! produces a new composite; the cached leaf polygons therefore can never go
//! stale. Group polygons are not cached; they fold over the descendants on
//! every call.

#[cfg(test)]
#[path = "composite_test.rs"]
mod composite_test;

use std::collections::{HashMap, HashSet};

use crate::doc::{PartialShape, PatchMap, Shape, ShapeId, ShapeKind, patch_shapes};
use crate::geom::{AffineMatrix, Point, Polygon, Rect};
use crate::shape::{ShapeContext, ShapeRegistry};
use crate::snap::{SnappingLines, rect_snapping_lines};

/// Error returned by composite lookups and construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositeError {
    /// The id is not part of this composite.
    #[error("unknown shape: {0}")]
    UnknownShape(ShapeId),
    /// Following `parent_id` from this shape leads back to it.
    #[error("parent cycle through shape: {0}")]
    ParentCycle(ShapeId),
}

/// What kind of host an attachment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachKind {
    /// Host is a line.
    Line,
    /// Host is any non-line shape.
    Shape,
}

/// Parent and children of one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub parent_id: Option<ShapeId>,
    pub children: Vec<ShapeId>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneComposite {
    shapes: Vec<Shape>,
    merged: Vec<Shape>,
    index: HashMap<ShapeId, usize>,
    tmp_patch: PatchMap,
    tree: HashMap<ShapeId, TreeNode>,
    roots: Vec<ShapeId>,
    orphans: HashSet<ShapeId>,
    leaf_polygons: HashMap<ShapeId, Polygon>,
}

impl SceneComposite {
    /// Build a composite with no temporary overlay.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::ParentCycle`] if the parent relation is cyclic.
    pub fn new(shapes: Vec<Shape>) -> Result<Self, CompositeError> {
        Self::with_overlay(shapes, PatchMap::new())
    }

    /// Build a composite whose merged view carries `tmp_patch`.
    ///
    /// Duplicate ids keep the first position and the last value.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::ParentCycle`] if the parent relation is cyclic.
    pub fn with_overlay(shapes: Vec<Shape>, tmp_patch: PatchMap) -> Result<Self, CompositeError> {
        let mut deduped: Vec<Shape> = Vec::with_capacity(shapes.len());
        let mut index: HashMap<ShapeId, usize> = HashMap::with_capacity(shapes.len());
        for shape in shapes {
            if let Some(&i) = index.get(&shape.id) {
                tracing::warn!(id = %shape.id, "duplicate shape id; keeping the latest value");
                deduped[i] = shape;
            } else {
                index.insert(shape.id.clone(), deduped.len());
                deduped.push(shape);
            }
        }

        check_acyclic(&deduped, &index)?;

        let mut tree: HashMap<ShapeId, TreeNode> =
            deduped.iter().map(|s| (s.id.clone(), TreeNode { parent_id: None, children: Vec::new() })).collect();
        let mut roots = Vec::new();
        let mut orphans = HashSet::new();
        for shape in &deduped {
            match shape.parent_id.as_ref() {
                Some(parent) if index.contains_key(parent) => {
                    if let Some(node) = tree.get_mut(&shape.id) {
                        node.parent_id = Some(parent.clone());
                    }
                    if let Some(node) = tree.get_mut(parent) {
                        node.children.push(shape.id.clone());
                    }
                }
                Some(parent) => {
                    tracing::warn!(id = %shape.id, parent = %parent, "orphaned shape; treating as root");
                    orphans.insert(shape.id.clone());
                    roots.push(shape.id.clone());
                }
                None => roots.push(shape.id.clone()),
            }
        }

        let mut composite = Self {
            shapes: deduped,
            merged: Vec::new(),
            index,
            tmp_patch: PatchMap::new(),
            tree,
            roots,
            orphans,
            leaf_polygons: HashMap::new(),
        };
        composite.apply_overlay(tmp_patch);
        Ok(composite)
    }

    /// Next revision with the same committed shapes and a new overlay.
    #[must_use]
    pub fn with_tmp_patch(&self, tmp_patch: PatchMap) -> Self {
        let mut next = Self {
            shapes: self.shapes.clone(),
            merged: Vec::new(),
            index: self.index.clone(),
            tmp_patch: PatchMap::new(),
            tree: self.tree.clone(),
            roots: self.roots.clone(),
            orphans: self.orphans.clone(),
            leaf_polygons: HashMap::new(),
        };
        next.apply_overlay(tmp_patch);
        next
    }

    fn apply_overlay(&mut self, tmp_patch: PatchMap) {
        self.merged = patch_shapes(&self.shapes, &tmp_patch);
        self.tmp_patch = tmp_patch;
        let registry = ShapeRegistry::global();
        self.leaf_polygons = self
            .merged
            .iter()
            .filter(|s| !s.is_group())
            .map(|s| (s.id.clone(), registry.get(s.kind).get_local_rect_polygon(s, &*self)))
            .collect();
    }

    // --- Shape access ---

    /// Committed shapes in document order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Shapes with the temporary overlay applied, in document order.
    #[must_use]
    pub fn merged_shapes(&self) -> &[Shape] {
        &self.merged
    }

    /// The overlay this composite was built with.
    #[must_use]
    pub fn tmp_patch(&self) -> &PatchMap {
        &self.tmp_patch
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Committed shape by id.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownShape`] if `id` is not in the composite.
    pub fn shape(&self, id: &str) -> Result<&Shape, CompositeError> {
        self.index
            .get(id)
            .map(|&i| &self.shapes[i])
            .ok_or_else(|| CompositeError::UnknownShape(id.to_string()))
    }

    /// Merged (overlay-applied) shape by id.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownShape`] if `id` is not in the composite.
    pub fn merged_shape(&self, id: &str) -> Result<&Shape, CompositeError> {
        self.index
            .get(id)
            .map(|&i| &self.merged[i])
            .ok_or_else(|| CompositeError::UnknownShape(id.to_string()))
    }

    // --- Tree ---

    #[must_use]
    pub fn tree_node(&self, id: &str) -> Option<&TreeNode> {
        self.tree.get(id)
    }

    /// Direct children ids. Empty for unknown ids and leaves.
    #[must_use]
    pub fn children(&self, id: &str) -> &[ShapeId] {
        self.tree.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Parent id, if the parent exists in this composite.
    #[must_use]
    pub fn parent_id(&self, id: &str) -> Option<&ShapeId> {
        self.tree.get(id).and_then(|n| n.parent_id.as_ref())
    }

    /// Ids with no resolvable parent, in document order.
    #[must_use]
    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    /// True if the shape names a parent that does not exist.
    #[must_use]
    pub fn is_orphan(&self, id: &str) -> bool {
        self.orphans.contains(id)
    }

    /// Topmost ancestor of `id` (itself when it has no parent).
    #[must_use]
    pub fn root_of<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        while let Some(parent) = self.parent_id(current) {
            current = parent;
        }
        current
    }

    /// True if any strict ancestor of `id` is in `ids`.
    #[must_use]
    pub fn has_ancestor_in(&self, id: &str, ids: &HashSet<&str>) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent_id(current) {
            if ids.contains(parent.as_str()) {
                return true;
            }
            current = parent;
        }
        false
    }

    /// `id` and every descendant, parents before children.
    #[must_use]
    pub fn branch_ids(&self, id: &str) -> Vec<ShapeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            for child in self.children(&current).iter().rev() {
                stack.push(child.clone());
            }
            out.push(current);
        }
        out
    }

    /// Every shape in the branches rooted at `root_ids`, roots included, taken
    /// from the merged view. Deduplicated and in document order.
    #[must_use]
    pub fn get_all_branch_merged_shapes(&self, root_ids: &[ShapeId]) -> Vec<Shape> {
        let ids: HashSet<ShapeId> = root_ids.iter().flat_map(|id| self.branch_ids(id)).collect();
        self.merged.iter().filter(|s| ids.contains(&s.id)).cloned().collect()
    }

    // --- Geometry ---

    /// Local rect polygon of the merged shape `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::UnknownShape`] if `id` is not in the composite.
    pub fn get_local_rect_polygon(&self, id: &str) -> Result<Polygon, CompositeError> {
        let shape = self.merged_shape(id)?;
        Ok(ShapeContext::local_rect_polygon(self, shape))
    }

    /// Axis-aligned union of the wrapper rects. `None` for an empty slice.
    #[must_use]
    pub fn get_wrapper_rect_for_shapes(&self, shapes: &[&Shape]) -> Option<Rect> {
        let rects: Vec<Rect> = shapes.iter().map(|s| ShapeContext::wrapper_rect(self, s)).collect();
        Rect::union_all(&rects)
    }

    /// True if `shape` is attached to an existing host of the given kind.
    #[must_use]
    pub fn attached(&self, shape: &Shape, kind: AttachKind) -> bool {
        let Some(attachment) = shape.attachment.as_ref() else {
            return false;
        };
        let Ok(host) = self.merged_shape(&attachment.id) else {
            return false;
        };
        match kind {
            AttachKind::Line => host.kind == ShapeKind::Line,
            AttachKind::Shape => host.kind != ShapeKind::Line,
        }
    }

    /// Patch that applying `affine` to `shape` would produce. Pure.
    #[must_use]
    pub fn transform_shape(&self, shape: &Shape, affine: &AffineMatrix) -> PartialShape {
        ShapeRegistry::global().get(shape.kind).resize(shape, affine)
    }

    #[must_use]
    pub fn is_point_on(&self, shape: &Shape, p: Point) -> bool {
        ShapeRegistry::global().get(shape.kind).is_point_on(shape, p, self)
    }

    /// Topmost leaf under `p`, resolved to its root ancestor so that clicking
    /// inside a group selects the group.
    #[must_use]
    pub fn find_shape_at(&self, p: Point) -> Option<ShapeId> {
        self.merged
            .iter()
            .rev()
            .filter(|s| !s.is_group())
            .find(|s| self.is_point_on(s, p))
            .map(|s| self.root_of(&s.id).to_string())
    }

    /// Outline of a selection: the shape's own polygon and rotation for a
    /// single shape, or the axis-aligned wrapper of all of them otherwise.
    #[must_use]
    pub fn selection_polygon(&self, ids: &[ShapeId]) -> Option<(Polygon, f64)> {
        let shapes: Vec<&Shape> = ids.iter().filter_map(|id| self.index.get(id).map(|&i| &self.merged[i])).collect();
        match shapes.as_slice() {
            [] => None,
            [single] => Some((ShapeContext::local_rect_polygon(self, single), single.rotation)),
            many => self.get_wrapper_rect_for_shapes(many).map(|r| (r.to_polygon(), 0.0)),
        }
    }

    /// Snapping candidates of every shape outside the excluded branches.
    #[must_use]
    pub fn snapping_lines(&self, exclude: &[ShapeId]) -> Vec<(ShapeId, SnappingLines)> {
        let excluded: HashSet<&str> = exclude.iter().map(String::as_str).collect();
        self.merged
            .iter()
            .filter(|s| !excluded.contains(s.id.as_str()) && !self.has_ancestor_in(&s.id, &excluded))
            .map(|s| (s.id.clone(), rect_snapping_lines(&ShapeContext::wrapper_rect(self, s))))
            .collect()
    }
}

impl ShapeContext for SceneComposite {
    fn children_of(&self, id: &str) -> Vec<&Shape> {
        self.children(id).iter().filter_map(|c| self.index.get(c).map(|&i| &self.merged[i])).collect()
    }

    fn local_rect_polygon(&self, shape: &Shape) -> Polygon {
        if !shape.is_group() {
            if let Some(&i) = self.index.get(&shape.id) {
                if std::ptr::eq(shape, &self.merged[i]) {
                    if let Some(poly) = self.leaf_polygons.get(&shape.id) {
                        return *poly;
                    }
                }
            }
        }
        ShapeRegistry::global().get(shape.kind).get_local_rect_polygon(shape, self)
    }

    fn wrapper_rect(&self, shape: &Shape) -> Rect {
        ShapeRegistry::global().get(shape.kind).get_wrapper_rect(shape, self)
    }
}

fn check_acyclic(shapes: &[Shape], index: &HashMap<ShapeId, usize>) -> Result<(), CompositeError> {
    let mut verified: HashSet<&str> = HashSet::new();
    for shape in shapes {
        let mut path: HashSet<&str> = HashSet::new();
        let mut current = shape;
        loop {
            if verified.contains(current.id.as_str()) {
                break;
            }
            if !path.insert(current.id.as_str()) {
                return Err(CompositeError::ParentCycle(current.id.clone()));
            }
            let Some(next) = current.parent_id.as_ref().and_then(|p| index.get(p)).map(|&i| &shapes[i]) else {
                break;
            };
            current = next;
        }
        verified.extend(path);
    }
    Ok(())
}
