//! Mutable world the interaction states operate on.
//!
//! `ModeContext` holds the current [`SceneComposite`] revision, the selection,
//! the camera and the queued [`Action`]s for the host. States never mutate a
//! composite: every change (a new live overlay, a commit, an insert) builds
//! the next revision and swaps it in. The composite is reference counted so a
//! gesture can keep the revision it started from while the overlay changes.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::error;
use uuid::Uuid;

use crate::bbox::BoundingBox;
use crate::camera::Camera;
use crate::composite::SceneComposite;
use crate::config::KernelConfig;
use crate::consts::PASTE_OFFSET;
use crate::doc::{PatchMap, Shape, ShapeId, patch_shapes};
use crate::engine::Action;
use crate::geom::Point;
use crate::snap::Snapping;

pub struct ModeContext {
    composite: Rc<SceneComposite>,
    selection: Vec<ShapeId>,
    camera: Camera,
    config: KernelConfig,
    cursor: String,
    clipboard: Vec<Shape>,
    actions: Vec<Action>,
}

impl ModeContext {
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        Self {
            composite: Rc::new(SceneComposite::default()),
            selection: Vec::new(),
            camera: Camera::default(),
            config,
            cursor: String::from("default"),
            clipboard: Vec::new(),
            actions: Vec::new(),
        }
    }

    // --- Accessors ---

    /// Current revision: committed shapes plus the live overlay.
    #[must_use]
    pub fn composite(&self) -> &Rc<SceneComposite> {
        &self.composite
    }

    #[must_use]
    pub fn tmp_patch(&self) -> &PatchMap {
        self.composite.tmp_patch()
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    // --- Live overlay ---

    /// Replace the live overlay. The committed shapes are untouched.
    pub fn set_tmp(&mut self, patch: PatchMap) {
        if patch.is_empty() && self.composite.tmp_patch().is_empty() {
            return;
        }
        self.composite = Rc::new(self.composite.with_tmp_patch(patch));
        self.push_action(Action::RenderNeeded);
    }

    pub fn clear_tmp(&mut self) {
        self.set_tmp(PatchMap::new());
    }

    /// Fold the live overlay into the committed shapes and report it.
    pub fn commit(&mut self) {
        let patch = self.composite.tmp_patch().clone();
        if patch.is_empty() {
            return;
        }
        let shapes = patch_shapes(self.composite.shapes(), &patch);
        if self.rebuild(shapes, "commit") {
            self.push_action(Action::ShapesUpdated(patch));
        } else {
            self.clear_tmp();
        }
    }

    // --- Document changes ---

    /// Swap in a new document, dropping any stale selection.
    pub fn load(&mut self, composite: SceneComposite) {
        self.composite = Rc::new(composite);
        self.prune_selection();
    }

    /// Apply a patch to the committed shapes without reporting it.
    pub fn apply_patch(&mut self, patch: &PatchMap) {
        let shapes = patch_shapes(self.composite.shapes(), patch);
        let tmp = self.composite.tmp_patch().clone();
        self.rebuild_with(shapes, tmp, "apply patch");
    }

    /// Append shapes without reporting them.
    pub fn insert_shapes(&mut self, shapes: Vec<Shape>) -> bool {
        let mut next = self.composite.shapes().to_vec();
        next.extend(shapes);
        let tmp = self.composite.tmp_patch().clone();
        self.rebuild_with(next, tmp, "insert")
    }

    /// Remove shapes and their descendants without reporting them.
    /// Returns every id that was removed.
    pub fn remove_shapes(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let removed: Vec<ShapeId> = {
            let mut seen = HashSet::new();
            ids.iter()
                .flat_map(|id| self.composite.branch_ids(id))
                .filter(|id| seen.insert(id.clone()))
                .collect()
        };
        if removed.is_empty() {
            return removed;
        }
        let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
        let next: Vec<Shape> = self.composite.shapes().iter().filter(|s| !gone.contains(s.id.as_str())).cloned().collect();
        let tmp: PatchMap = self
            .composite
            .tmp_patch()
            .iter()
            .filter(|(id, _)| !gone.contains(id.as_str()))
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect();
        if !self.rebuild_with(next, tmp, "remove") {
            return Vec::new();
        }
        self.prune_selection();
        removed
    }

    /// Add shapes and report them as created.
    pub fn add_shapes(&mut self, shapes: Vec<Shape>) {
        if shapes.is_empty() {
            return;
        }
        if self.insert_shapes(shapes.clone()) {
            self.push_action(Action::ShapesCreated(shapes));
        }
    }

    /// Delete shapes with their descendants and report the removed ids.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) {
        let removed = self.remove_shapes(ids);
        if !removed.is_empty() {
            self.push_action(Action::ShapesDeleted(removed));
        }
    }

    // --- Selection ---

    #[must_use]
    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Select `ids` in order, skipping unknown and repeated ids.
    pub fn select(&mut self, ids: Vec<ShapeId>) {
        let mut seen = HashSet::new();
        let next: Vec<ShapeId> = ids.into_iter().filter(|id| self.composite.contains(id) && seen.insert(id.clone())).collect();
        self.set_selection(next);
    }

    /// Add `id` to the selection, or remove it if already selected.
    pub fn toggle_selected(&mut self, id: &str) {
        let mut next = self.selection.clone();
        if let Some(i) = next.iter().position(|s| s == id) {
            next.remove(i);
        } else if self.composite.contains(id) {
            next.push(id.to_string());
        }
        self.set_selection(next);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Vec::new());
    }

    /// Select every root shape.
    pub fn select_all(&mut self) {
        let roots = self.composite.roots().to_vec();
        self.set_selection(roots);
    }

    fn set_selection(&mut self, next: Vec<ShapeId>) {
        if next != self.selection {
            self.selection = next;
            self.push_action(Action::SelectionChanged(self.selection.clone()));
        }
    }

    fn prune_selection(&mut self) {
        let next: Vec<ShapeId> = self.selection.iter().filter(|id| self.composite.contains(id)).cloned().collect();
        self.set_selection(next);
    }

    /// Bounding box around the selection in the live view.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let (polygon, rotation) = self.composite.selection_polygon(&self.selection)?;
        Some(BoundingBox::new(polygon, rotation).with_handles(self.config.handle_sizes()))
    }

    /// Snap guides from every shape outside `exclude` at the given view scale.
    #[must_use]
    pub fn snapping(&self, scale: f64, exclude: &[ShapeId]) -> Snapping {
        Snapping::new(&self.composite.snapping_lines(exclude), self.config.grid(), scale, self.config.snap_threshold_px)
    }

    // --- Clipboard ---

    /// Copy the selected branches.
    pub fn copy_selection(&mut self) {
        self.clipboard = self.composite.get_all_branch_merged_shapes(&self.selection);
    }

    /// Insert a copy of the clipboard with fresh ids, offset from the
    /// originals, and select the pasted roots.
    pub fn paste(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        let ids: HashMap<ShapeId, ShapeId> = self.clipboard.iter().map(|s| (s.id.clone(), Self::generate_id())).collect();
        let offset = Point::new(PASTE_OFFSET, PASTE_OFFSET);
        let mut roots = Vec::new();
        let pasted: Vec<Shape> = self
            .clipboard
            .iter()
            .map(|s| {
                let mut copy = s.clone();
                copy.id.clone_from(&ids[&s.id]);
                copy.parent_id = s.parent_id.as_ref().and_then(|p| ids.get(p)).cloned();
                if copy.parent_id.is_none() {
                    roots.push(copy.id.clone());
                }
                if let Some(attachment) = copy.attachment.as_mut() {
                    match ids.get(&attachment.id) {
                        Some(host) => attachment.id.clone_from(host),
                        None => copy.attachment = None,
                    }
                }
                copy.p = copy.p + offset;
                copy.q = copy.q.map(|q| q + offset);
                copy
            })
            .collect();
        self.clipboard = pasted.clone();
        self.add_shapes(pasted);
        self.select(roots);
    }

    // --- Host plumbing ---

    pub fn pan_camera(&mut self, world_delta: Point) {
        self.camera.pan_by_world(world_delta);
        self.push_action(Action::RenderNeeded);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_cursor(&mut self, cursor: &str) {
        if self.cursor != cursor {
            self.cursor = cursor.to_string();
            self.push_action(Action::SetCursor(self.cursor.clone()));
        }
    }

    /// Queue an action. `RenderNeeded` is queued at most once per batch.
    pub fn push_action(&mut self, action: Action) {
        if matches!(action, Action::RenderNeeded) && self.actions.contains(&Action::RenderNeeded) {
            return;
        }
        self.actions.push(action);
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    #[must_use]
    pub fn generate_id() -> ShapeId {
        Uuid::new_v4().to_string()
    }

    fn rebuild(&mut self, shapes: Vec<Shape>, op: &'static str) -> bool {
        self.rebuild_with(shapes, PatchMap::new(), op)
    }

    fn rebuild_with(&mut self, shapes: Vec<Shape>, tmp: PatchMap, op: &'static str) -> bool {
        match SceneComposite::with_overlay(shapes, tmp) {
            Ok(next) => {
                self.composite = Rc::new(next);
                true
            }
            Err(e) => {
                error!(error = %e, op, "scene rebuild failed; keeping previous revision");
                false
            }
        }
    }
}
