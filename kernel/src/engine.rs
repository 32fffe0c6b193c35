use serde::Serialize;

use crate::camera::Camera;
use crate::composite::{CompositeError, SceneComposite};
use crate::config::KernelConfig;
use crate::context::ModeContext;
use crate::doc::{PatchMap, Shape, ShapeId};
use crate::fsm::StateMachine;
use crate::input::ModeStateEvent;
use crate::render::RenderOverlay;
use crate::states::initial_state;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from event handling for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Action {
    /// A gesture was committed; persist these field changes.
    ShapesUpdated(PatchMap),
    ShapesCreated(Vec<Shape>),
    /// Removed ids, descendants included.
    ShapesDeleted(Vec<ShapeId>),
    /// The new selection, in selection order.
    SelectionChanged(Vec<ShapeId>),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine: the mode context plus the state machine that drives it.
///
/// Holds no rendering surface. Hosts feed events in, persist the returned
/// actions, and draw from [`EngineCore::composite`] and [`EngineCore::overlay`].
pub struct EngineCore {
    ctx: ModeContext,
    machine: StateMachine<ModeContext>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        let mut ctx = ModeContext::new(config);
        let mut machine = StateMachine::new(initial_state);
        machine.start(&mut ctx);
        ctx.take_actions();
        Self { ctx, machine }
    }

    // --- Data inputs ---

    /// Replace the document. Any gesture in progress is abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::ParentCycle`] if the parent relation is
    /// cyclic; the previous document is kept.
    pub fn load_snapshot(&mut self, shapes: Vec<Shape>) -> Result<(), CompositeError> {
        let next = SceneComposite::new(shapes)?;
        self.machine.dispose(&mut self.ctx);
        self.ctx.load(next);
        self.machine.start(&mut self.ctx);
        self.ctx.take_actions();
        Ok(())
    }

    /// Apply a shape created elsewhere.
    pub fn apply_create(&mut self, shape: Shape) {
        self.ctx.insert_shapes(vec![shape]);
    }

    /// Apply a patch made elsewhere.
    pub fn apply_update(&mut self, patch: &PatchMap) {
        self.ctx.apply_patch(patch);
    }

    /// Apply a deletion made elsewhere. Descendants go with their parents.
    /// A resulting selection change is reported with the next event.
    pub fn apply_delete(&mut self, ids: &[ShapeId]) {
        self.ctx.remove_shapes(ids);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.ctx.set_camera(camera);
    }

    // --- Events ---

    /// Feed one event through the state machine and drain the resulting actions.
    pub fn handle_event(&mut self, event: &ModeStateEvent) -> Vec<Action> {
        self.machine.handle_event(&mut self.ctx, event);
        self.ctx.take_actions()
    }

    // --- Queries ---

    /// Current state label, e.g. `Default:Moving`.
    #[must_use]
    pub fn label(&self) -> String {
        self.machine.label()
    }

    #[must_use]
    pub fn selection(&self) -> &[ShapeId] {
        self.ctx.selection()
    }

    #[must_use]
    pub fn composite(&self) -> &SceneComposite {
        self.ctx.composite()
    }

    /// Uncommitted live changes of the gesture in progress.
    #[must_use]
    pub fn tmp_patch(&self) -> &PatchMap {
        self.ctx.tmp_patch()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.ctx.camera()
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        self.ctx.cursor()
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.ctx.composite().merged_shapes().iter().find(|s| s.id == id)
    }

    /// Interaction overlay for the current frame.
    #[must_use]
    pub fn overlay(&self) -> RenderOverlay {
        let mut overlay = RenderOverlay::default();
        self.machine.render(&self.ctx, &mut overlay);
        overlay
    }
}
