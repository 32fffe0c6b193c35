use std::rc::Rc;

use crate::bbox::BoundingBoxRotating;
use crate::composite::SceneComposite;
use crate::context::ModeContext;
use crate::doc::ShapeId;
use crate::fsm::{ModeState, Transition};
use crate::input::ModeStateEvent;

use super::{ModeTransition, cursor, gesture_patch, is_cancel, is_primary_up, pan_request};

/// Drag the rotate handle. Shift snaps to the angle grid.
pub struct RotatingState {
    targets: Vec<ShapeId>,
    base: Rc<SceneComposite>,
    rotating: BoundingBoxRotating,
}

impl RotatingState {
    #[must_use]
    pub fn new(ctx: &ModeContext, targets: Vec<ShapeId>, rotating: BoundingBoxRotating) -> Self {
        Self { targets, base: Rc::clone(ctx.composite()), rotating }
    }
}

impl ModeState<ModeContext> for RotatingState {
    fn label(&self) -> String {
        "Rotating".into()
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        ctx.set_cursor(cursor::ROTATE);
        Transition::None
    }

    fn on_end(&mut self, ctx: &mut ModeContext) {
        ctx.clear_tmp();
        ctx.set_cursor(cursor::DEFAULT);
    }

    fn handle_event(&mut self, ctx: &mut ModeContext, event: &ModeStateEvent) -> ModeTransition {
        if let Some(pan) = pan_request(event) {
            return pan;
        }
        if is_cancel(event) {
            return Transition::Break;
        }
        if is_primary_up(event) {
            ctx.commit();
            return Transition::Break;
        }
        if let ModeStateEvent::PointerMove { start, current, modifiers, .. } = event {
            let affine = self.rotating.get_affine(*start, *current, modifiers.shift);
            let patch = gesture_patch(&self.base, &self.targets, &affine, true);
            ctx.set_tmp(patch);
        }
        Transition::None
    }
}
