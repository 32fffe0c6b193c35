use std::rc::Rc;

use crate::composite::SceneComposite;
use crate::context::ModeContext;
use crate::doc::ShapeId;
use crate::fsm::{ModeState, Transition};
use crate::geom::{AffineMatrix, Point, Rect, Segment};
use crate::input::{ModeStateEvent, Modifiers};
use crate::render::RenderOverlay;

use super::{ModeTransition, cursor, gesture_patch, is_cancel, is_primary_up, pan_request};

/// Drag the selection. The wrapper rect of the moved shapes snaps to the
/// other shapes and the grid; holding Ctrl/Cmd disables snapping.
pub struct MovingState {
    targets: Vec<ShapeId>,
    base: Rc<SceneComposite>,
    guides: Vec<Segment>,
}

impl MovingState {
    #[must_use]
    pub fn new(ctx: &ModeContext, targets: Vec<ShapeId>) -> Self {
        Self { targets, base: Rc::clone(ctx.composite()), guides: Vec::new() }
    }

    fn start_rect(&self) -> Option<Rect> {
        let (polygon, _) = self.base.selection_polygon(&self.targets)?;
        Rect::wrap_points(polygon)
    }

    fn drag(&mut self, ctx: &mut ModeContext, diff: Point, scale: f64, modifiers: Modifiers) {
        let mut diff = diff;
        self.guides.clear();
        if !modifiers.command() {
            if let Some(rect) = self.start_rect() {
                let snapping = ctx.snapping(scale, &self.targets);
                if let Some(result) = snapping.test_rect(&rect.translate(diff)) {
                    diff = diff + result.diff;
                    self.guides = result.lines;
                }
            }
        }
        let patch = gesture_patch(&self.base, &self.targets, &AffineMatrix::translate(diff), false);
        ctx.set_tmp(patch);
    }
}

impl ModeState<ModeContext> for MovingState {
    fn label(&self) -> String {
        "Moving".into()
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        ctx.set_cursor(cursor::MOVE);
        Transition::None
    }

    fn on_end(&mut self, ctx: &mut ModeContext) {
        self.guides.clear();
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
        if let ModeStateEvent::PointerMove { start, current, scale, modifiers, .. } = event {
            self.drag(ctx, *current - *start, *scale, *modifiers);
        }
        Transition::None
    }

    fn render(&self, _ctx: &ModeContext, overlay: &mut RenderOverlay) {
        overlay.snapping_lines.extend(self.guides.iter().copied());
    }
}
