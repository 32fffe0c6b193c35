use std::rc::Rc;

use crate::bbox::{BoundingBoxResizing, ResizeOptions};
use crate::composite::SceneComposite;
use crate::context::ModeContext;
use crate::doc::ShapeId;
use crate::fsm::{ModeState, Transition};
use crate::geom::{Point, Segment, radian_eq};
use crate::input::{ModeStateEvent, Modifiers};
use crate::render::RenderOverlay;

use super::{ModeTransition, cursor, gesture_patch, is_cancel, is_primary_up, pan_request};

/// Drag a corner or edge handle of the selection box.
///
/// Shift keeps the aspect ratio and Alt scales around the box center. The
/// dragged handle snaps to guides while the box is axis-aligned.
pub struct ResizingState {
    targets: Vec<ShapeId>,
    base: Rc<SceneComposite>,
    resizing: BoundingBoxResizing,
    rotation: f64,
    guides: Vec<Segment>,
}

impl ResizingState {
    #[must_use]
    pub fn new(ctx: &ModeContext, targets: Vec<ShapeId>, resizing: BoundingBoxResizing, rotation: f64) -> Self {
        Self { targets, base: Rc::clone(ctx.composite()), resizing, rotation, guides: Vec::new() }
    }

    fn drag(&mut self, ctx: &mut ModeContext, diff: Point, scale: f64, modifiers: Modifiers) {
        let mut diff = diff;
        self.guides.clear();
        if !modifiers.command() && radian_eq(self.rotation, 0.0) {
            let handle = self.resizing.base.handle();
            let snapping = ctx.snapping(scale, &self.targets);
            if let Some(result) = snapping.test_point(handle + diff, handle) {
                diff = diff + result.diff;
                self.guides = result.lines;
            }
        }
        let options = ResizeOptions { keep_aspect: modifiers.shift, centralize: modifiers.alt };
        let affine = self.resizing.get_affine(diff, options);
        let patch = gesture_patch(&self.base, &self.targets, &affine, false);
        ctx.set_tmp(patch);
    }
}

impl ModeState<ModeContext> for ResizingState {
    fn label(&self) -> String {
        "Resizing".into()
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        ctx.set_cursor(cursor::RESIZE);
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
