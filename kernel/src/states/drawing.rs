use crate::consts::MIN_DRAW_SIZE;
use crate::context::ModeContext;
use crate::doc::{PartialShape, Shape, ShapeKind};
use crate::engine::Action;
use crate::fsm::{ModeState, Transition};
use crate::geom::{Point, Rect, Segment};
use crate::input::{Button, ModeStateEvent, Modifiers};
use crate::render::RenderOverlay;
use crate::shape::ShapeRegistry;

use super::{ModeTransition, cursor, is_cancel, is_primary_up, pan_request};

const DRAFT_ID: &str = "draft";

/// Drag out a new box-shaped shape. A click without a drag creates one of
/// the configured default size; a drag smaller than [`MIN_DRAW_SIZE`] on
/// either axis creates nothing. Shift draws a square.
pub struct DrawingState {
    kind: ShapeKind,
    anchor: Option<Point>,
    draft: Option<Shape>,
    guides: Vec<Segment>,
}

impl DrawingState {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind, anchor: None, draft: None, guides: Vec::new() }
    }

    fn snap(&mut self, ctx: &ModeContext, point: Point, origin: Point, scale: f64, modifiers: Modifiers) -> Point {
        self.guides.clear();
        if modifiers.command() {
            return point;
        }
        match ctx.snapping(scale, &[]).test_point(point, origin) {
            Some(result) => {
                self.guides = result.lines;
                point + result.diff
            }
            None => point,
        }
    }

    fn shape_at(&self, id: &str, p: Point, width: f64, height: f64) -> Shape {
        let init = PartialShape { p: Some(p), width: Some(width), height: Some(height), ..Default::default() };
        ShapeRegistry::global().get(self.kind).create(id, &init)
    }

    fn update_draft(&mut self, ctx: &mut ModeContext, current: Point, scale: f64, modifiers: Modifiers) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let mut end = self.snap(ctx, current, anchor, scale, modifiers);
        if modifiers.shift {
            let d = end - anchor;
            let side = d.x.abs().max(d.y.abs());
            end = anchor + Point::new(side.copysign(d.x), side.copysign(d.y));
        }
        let rect = Rect::from_points(anchor, end);
        self.draft = Some(self.shape_at(DRAFT_ID, rect.top_left(), rect.width, rect.height));
        ctx.push_action(Action::RenderNeeded);
    }

    fn finish(&mut self, ctx: &mut ModeContext) {
        let id = ModeContext::generate_id();
        let shape = match (self.anchor, self.draft.take()) {
            (Some(_), Some(draft)) if draft.width >= MIN_DRAW_SIZE && draft.height >= MIN_DRAW_SIZE => {
                Shape { id: id.clone(), ..draft }
            }
            (Some(anchor), None) => {
                let size = ctx.config().default_shape_size;
                self.shape_at(&id, anchor, size, size)
            }
            _ => return,
        };
        ctx.add_shapes(vec![shape]);
        ctx.select(vec![id]);
    }
}

impl ModeState<ModeContext> for DrawingState {
    fn label(&self) -> String {
        match self.kind {
            ShapeKind::Ellipse => "DrawingEllipse".into(),
            _ => "DrawingRectangle".into(),
        }
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        ctx.set_cursor(cursor::CROSSHAIR);
        Transition::None
    }

    fn on_end(&mut self, ctx: &mut ModeContext) {
        if self.draft.take().is_some() {
            ctx.push_action(Action::RenderNeeded);
        }
        self.anchor = None;
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
            self.finish(ctx);
            return Transition::Break;
        }
        match event {
            ModeStateEvent::PointerDown { point, button: Button::Primary, scale, modifiers } => {
                self.anchor = Some(self.snap(ctx, *point, *point, *scale, *modifiers));
            }
            ModeStateEvent::PointerMove { current, scale, modifiers, .. } => {
                self.update_draft(ctx, *current, *scale, *modifiers);
            }
            _ => {}
        }
        Transition::None
    }

    fn render(&self, _ctx: &ModeContext, overlay: &mut RenderOverlay) {
        overlay.draft.clone_from(&self.draft);
        overlay.snapping_lines.extend(self.guides.iter().copied());
    }
}
