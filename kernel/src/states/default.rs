use crate::bbox::BoxHit;
use crate::context::ModeContext;
use crate::doc::ShapeKind;
use crate::fsm::{ModeState, StackKind, Transition};
use crate::geom::Point;
use crate::input::{Button, Key, ModeStateEvent, Modifiers};
use crate::render::RenderOverlay;

use super::{DrawingState, ModeTransition, MovingState, ResizingState, RotatingState, cursor, pan_request, state_by_name};

/// Idle state at the bottom of the stack.
pub struct DefaultState;

impl DefaultState {
    fn pointer_down(ctx: &mut ModeContext, point: Point, scale: f64, modifiers: Modifiers) -> ModeTransition {
        if let Some(bbox) = ctx.bounding_box() {
            let selection = ctx.selection().to_vec();
            match bbox.hit_test(point, scale) {
                Some(hit @ (BoxHit::Corner(_) | BoxHit::Segment(_))) => {
                    if let Some(resizing) = bbox.resizing(hit) {
                        let state = ResizingState::new(ctx, selection, resizing, bbox.rotation);
                        return Transition::stack(state, StackKind::Resume);
                    }
                }
                Some(BoxHit::Rotation) => {
                    let rotating = bbox.rotating().with_loose_snap_deg(ctx.config().rotation_loose_snap_deg);
                    return Transition::stack(RotatingState::new(ctx, selection, rotating), StackKind::Resume);
                }
                Some(BoxHit::Area) if !modifiers.shift => {
                    return Transition::stack(MovingState::new(ctx, selection), StackKind::Resume);
                }
                _ => {}
            }
        }

        match ctx.composite().find_shape_at(point) {
            Some(id) if modifiers.shift => {
                ctx.toggle_selected(&id);
                Transition::None
            }
            Some(id) => {
                if !ctx.is_selected(&id) {
                    ctx.select(vec![id]);
                }
                let selection = ctx.selection().to_vec();
                Transition::stack(MovingState::new(ctx, selection), StackKind::Resume)
            }
            None => {
                ctx.clear_selection();
                Transition::None
            }
        }
    }

    fn hover(ctx: &mut ModeContext, point: Point, scale: f64) {
        let over_box = ctx.bounding_box().and_then(|bbox| bbox.hit_test(point, scale));
        let name = match over_box {
            Some(BoxHit::Corner(_) | BoxHit::Segment(_)) => cursor::RESIZE,
            Some(BoxHit::Rotation) => cursor::ROTATE,
            Some(BoxHit::Area) => cursor::MOVE,
            None if ctx.composite().find_shape_at(point).is_some() => cursor::POINTER,
            None => cursor::DEFAULT,
        };
        ctx.set_cursor(name);
    }

    fn key_down(ctx: &mut ModeContext, key: &Key, modifiers: Modifiers) -> ModeTransition {
        if modifiers.command() {
            if key.is("a") {
                ctx.select_all();
            } else if key.is("c") {
                ctx.copy_selection();
            } else if key.is("v") {
                ctx.paste();
            }
            return Transition::None;
        }
        if key.is("Delete") || key.is("Backspace") {
            let ids = ctx.selection().to_vec();
            ctx.delete_shapes(&ids);
        } else if key.is("Escape") {
            ctx.clear_selection();
        } else if key.is("r") {
            return Transition::stack(DrawingState::new(ShapeKind::Rectangle), StackKind::Resume);
        } else if key.is("e") {
            return Transition::stack(DrawingState::new(ShapeKind::Ellipse), StackKind::Resume);
        }
        Transition::None
    }
}

impl ModeState<ModeContext> for DefaultState {
    fn label(&self) -> String {
        "Default".into()
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        ctx.set_cursor(cursor::DEFAULT);
        Transition::None
    }

    fn handle_event(&mut self, ctx: &mut ModeContext, event: &ModeStateEvent) -> ModeTransition {
        if let Some(pan) = pan_request(event) {
            return pan;
        }
        match event {
            ModeStateEvent::PointerDown { point, button: Button::Primary, scale, modifiers } => {
                Self::pointer_down(ctx, *point, *scale, *modifiers)
            }
            ModeStateEvent::PointerMove { current, scale, .. } => {
                Self::hover(ctx, *current, *scale);
                Transition::None
            }
            ModeStateEvent::KeyDown { key, modifiers } => Self::key_down(ctx, key, *modifiers),
            ModeStateEvent::Wheel { delta, .. } => {
                let camera = ctx.camera();
                ctx.pan_camera(Point::new(-camera.screen_dist_to_world(delta.dx), -camera.screen_dist_to_world(delta.dy)));
                Transition::None
            }
            ModeStateEvent::State { name } => match state_by_name(name) {
                Some(state) => Transition::Stack { state, kind: StackKind::Resume },
                None => {
                    tracing::debug!(%name, "ignoring request for unknown state");
                    Transition::None
                }
            },
            ModeStateEvent::Copy => {
                ctx.copy_selection();
                Transition::None
            }
            ModeStateEvent::Paste => {
                ctx.paste();
                Transition::None
            }
            _ => Transition::None,
        }
    }

    fn render(&self, ctx: &ModeContext, overlay: &mut RenderOverlay) {
        if let Some(bbox) = ctx.bounding_box() {
            overlay.draw_selection(&bbox, ctx.camera().scale());
        }
    }
}
