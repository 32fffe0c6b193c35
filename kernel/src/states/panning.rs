use crate::context::ModeContext;
use crate::fsm::{ModeState, Transition};
use crate::input::ModeStateEvent;

use super::{ModeTransition, cursor, is_cancel};

/// Move the camera with the pointer until any button is released.
#[derive(Debug, Default)]
pub struct PanningState {
    previous_cursor: Option<String>,
}

impl ModeState<ModeContext> for PanningState {
    fn label(&self) -> String {
        "Panning".into()
    }

    fn on_start(&mut self, ctx: &mut ModeContext) -> ModeTransition {
        self.previous_cursor = Some(ctx.cursor().to_string());
        ctx.set_cursor(cursor::GRABBING);
        Transition::None
    }

    fn on_end(&mut self, ctx: &mut ModeContext) {
        let previous = self.previous_cursor.take();
        ctx.set_cursor(previous.as_deref().unwrap_or(cursor::DEFAULT));
    }

    fn handle_event(&mut self, ctx: &mut ModeContext, event: &ModeStateEvent) -> ModeTransition {
        match event {
            ModeStateEvent::PointerMove { delta, .. } => {
                ctx.pan_camera(*delta);
                Transition::None
            }
            ModeStateEvent::PointerUp { .. } => Transition::Break,
            _ if is_cancel(event) => Transition::Break,
            _ => Transition::None,
        }
    }
}
