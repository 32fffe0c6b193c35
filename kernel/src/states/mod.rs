//! Concrete interaction states.
//!
//! | State | Role |
//! |-------|------|
//! | [`DefaultState`] | Idle: hit-testing, selection, keyboard commands, wheel panning |
//! | [`MovingState`] | Translate the selection with rect snapping |
//! | [`ResizingState`] | Drag a bounding-box handle |
//! | [`RotatingState`] | Drag the rotate handle |
//! | [`PanningState`] | Move the camera; stacked over any state with resume |
//! | [`DrawingState`] | Drag out a new rectangle or ellipse |
//!
//! Gesture states are stacked over [`DefaultState`] with
//! [`StackKind::Resume`] and pop themselves with `Break`. Each one clears
//! the live overlay in `on_end`, so cancelling is just breaking.

mod default;
mod drawing;
mod moving;
mod panning;
mod resizing;
mod rotating;


pub use default::DefaultState;
pub use drawing::DrawingState;
pub use moving::MovingState;
pub use panning::PanningState;
pub use resizing::ResizingState;
pub use rotating::RotatingState;

use crate::attach::{follow_line_hosts, with_attachment_rotation};
use crate::composite::SceneComposite;
use crate::context::ModeContext;
use crate::doc::{PatchMap, ShapeId, ShapeKind, merge_patch_maps};
use crate::fsm::{ModeState, StackKind, Transition};
use crate::geom::AffineMatrix;
use crate::input::{Button, ModeStateEvent};
use crate::resize::resize_shape_trees;

/// CSS cursor names reported through `Action::SetCursor`.
pub mod cursor {
    pub const DEFAULT: &str = "default";
    pub const POINTER: &str = "pointer";
    pub const MOVE: &str = "move";
    pub const RESIZE: &str = "nwse-resize";
    pub const ROTATE: &str = "alias";
    pub const GRABBING: &str = "grabbing";
    pub const CROSSHAIR: &str = "crosshair";
}

pub type Mode = Box<dyn ModeState<ModeContext>>;
pub type ModeTransition = Transition<ModeContext>;

/// Base state of every machine.
#[must_use]
pub fn initial_state() -> Mode {
    Box::new(DefaultState)
}

/// State entered through a `state` event, if `name` is one that can be requested.
#[must_use]
pub fn state_by_name(name: &str) -> Option<Mode> {
    match name {
        "DrawingRectangle" => Some(Box::new(DrawingState::new(ShapeKind::Rectangle))),
        "DrawingEllipse" => Some(Box::new(DrawingState::new(ShapeKind::Ellipse))),
        "Panning" => Some(Box::new(PanningState::default())),
        _ => None,
    }
}

/// Patch for moving the branches under `targets` by `affine`, taken against
/// the revision the gesture started from. Shapes attached to moved lines
/// follow; with `rotating`, relative attachments keep their offset.
fn gesture_patch(base: &SceneComposite, targets: &[ShapeId], affine: &AffineMatrix, rotating: bool) -> PatchMap {
    let mut patch = resize_shape_trees(base, targets, affine);
    if rotating {
        patch = with_attachment_rotation(base, patch);
    }
    let follow = follow_line_hosts(base, &patch);
    merge_patch_maps(patch, &follow)
}

fn is_cancel(event: &ModeStateEvent) -> bool {
    matches!(event, ModeStateEvent::KeyDown { key, .. } if key.is("Escape"))
}

/// Middle-button press pans without leaving the current gesture.
fn pan_request(event: &ModeStateEvent) -> Option<ModeTransition> {
    match event {
        ModeStateEvent::PointerDown { button: Button::Middle, .. } => {
            Some(Transition::stack(PanningState::default(), StackKind::Resume))
        }
        _ => None,
    }
}

fn is_primary_up(event: &ModeStateEvent) -> bool {
    matches!(event, ModeStateEvent::PointerUp { button: Button::Primary, .. })
}
