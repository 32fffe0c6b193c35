//! Input model: the events the interaction state machine consumes.
//!
//! The pointer/keyboard adapter produces [`ModeStateEvent`] values with
//! coordinates already in world space. Pointer events also carry the current
//! view `scale` so handle and snapping tolerances can stay constant in screen
//! pixels. Events arrive as JSON tagged by `type`; any tag this kernel does not
//! know becomes [`ModeStateEvent::Unknown`] and every state ignores it.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key, named as the browser reports it (e.g. `"Delete"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive comparison, so `"A"` with Shift still matches `"a"`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    pub dx: f64,
    /// Positive scrolls down.
    pub dy: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// One input event for the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModeStateEvent {
    /// Pointer moved. `start` is where the pointer went down, `delta` the
    /// movement since the previous move event.
    PointerMove {
        start: Point,
        current: Point,
        #[serde(default)]
        delta: Point,
        #[serde(default = "unit_scale")]
        scale: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerDown {
        point: Point,
        #[serde(default)]
        button: Button,
        #[serde(default = "unit_scale")]
        scale: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        point: Point,
        #[serde(default)]
        button: Button,
        #[serde(default = "unit_scale")]
        scale: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        delta: WheelDelta,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Request to enter a named state.
    State { name: String },
    ContextMenu { point: Point },
    Copy,
    Paste,
    #[serde(other)]
    Unknown,
}

impl ModeStateEvent {
    /// Wire tag of the event, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PointerMove { .. } => "pointermove",
            Self::PointerDown { .. } => "pointerdown",
            Self::PointerUp { .. } => "pointerup",
            Self::KeyDown { .. } => "keydown",
            Self::KeyUp { .. } => "keyup",
            Self::Wheel { .. } => "wheel",
            Self::State { .. } => "state",
            Self::ContextMenu { .. } => "contextmenu",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Unknown => "unknown",
        }
    }

    /// Modifiers carried by the event, or none for events without them.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerMove { modifiers, .. }
            | Self::PointerDown { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::Wheel { modifiers, .. } => *modifiers,
            _ => Modifiers::default(),
        }
    }
}
