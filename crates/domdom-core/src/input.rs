//! Input events consumed by effects.

use crate::Viewport;

/// The listener categories an effect can attach for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerMove,
    PointerLeave,
    Click,
    Resize,
}

/// A single host input event in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Clicked { x: f32, y: f32 },
    Resized(Viewport),
}

impl InputEvent {
    /// The listener category this event is delivered through.
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerMoved { .. } => InputKind::PointerMove,
            InputEvent::PointerLeft => InputKind::PointerLeave,
            InputEvent::Clicked { .. } => InputKind::Click,
            InputEvent::Resized(_) => InputKind::Resize,
        }
    }
}
