//! Core types shared across the domdom workspace.
//!
//! Everything here is a plain value type: the pixel-space viewport, the
//! input events the engine consumes, and color helpers. The effect engine
//! and the terminal frontend both build on these.

mod color;
mod input;
mod viewport;

pub use color::{Rgb, hsl_to_rgb};
pub use input::{InputEvent, InputKind};
pub use viewport::Viewport;
