//! Ambient background effect engine for the domdom terminal app.
//!
//! This crate provides the swappable visual effects (particle network,
//! parallax starfield, drifting dust, fireworks, falling petals, gravity
//! well), the registry/coordinator pair that guarantees exactly one effect
//! runs at a time, and the selector that picks effects randomly, cyclically,
//! and seasonally.

mod coordinator;
mod effect;
mod effects;
mod input;
mod registry;
mod season;
mod selector;
mod surface;

pub use coordinator::Coordinator;
pub use effect::{Effect, EffectContext};
pub use effects::register_builtin;
pub use input::InputHub;
pub use registry::EffectRegistry;
pub use season::is_festive_season;
pub use selector::Selector;
pub use surface::{Surface, SurfaceHandle};
