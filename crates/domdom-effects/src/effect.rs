//! The effect lifecycle contract.

use domdom_core::InputEvent;

use crate::{InputHub, SurfaceHandle};

/// Shared resources handed to an effect when it starts.
#[derive(Debug, Clone, Default)]
pub struct EffectContext {
    pub surface: SurfaceHandle,
    pub input: InputHub,
}

impl EffectContext {
    pub fn new(surface: SurfaceHandle, input: InputHub) -> Self {
        Self { surface, input }
    }
}

/// A self-contained visual simulation.
///
/// Lifecycle rules every implementation upholds:
///
/// - `start` while running and `stop` while stopped are no-ops, never errors.
/// - `start` against a context whose surface slot is empty silently declines;
///   the host may legitimately have no render target.
/// - `stop` detaches every listener the effect attached, clears its drawn
///   content from the surface, and discards all particles, transients, and
///   pending timers. A `tick` arriving after `stop` mutates nothing.
pub trait Effect {
    /// Registry name; also the owner key for input attachments.
    fn name(&self) -> &'static str;

    /// One-character glyph shown by the selector's toggle UI.
    fn icon(&self) -> char;

    /// Acquire the surface, build the particle population, attach listeners,
    /// and begin running. Idempotent.
    fn start(&mut self, ctx: &EffectContext);

    /// Cancel, detach, clear, discard. Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Handle one input event. Only called while running, and only for
    /// kinds the effect attached for.
    fn on_input(&mut self, event: &InputEvent);

    /// Advance one animation frame and draw it. `now_ms` is wall-clock
    /// elapsed milliseconds, used for hue cycling and timers.
    fn tick(&mut self, now_ms: u64);
}
