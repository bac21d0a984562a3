//! Effect lifecycle coordination.
//!
//! The coordinator owns the registry and guarantees the engine's central
//! invariant: at most one effect runs at a time, and only while effects are
//! globally enabled. Switches are sequenced stop-then-start so the render
//! surface is never shared.

use domdom_core::InputEvent;

use crate::{EffectContext, EffectRegistry};

pub struct Coordinator {
    registry: EffectRegistry,
    ctx: EffectContext,
    active: Option<String>,
    enabled: bool,
}

impl Coordinator {
    pub fn new(registry: EffectRegistry, ctx: EffectContext) -> Self {
        Self {
            registry,
            ctx,
            active: None,
            enabled: false,
        }
    }

    /// Switch to the named effect. Unknown names are ignored.
    ///
    /// A different active effect is fully stopped (surface cleared,
    /// listeners detached) before the new one starts.
    pub fn set_effect(&mut self, name: &str) {
        if !self.registry.contains(name) {
            return;
        }
        let prev = self.active.clone();
        if let Some(prev) = prev
            && prev != name
            && let Some(effect) = self.registry.get_mut(&prev)
        {
            effect.stop();
        }
        self.active = Some(name.to_owned());
        if self.enabled
            && let Some(effect) = self.registry.get_mut(name)
        {
            effect.start(&self.ctx);
        }
    }

    /// Globally enable or disable effects. Setting the current value is a
    /// no-op. Disabling stops the active effect but keeps the selection.
    pub fn toggle_enabled(&mut self, on: bool) {
        if self.enabled == on {
            return;
        }
        self.enabled = on;
        let Some(active) = self.active.clone() else {
            return;
        };
        if let Some(effect) = self.registry.get_mut(&active) {
            if on {
                effect.start(&self.ctx);
            } else {
                effect.stop();
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The selected effect name, whether or not it is currently running.
    pub fn current_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The selected effect's icon glyph.
    pub fn current_icon(&self) -> Option<char> {
        self.active
            .as_deref()
            .and_then(|name| self.registry.get(name))
            .map(|effect| effect.icon())
    }

    pub fn available_effects(&self) -> Vec<String> {
        self.registry.names()
    }

    /// How many registered effects report themselves running.
    pub fn running_count(&self) -> usize {
        self.registry
            .iter()
            .filter(|(_, e)| e.is_running())
            .count()
    }

    /// Advance the running effect one frame.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.enabled {
            return;
        }
        if let Some(active) = self.active.clone()
            && let Some(effect) = self.registry.get_mut(&active)
        {
            effect.tick(now_ms);
        }
    }

    /// Route an input event to the running effect, honoring its listener
    /// attachments.
    pub fn dispatch(&mut self, event: &InputEvent) {
        if !self.enabled {
            return;
        }
        let Some(active) = self.active.clone() else {
            return;
        };
        if !self.ctx.input.wants(&active, event.kind()) {
            return;
        }
        if let Some(effect) = self.registry.get_mut(&active) {
            effect.on_input(event);
        }
    }
}
