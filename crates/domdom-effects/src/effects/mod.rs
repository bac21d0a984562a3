//! The built-in effect implementations.
//!
//! Each module is one self-contained visual family. They share nothing but
//! the [`Effect`](crate::Effect) contract and the hue-cycling helper below.

mod drift;
mod fireworks;
mod network;
mod petals;
mod singularity;
mod starfield;

use crate::EffectRegistry;

/// Register every built-in effect. Call this before constructing the
/// coordinator; the selector assumes its pool names are present.
pub fn register_builtin(registry: &mut EffectRegistry) {
    registry.register("network", Box::new(network::Network::new()));
    registry.register("starfield", Box::new(starfield::Starfield::new()));
    registry.register("drift", Box::new(drift::Drift::new()));
    registry.register("fireworks", Box::new(fireworks::Fireworks::new()));
    registry.register("petals", Box::new(petals::Petals::new()));
    registry.register("singularity", Box::new(singularity::Singularity::new()));
}

/// Wall-clock hue cycle in degrees. `period_ms` is the time per degree.
pub(crate) fn cycle_hue(now_ms: u64, period_ms: u64) -> f32 {
    (now_ms / period_ms % 360) as f32
}

#[cfg(test)]
mod tests {
    use domdom_core::{InputEvent, Viewport};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Effect, EffectContext, InputHub, SurfaceHandle};

    #[test]
    fn all_builtin_effects_are_registered() {
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry);
        assert_eq!(
            registry.names(),
            [
                "network",
                "starfield",
                "drift",
                "fireworks",
                "petals",
                "singularity"
            ]
        );
    }

    #[test]
    fn zero_width_resize_repopulates_every_effect_without_panicking() {
        // Hosts report zero-sized terminals while minimized; the resulting
        // resize must not blow up any effect's position sampling.
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry);
        let ctx = EffectContext::new(SurfaceHandle::sized(120, 40), InputHub::new());
        for name in registry.names() {
            let effect = registry.get_mut(&name).unwrap();
            effect.start(&ctx);
            effect.on_input(&InputEvent::Resized(Viewport::new(0.0, 40.0)));
            effect.tick(16);
            effect.stop();
        }
    }

    #[test]
    fn hue_cycles_within_a_circle() {
        assert_eq!(cycle_hue(0, 50), 0.0);
        assert_eq!(cycle_hue(50 * 359, 50), 359.0);
        assert_eq!(cycle_hue(50 * 360, 50), 0.0);
    }
}
