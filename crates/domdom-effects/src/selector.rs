//! Effect selection: random start, cyclic advance, seasonal pools.

use chrono::NaiveDate;
use rand::Rng;

use crate::{Coordinator, is_festive_season};

/// Effects cycled through during the festive window.
const FESTIVE_POOL: &[&str] = &["fireworks", "petals"];

/// Effects cycled through the rest of the year.
const DEFAULT_POOL: &[&str] = &["network", "starfield", "drift"];

/// Glyph shown when no effect is selected.
const FALLBACK_ICON: char = '✦';

/// Chooses the active effect and drives the toggle icon.
///
/// Built after the registry is fully populated; activates a random pool
/// entry immediately and enables effects globally.
#[derive(Debug)]
pub struct Selector {
    pool: Vec<String>,
    index: usize,
}

impl Selector {
    /// Build the seasonal pool for `today`, pick a starting effect
    /// (uniformly random unless `start` names a pool entry), activate it,
    /// and enable effects.
    pub fn init(coordinator: &mut Coordinator, today: NaiveDate, start: Option<&str>) -> Self {
        let pool: Vec<String> = if is_festive_season(today) {
            FESTIVE_POOL.iter().map(|s| s.to_string()).collect()
        } else {
            DEFAULT_POOL.iter().map(|s| s.to_string()).collect()
        };

        let index = start
            .and_then(|name| pool.iter().position(|p| p == name))
            .unwrap_or_else(|| rand::rng().random_range(0..pool.len()));

        let selector = Self { pool, index };
        coordinator.toggle_enabled(true);
        coordinator.set_effect(&selector.pool[selector.index]);

        // A fixed start outside the pool still wins; the cycle resumes from
        // the random index on the next advance.
        if let Some(name) = start
            && !selector.pool.iter().any(|p| p == name)
        {
            coordinator.set_effect(name);
        }

        selector
    }

    /// Advance cyclically to the next pool entry and activate it.
    pub fn next(&mut self, coordinator: &mut Coordinator) {
        self.index = (self.index + 1) % self.pool.len();
        coordinator.set_effect(&self.pool[self.index]);
    }

    /// Disable effects globally. The selection index is untouched.
    pub fn turn_off(&self, coordinator: &mut Coordinator) {
        coordinator.toggle_enabled(false);
    }

    /// Re-enable effects on the retained selection.
    pub fn turn_on(&self, coordinator: &mut Coordinator) {
        coordinator.toggle_enabled(true);
    }

    /// The icon glyph for the current selection.
    pub fn icon(&self, coordinator: &Coordinator) -> char {
        coordinator.current_icon().unwrap_or(FALLBACK_ICON)
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EffectContext, EffectRegistry, InputHub, SurfaceHandle, register_builtin};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn coordinator() -> Coordinator {
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry);
        let ctx = EffectContext::new(SurfaceHandle::sized(60, 20), InputHub::new());
        Coordinator::new(registry, ctx)
    }

    #[test]
    fn default_pool_outside_season() {
        let mut coord = coordinator();
        let selector = Selector::init(&mut coord, date(2026, 7, 1), None);
        assert_eq!(selector.pool(), DEFAULT_POOL);
        assert!(coord.is_enabled());
        assert!(coord.current_name().is_some());
    }

    #[test]
    fn festive_pool_in_season() {
        let mut coord = coordinator();
        let selector = Selector::init(&mut coord, date(2026, 1, 15), None);
        assert_eq!(selector.pool(), FESTIVE_POOL);

        let mut coord = coordinator();
        let selector = Selector::init(&mut coord, date(2025, 12, 26), None);
        assert_eq!(selector.pool(), FESTIVE_POOL);

        let mut coord = coordinator();
        let selector = Selector::init(&mut coord, date(2025, 12, 20), None);
        assert_eq!(selector.pool(), DEFAULT_POOL);
    }

    #[test]
    fn advancing_pool_size_times_returns_to_start() {
        let mut coord = coordinator();
        let mut selector = Selector::init(&mut coord, date(2026, 7, 1), None);
        let start = selector.index();
        for _ in 0..selector.pool().len() {
            selector.next(&mut coord);
        }
        assert_eq!(selector.index(), start);
    }

    #[test]
    fn fixed_start_is_honored() {
        let mut coord = coordinator();
        Selector::init(&mut coord, date(2026, 7, 1), Some("starfield"));
        assert_eq!(coord.current_name(), Some("starfield"));
    }

    #[test]
    fn off_keeps_the_selection_index() {
        let mut coord = coordinator();
        let mut selector = Selector::init(&mut coord, date(2026, 7, 1), None);
        selector.next(&mut coord);
        let index = selector.index();
        selector.turn_off(&mut coord);
        assert!(!coord.is_enabled());
        assert_eq!(selector.index(), index);
        assert_eq!(coord.running_count(), 0);
    }
}
