//! Name-to-effect registry.

use crate::Effect;

/// Ordered mapping from effect name to instance.
///
/// Registration order is stable, which is what the selector's cyclic
/// advance relies on. Registering an existing name replaces the instance
/// in place without disturbing the order.
#[derive(Default)]
pub struct EffectRegistry {
    entries: Vec<(String, Box<dyn Effect>)>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace `effect` under `name`. An empty name is a no-op.
    pub fn register(&mut self, name: &str, effect: Box<dyn Effect>) {
        if name.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = effect,
            None => self.entries.push((name.to_owned(), effect)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Effect> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Box<dyn Effect>> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Effect)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
