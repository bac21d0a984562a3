//! Listener bookkeeping for effect-scoped input.
//!
//! Each effect attaches exactly the listener kinds it needs when it starts
//! and detaches them all when it stops, so a stopped effect can never be
//! reached by a stray pointer or resize event. The hub is the single source
//! of truth for "who is listening to what".

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use domdom_core::InputKind;

/// Shared registry of `(owner, kind)` input attachments.
#[derive(Debug, Clone, Default)]
pub struct InputHub {
    inner: Rc<RefCell<HashMap<&'static str, HashSet<InputKind>>>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `owner` for the given kinds, replacing any prior attachment.
    pub fn attach(&self, owner: &'static str, kinds: &[InputKind]) {
        self.inner
            .borrow_mut()
            .insert(owner, kinds.iter().copied().collect());
    }

    /// Remove every attachment held by `owner`.
    pub fn detach(&self, owner: &'static str) {
        self.inner.borrow_mut().remove(owner);
    }

    /// Whether `owner` is currently attached for `kind`.
    pub fn wants(&self, owner: &str, kind: InputKind) -> bool {
        self.inner
            .borrow()
            .get(owner)
            .is_some_and(|kinds| kinds.contains(&kind))
    }

    /// The set of kinds `owner` is attached for (empty when detached).
    pub fn attachments(&self, owner: &str) -> HashSet<InputKind> {
        self.inner.borrow().get(owner).cloned().unwrap_or_default()
    }

    /// Total number of attached listener kinds, across all owners.
    pub fn attached_count(&self) -> usize {
        self.inner.borrow().values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_detach_round_trip() {
        let hub = InputHub::new();
        hub.attach("fx", &[InputKind::PointerMove, InputKind::Resize]);
        assert!(hub.wants("fx", InputKind::PointerMove));
        assert!(!hub.wants("fx", InputKind::Click));
        assert_eq!(hub.attached_count(), 2);

        hub.detach("fx");
        assert!(!hub.wants("fx", InputKind::PointerMove));
        assert_eq!(hub.attached_count(), 0);
    }

    #[test]
    fn reattach_replaces_prior_set() {
        let hub = InputHub::new();
        hub.attach("fx", &[InputKind::PointerMove, InputKind::Click]);
        hub.attach("fx", &[InputKind::Resize]);
        assert_eq!(
            hub.attachments("fx"),
            [InputKind::Resize].into_iter().collect()
        );
    }

    #[test]
    fn owners_are_independent() {
        let hub = InputHub::new();
        hub.attach("a", &[InputKind::Click]);
        hub.attach("b", &[InputKind::Resize]);
        hub.detach("a");
        assert!(hub.wants("b", InputKind::Resize));
        assert_eq!(hub.attached_count(), 1);
    }
}
