//! # Subscriber registry with stable handles.
//!
//! The registry is plain data owned by the dispatcher's shared state; it is
//! always accessed under the same lock as the event queue, so registrations
//! can never interleave with an active drain.
//!
//! ## Rules
//! - Registration order is preserved and **is** the delivery order.
//! - Each registration gets a [`SubscriberId`] that stays valid until
//!   explicitly removed; ids are never reused within one dispatcher.
//! - Entries hold `Arc<dyn Subscribe>`: the registry shares ownership, so a
//!   subscriber can never dangle even if the caller drops its own handle.

use std::fmt;
use std::sync::Arc;

use crate::subscribers::Subscribe;

/// Stable handle to one subscriber registration.
///
/// Returned by [`Dispatcher::subscribe`](crate::Dispatcher::subscribe) and
/// accepted by [`Dispatcher::unsubscribe`](crate::Dispatcher::unsubscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

struct Entry {
    id: SubscriberId,
    subscriber: Arc<dyn Subscribe>,
}

/// Ordered set of registered subscribers.
pub(crate) struct Registry {
    entries: Vec<Entry>,
    next: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
        }
    }

    /// Appends a subscriber and returns its stable id.
    pub(crate) fn insert(&mut self, subscriber: Arc<dyn Subscribe>) -> SubscriberId {
        let id = SubscriberId(self.next);
        self.next += 1;
        self.entries.push(Entry { id, subscriber });
        id
    }

    /// Removes a registration. Returns `false` if the id is unknown
    /// (already removed, or from another dispatcher).
    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Subscribers in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<dyn Subscribe>> {
        self.entries.iter().map(|entry| &entry.subscriber)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use async_trait::async_trait;

    struct Silent;

    #[async_trait]
    impl Subscribe for Silent {
        async fn handle(&self, _event: &Event) {}
    }

    #[test]
    fn test_ids_are_stable_and_unique() {
        let mut registry = Registry::new();
        let a = registry.insert(Arc::new(Silent));
        let b = registry.insert(Arc::new(Silent));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);

        // Ids are not reused after removal.
        let c = registry.insert(Arc::new(Silent));
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_iteration_preserves_registration_order() {
        let mut registry = Registry::new();
        let first = Arc::new(Silent);
        let second = Arc::new(Silent);
        registry.insert(first.clone());
        registry.insert(second.clone());

        let order: Vec<*const dyn Subscribe> = registry.iter().map(Arc::as_ptr).collect();
        assert!(std::ptr::addr_eq(order[0], Arc::as_ptr(&first)));
        assert!(std::ptr::addr_eq(order[1], Arc::as_ptr(&second)));
    }
}
