//! Change notifications for store subscribers.
//!
//! # Responsibility
//! - Keep the listener list UI layers register with the store.
//! - Deliver one event per successful store mutation, synchronously.
//!
//! # Invariants
//! - Listeners are called in subscription order.
//! - Subscription ids are never reused within one registry.

use crate::model::document::{PhylogenyId, PhylorefId};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// Handle returned by `subscribe`, used to unsubscribe.
pub type SubscriptionId = u64;

/// Listener callback. Runs on the caller's thread inside the mutation call.
pub type StoreListener = Box<dyn FnMut(&StoreEvent)>;

/// What changed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Current document was replaced wholesale.
    CurrentReplaced,
    /// Baseline snapshot was replaced.
    LoadedReplaced,
    PhylorefAdded(PhylorefId),
    PhylorefChanged(PhylorefId),
    PhylorefRemoved(PhylorefId),
    PhylogenyAdded(PhylogenyId),
    PhylogenyChanged(PhylogenyId),
    PhylogenyRemoved(PhylogenyId),
    /// Curator fields or the default nomenclatural code changed.
    MetadataChanged,
    /// Reasoning results were set or cleared.
    ReasoningResultsChanged,
}

/// Ordered listener registry.
#[derive(Default)]
pub struct EventRegistry {
    listeners: BTreeMap<SubscriptionId, StoreListener>,
    next_id: SubscriptionId,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one listener and returns its handle.
    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Removes one listener. Returns `false` when the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, event: StoreEvent) {
        for listener in self.listeners.values_mut() {
            listener(&event);
        }
    }
}

impl Debug for EventRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventRegistry, StoreEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_listeners_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry.subscribe(Box::new(move |_| seen.borrow_mut().push(tag)));
        }

        registry.emit(StoreEvent::MetadataChanged);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery_and_ids_are_not_reused() {
        let count = Rc::new(RefCell::new(0));
        let mut registry = EventRegistry::new();
        let counter = Rc::clone(&count);
        let id = registry.subscribe(Box::new(move |_| *counter.borrow_mut() += 1));

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.emit(StoreEvent::LoadedReplaced);
        assert_eq!(*count.borrow(), 0);

        let next = registry.subscribe(Box::new(|_| {}));
        assert_ne!(next, id);
        assert_eq!(registry.len(), 1);
    }
}
