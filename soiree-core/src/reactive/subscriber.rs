//! Identifiers and the subscriber trait for the reactive system.
//!
//! A subscriber is any computation that re-runs when the signals it read
//! change. In this crate that means effects, including the render effects
//! behind dynamic views.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

impl SignalId {
    /// Generate a new unique signal ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SignalId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a subscriber.
///
/// Each subscriber gets an ID when created. The runtime uses it to route
/// change notifications and to drop stale dependencies before a re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A computation the runtime can notify.
///
/// Implementors are held by the runtime through weak references, so a
/// subscriber that is dropped simply stops receiving notifications.
pub trait Subscriber {
    /// The ID this subscriber registered under.
    fn subscriber_id(&self) -> SubscriberId;

    /// One of the signals read during the last run changed.
    fn notify(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn signal_ids_increase() {
        let first = SignalId::new();
        let second = SignalId::new();
        assert!(second.raw() > first.raw());
    }
}
