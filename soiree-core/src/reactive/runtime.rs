//! Reactive Runtime
//!
//! The runtime connects signals to the effects that read them.
//!
//! # How It Works
//!
//! 1. When an effect is created, it registers with the runtime and gets a
//!    handle. Dropping the handle unregisters it.
//!
//! 2. When a signal is read inside a tracking context, the runtime records
//!    that the current subscriber depends on it.
//!
//! 3. When a signal changes, the runtime looks up its subscribers and
//!    notifies each live one. Inside [`Runtime::batch`] notifications are
//!    queued and delivered once, in first-notified order, when the
//!    outermost batch ends.
//!
//! # Threading
//!
//! Everything here is thread-local. The client core runs on a single
//! logical thread, so no locking is needed and each test thread gets an
//! isolated runtime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;

use super::context::ReactiveContext;
use super::subscriber::{SignalId, Subscriber, SubscriberId};

#[derive(Default)]
struct RuntimeState {
    /// Live subscribers, held weakly.
    registry: HashMap<SubscriberId, Weak<dyn Subscriber>>,
    /// Signal to the subscribers that read it during their last run.
    signal_subscribers: HashMap<SignalId, IndexSet<SubscriberId>>,
    /// Nesting depth of `batch` calls.
    batch_depth: usize,
    /// Subscribers notified while batching.
    pending: IndexSet<SubscriberId>,
}

thread_local! {
    static RUNTIME: RefCell<RuntimeState> = RefCell::new(RuntimeState::default());
}

/// Handle to a registered subscriber.
///
/// Dropping this handle unregisters the subscriber from the runtime.
#[derive(Debug)]
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
}

impl ReactiveHandle {
    /// The registered subscriber's ID.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

/// The per-thread reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Register a subscriber with the runtime.
    pub fn register(subscriber: &Rc<dyn Subscriber>) -> ReactiveHandle {
        let id = subscriber.subscriber_id();
        RUNTIME.with(|rt| {
            rt.borrow_mut().registry.insert(id, Rc::downgrade(subscriber));
        });
        ReactiveHandle { subscriber_id: id }
    }

    fn unregister(id: SubscriberId) {
        // Handles can outlive the runtime during thread teardown.
        let _ = RUNTIME.try_with(|rt| {
            let mut rt = rt.borrow_mut();
            rt.registry.remove(&id);
            rt.pending.shift_remove(&id);
            for subs in rt.signal_subscribers.values_mut() {
                subs.shift_remove(&id);
            }
        });
    }

    /// Record that a subscriber depends on a signal.
    pub fn add_dependency(signal_id: SignalId, subscriber_id: SubscriberId) {
        RUNTIME.with(|rt| {
            rt.borrow_mut()
                .signal_subscribers
                .entry(signal_id)
                .or_default()
                .insert(subscriber_id);
        });
    }

    /// Remove all dependencies for a subscriber.
    ///
    /// Called before re-running a computation so stale reads are forgotten.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        RUNTIME.with(|rt| {
            for subs in rt.borrow_mut().signal_subscribers.values_mut() {
                subs.shift_remove(&subscriber_id);
            }
        });
    }

    /// Number of subscribers currently depending on a signal.
    pub fn subscriber_count(signal_id: SignalId) -> usize {
        RUNTIME.with(|rt| {
            rt.borrow()
                .signal_subscribers
                .get(&signal_id)
                .map_or(0, IndexSet::len)
        })
    }

    /// Notify every subscriber of a signal that it changed.
    pub fn notify_signal_change(signal_id: SignalId) {
        let ready = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let ids: Vec<SubscriberId> = rt
                .signal_subscribers
                .get(&signal_id)
                .map(|subs| subs.iter().copied().collect())
                .unwrap_or_default();

            if rt.batch_depth > 0 {
                rt.pending.extend(ids);
                return Vec::new();
            }
            Self::resolve(&rt, ids)
        });

        // No runtime borrow is held while subscribers run.
        for subscriber in ready {
            subscriber.notify();
        }
    }

    /// Run `f`, deferring notifications until it returns.
    ///
    /// Each subscriber notified during the batch runs at most once afterwards.
    pub fn batch<R>(f: impl FnOnce() -> R) -> R {
        RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
        let result = f();

        let ready = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            rt.batch_depth -= 1;
            if rt.batch_depth > 0 {
                return Vec::new();
            }
            let ids: Vec<SubscriberId> = rt.pending.drain(..).collect();
            Self::resolve(&rt, ids)
        });

        for subscriber in ready {
            subscriber.notify();
        }
        result
    }

    fn resolve(rt: &RuntimeState, ids: Vec<SubscriberId>) -> Vec<Rc<dyn Subscriber>> {
        ids.into_iter()
            .filter_map(|id| rt.registry.get(&id).and_then(Weak::upgrade))
            .collect()
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    #[cfg(test)]
    fn is_registered(id: SubscriberId) -> bool {
        RUNTIME.with(|rt| rt.borrow().registry.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct MockSubscriber {
        id: SubscriberId,
        notified: Cell<usize>,
    }

    impl MockSubscriber {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                id: SubscriberId::new(),
                notified: Cell::new(0),
            })
        }
    }

    impl Subscriber for MockSubscriber {
        fn subscriber_id(&self) -> SubscriberId {
            self.id
        }

        fn notify(&self) {
            self.notified.set(self.notified.get() + 1);
        }
    }

    #[test]
    fn runtime_registers_and_unregisters() {
        let mock = MockSubscriber::new();
        let subscriber: Rc<dyn Subscriber> = mock.clone();

        let handle = Runtime::register(&subscriber);
        assert!(Runtime::is_registered(mock.id));

        drop(handle);
        assert!(!Runtime::is_registered(mock.id));
    }

    #[test]
    fn runtime_notifies_subscribers() {
        let mock = MockSubscriber::new();
        let subscriber: Rc<dyn Subscriber> = mock.clone();
        let _handle = Runtime::register(&subscriber);
        let signal = SignalId::new();

        Runtime::add_dependency(signal, mock.id);
        Runtime::add_dependency(signal, mock.id);
        assert_eq!(Runtime::subscriber_count(signal), 1);

        Runtime::notify_signal_change(signal);
        assert_eq!(mock.notified.get(), 1);
    }

    #[test]
    fn runtime_clears_dependencies() {
        let mock = MockSubscriber::new();
        let subscriber: Rc<dyn Subscriber> = mock.clone();
        let _handle = Runtime::register(&subscriber);
        let signal = SignalId::new();

        Runtime::add_dependency(signal, mock.id);
        Runtime::clear_dependencies(mock.id);
        Runtime::notify_signal_change(signal);

        assert_eq!(mock.notified.get(), 0);
    }

    #[test]
    fn batch_coalesces_notifications() {
        let mock = MockSubscriber::new();
        let subscriber: Rc<dyn Subscriber> = mock.clone();
        let _handle = Runtime::register(&subscriber);
        let a = SignalId::new();
        let b = SignalId::new();
        Runtime::add_dependency(a, mock.id);
        Runtime::add_dependency(b, mock.id);

        Runtime::batch(|| {
            Runtime::notify_signal_change(a);
            Runtime::notify_signal_change(b);
            Runtime::batch(|| Runtime::notify_signal_change(a));
            assert_eq!(mock.notified.get(), 0);
        });

        assert_eq!(mock.notified.get(), 1);
    }

    #[test]
    fn dropped_subscriber_is_not_notified() {
        let signal = SignalId::new();
        let mock = MockSubscriber::new();
        {
            let subscriber: Rc<dyn Subscriber> = mock.clone();
            let _handle = Runtime::register(&subscriber);
            Runtime::add_dependency(signal, mock.id);
        }

        Runtime::notify_signal_change(signal);
        assert_eq!(mock.notified.get(), 0);
        assert_eq!(Runtime::subscriber_count(signal), 0);
    }
}
