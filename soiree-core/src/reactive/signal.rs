//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! notifies the effects that read it when the value changes.
//!
//! # How Signals Work
//!
//! 1. When a signal is read within a tracking context (an effect run), the
//!    signal registers that effect with the runtime as a dependent.
//!
//! 2. When the signal is written, the runtime notifies the dependents.
//!
//! 3. Writes with [`Signal::set_if_changed`] skip the notification when the
//!    new value equals the old one.
//!
//! Signals are cheap handles: cloning shares the same value.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use super::context::ReactiveContext;
use super::runtime::Runtime;
use super::subscriber::SignalId;

/// A reactive signal holding a value of type T.
///
/// # Example
///
/// ```rust
/// use soiree_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T: 'static> {
    id: SignalId,
    value: Rc<RefCell<T>>,
}

impl<T: 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: SignalId::new(),
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    fn track(&self) {
        if let Some(subscriber_id) = ReactiveContext::track_dependency(self.id) {
            Runtime::add_dependency(self.id, subscriber_id);
        }
    }

    /// Borrow the value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&*self.value.borrow())
    }

    /// Borrow the value without establishing a dependency.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.borrow())
    }

    /// Replace the value and notify dependents.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        Runtime::notify_signal_change(self.id);
    }

    /// Mutate the value in place and notify dependents.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.value.borrow_mut());
        Runtime::notify_signal_change(self.id);
    }

    /// Number of subscribers that read this signal during their last run.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.id)
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Get the current value.
    ///
    /// If called within a tracking context, this also registers the current
    /// computation as a dependent.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

impl<T: PartialEq + 'static> Signal<T> {
    /// Set the value only if it differs, returning whether it changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        Runtime::notify_signal_change(self.id);
        true
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Rc::clone(&self.value),
        }
    }
}

impl<T: Debug + 'static> Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &*self.value.borrow())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::subscriber::SubscriberId;

    #[test]
    fn signal_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), 0);

        signal.set(42);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn signal_update_in_place() {
        let signal = Signal::new(vec![1, 2]);
        signal.update(|v| v.push(3));
        assert_eq!(signal.get(), vec![1, 2, 3]);
    }

    #[test]
    fn set_if_changed_reports_changes() {
        let signal = Signal::new("a".to_string());
        assert!(!signal.set_if_changed("a".to_string()));
        assert!(signal.set_if_changed("b".to_string()));
        assert_eq!(signal.get_untracked(), "b");
    }

    #[test]
    fn read_inside_context_registers_dependency() {
        let signal = Signal::new(1);
        let subscriber = SubscriberId::new();

        let _ = signal.get();
        assert_eq!(signal.subscriber_count(), 0);

        {
            let _ctx = ReactiveContext::enter(subscriber);
            let _ = signal.get();
            let _ = signal.get_untracked();
        }
        assert_eq!(signal.subscriber_count(), 1);
        Runtime::clear_dependencies(subscriber);
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = Signal::new(0);
        let signal2 = signal1.clone();

        signal1.set(42);
        assert_eq!(signal2.get(), 42);
        assert_eq!(signal1.id(), signal2.id());
    }
}
