//! Effects
//!
//! An effect re-runs a closure whenever a signal it read on its last run is
//! written. Every run starts from an empty dependency set, so a branch that
//! stops reading a signal also stops being woken by it. Dynamic view
//! regions are effects whose closure re-renders their slot.
//!
//! # Ownership
//!
//! An effect created while a [`Scope`](super::Scope) is active is adopted by
//! it and disposed together with it. A disposed effect never runs again.
//!
//! # Re-entrancy
//!
//! An effect that writes a signal it also reads does not recurse into
//! itself: a notification that arrives mid-run is dropped and logged.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

use super::context::ReactiveContext;
use super::runtime::{ReactiveHandle, Runtime};
use super::scope::Scope;
use super::subscriber::{Subscriber, SubscriberId};

struct EffectInner {
    subscriber_id: SubscriberId,
    run: Box<dyn Fn()>,
    disposed: Cell<bool>,
    running: Cell<bool>,
    run_count: Cell<usize>,
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.get() {
            return;
        }
        if self.running.replace(true) {
            trace!(subscriber = self.subscriber_id.raw(), "effect notified while running; skipped");
            return;
        }

        Runtime::clear_dependencies(self.subscriber_id);
        {
            let _ctx = ReactiveContext::enter(self.subscriber_id);
            (self.run)();
        }

        self.run_count.set(self.run_count.get() + 1);
        self.running.set(false);
    }
}

impl Subscriber for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn notify(&self) {
        self.execute();
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust
/// use soiree_core::reactive::{Effect, Signal};
///
/// let count = Signal::new(0);
/// let seen = Signal::new(Vec::new());
///
/// let _effect = {
///     let (count, seen) = (count.clone(), seen.clone());
///     Effect::new(move || {
///         let value = count.get();
///         seen.update(|s| s.push(value));
///     })
/// };
///
/// count.set(5);
/// assert_eq!(seen.get_untracked(), vec![0, 5]);
/// ```
#[derive(Clone)]
pub struct Effect {
    inner: Rc<EffectInner>,
    // Shared by clones; the last clone dropped unregisters the effect.
    _handle: Rc<ReactiveHandle>,
}

impl Effect {
    /// Create a new effect and run it immediately.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self::new_lazy(run);
        effect.execute();
        effect
    }

    /// Create a new effect without running it.
    ///
    /// It has no dependencies until [`execute`](Self::execute) is called.
    pub fn new_lazy<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let inner = Rc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            run: Box::new(run),
            disposed: Cell::new(false),
            running: Cell::new(false),
            run_count: Cell::new(0),
        });
        let subscriber: Rc<dyn Subscriber> = inner.clone();
        let handle = Runtime::register(&subscriber);

        let effect = Self {
            inner,
            _handle: Rc::new(handle),
        };
        if let Some(scope) = Scope::current() {
            scope.adopt_effect(effect.clone());
        }
        effect
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Run the effect function, re-tracking its dependencies.
    pub fn execute(&self) {
        self.inner.execute();
    }

    /// Dispose of the effect. It will not run again.
    pub fn dispose(&self) {
        self.inner.disposed.set(true);
        Runtime::clear_dependencies(self.inner.subscriber_id);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.get()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.inner.subscriber_id)
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
