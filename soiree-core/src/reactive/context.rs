//! Reactive Context
//!
//! The reactive context tracks which computation is currently running, so a
//! signal read can register that computation as a dependent.
//!
//! # Implementation
//!
//! A thread-local stack holds one frame per running computation. Entering a
//! context pushes a frame, dropping the guard pops it. Frames may be
//! untracked: reads inside an untracked frame register nothing, which is how
//! [`untrack`] shields a nested read from the surrounding effect.

use std::cell::RefCell;

use indexmap::IndexSet;

use super::subscriber::{SignalId, SubscriberId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// One running computation.
#[derive(Debug)]
struct Frame {
    /// `None` for untracked frames.
    subscriber_id: Option<SubscriberId>,
    /// Signals read during this run, in first-read order.
    dependencies: IndexSet<SignalId>,
}

/// Guard for an entered reactive context.
///
/// The frame is popped when the guard is dropped, even on panic.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a tracking context for the given subscriber.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    /// Enter a context in which reads are not tracked.
    pub fn enter_untracked() -> Self {
        Self::push(None)
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(Frame {
                subscriber_id,
                dependencies: IndexSet::new(),
            });
        });
        Self { subscriber_id }
    }

    /// The subscriber that should receive a dependency on a read right now.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|frame| frame.subscriber_id))
    }

    /// Whether reads are currently being tracked.
    pub fn is_tracking() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Record a read of `signal_id` in the innermost tracked frame.
    ///
    /// Returns the subscriber the read was attributed to.
    pub fn track_dependency(signal_id: SignalId) -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = stack.last_mut()?;
            let subscriber_id = frame.subscriber_id?;
            frame.dependencies.insert(signal_id);
            Some(subscriber_id)
        })
    }

    /// Signals read so far in the innermost frame.
    pub fn dependencies() -> Vec<SignalId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|frame| frame.dependencies.iter().copied().collect())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        // The stack may already be gone during thread teardown.
        let _ = CONTEXT_STACK.try_with(|stack| {
            let popped = stack.borrow_mut().pop();
            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch"
                );
            }
        });
    }
}

/// Run `f` without tracking any signal reads it performs.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::enter_untracked();
    f()
}
