//! Reactive Primitives
//!
//! This module implements the reactive system the view layer is built on:
//! signals, effects and scopes.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracking context (an effect run), the signal registers that
//! effect as a dependent. When the value changes, all dependents re-run.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change. Render effects keep dynamic regions of a view in
//! sync with the signals they read.
//!
//! ## Scopes
//!
//! A Scope owns effects and cleanups and carries context values for its
//! descendants. Disposing a scope is how a component is torn down.
//!
//! # Implementation Notes
//!
//! The whole system is single-threaded: state lives in `Rc`/`RefCell`, and
//! the tracking stack, scope stack and runtime are thread-local.

mod context;
mod effect;
mod runtime;
mod scope;
mod signal;
mod subscriber;

pub use context::{untrack, ReactiveContext};
pub use effect::Effect;
pub use runtime::{ReactiveHandle, Runtime};
pub use scope::{on_cleanup, provide_context, use_context, Scope, ScopeId};
pub use signal::Signal;
pub use subscriber::{SignalId, Subscriber, SubscriberId};
