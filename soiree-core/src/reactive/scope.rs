//! Reactive Scopes
//!
//! A scope owns the reactive work created while it is active: effects,
//! cleanup callbacks, child scopes, and context values provided to its
//! descendants. Disposing a scope tears all of that down and marks it
//! dead, which deferred callbacks check before touching state that
//! belonged to the scope.
//!
//! Scopes form a tree. A child holds its parent strongly (for context
//! lookup); a parent holds its children weakly, so a child lives exactly as
//! long as whoever created it keeps it.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use super::context::untrack;
use super::effect::Effect;

thread_local! {
    static SCOPE_STACK: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Unique identifier for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct ScopeInner {
    id: ScopeId,
    parent: Option<Scope>,
    alive: Cell<bool>,
    contexts: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
    effects: RefCell<Vec<Effect>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Weak<ScopeInner>>>,
}

/// An owner for effects, cleanups and context values.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    /// Create a scope with no parent.
    pub fn root() -> Self {
        Self::with_parent(None)
    }

    /// Create a scope under `parent`, or a root scope when there is none.
    pub fn child_of(parent: Option<&Scope>) -> Self {
        let scope = Self::with_parent(parent.cloned());
        if let Some(parent) = parent {
            parent
                .inner
                .children
                .borrow_mut()
                .push(Rc::downgrade(&scope.inner));
        }
        scope
    }

    fn with_parent(parent: Option<Scope>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                id: ScopeId::next(),
                parent,
                alive: Cell::new(true),
                contexts: RefCell::new(HashMap::new()),
                effects: RefCell::new(Vec::new()),
                cleanups: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The innermost scope currently running, if any.
    pub fn current() -> Option<Scope> {
        SCOPE_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Get the scope's unique ID.
    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Run `f` with this scope as the current scope.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        SCOPE_STACK.with(|stack| stack.borrow_mut().push(self.clone()));
        let _guard = PopGuard;
        f()
    }

    /// Whether the scope has not been disposed.
    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    /// Take ownership of an effect; it is disposed with the scope.
    pub fn adopt_effect(&self, effect: Effect) {
        if !self.is_alive() {
            effect.dispose();
            return;
        }
        self.inner.effects.borrow_mut().push(effect);
    }

    /// Register a callback to run when the scope is disposed.
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) {
        if !self.is_alive() {
            cleanup();
            return;
        }
        self.inner.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    /// Make `value` visible to this scope and its descendants.
    pub fn provide<T: Clone + 'static>(&self, value: T) {
        self.inner
            .contexts
            .borrow_mut()
            .insert(TypeId::of::<T>(), Rc::new(value));
    }

    /// Look up a provided value, walking from this scope to the root.
    pub fn lookup<T: Clone + 'static>(&self) -> Option<T> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let found = current
                .inner
                .contexts
                .borrow()
                .get(&TypeId::of::<T>())
                .and_then(|value| (**value).downcast_ref::<T>().cloned());
            if found.is_some() {
                return found;
            }
            scope = current.inner.parent.as_ref();
        }
        None
    }

    /// Dispose the scope and everything it owns, children first.
    ///
    /// Disposing twice is a no-op.
    pub fn dispose(&self) {
        if !self.inner.alive.replace(false) {
            return;
        }

        let children: Vec<_> = self.inner.children.borrow_mut().drain(..).collect();
        for child in children.iter().filter_map(Weak::upgrade) {
            Scope { inner: child }.dispose();
        }

        let effects: Vec<_> = self.inner.effects.borrow_mut().drain(..).collect();
        for effect in &effects {
            effect.dispose();
        }

        // Disposal often happens inside a re-rendering effect; reads made by
        // cleanups must not subscribe that effect.
        let cleanups: Vec<_> = self.inner.cleanups.borrow_mut().drain(..).collect();
        untrack(|| {
            for cleanup in cleanups.into_iter().rev() {
                cleanup();
            }
        });

        self.inner.contexts.borrow_mut().clear();
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("alive", &self.is_alive())
            .field("effects", &self.inner.effects.borrow().len())
            .finish()
    }
}

struct PopGuard;

impl Drop for PopGuard {
    fn drop(&mut self) {
        let _ = SCOPE_STACK.try_with(|stack| stack.borrow_mut().pop());
    }
}

/// Provide a context value in the current scope.
///
/// Outside any scope there is nowhere to attach the value; it is dropped
/// with a warning and `false` is returned.
pub fn provide_context<T: Clone + 'static>(value: T) -> bool {
    match Scope::current() {
        Some(scope) => {
            scope.provide(value);
            true
        }
        None => {
            warn!(
                context = std::any::type_name::<T>(),
                "provide_context called outside any scope; value dropped"
            );
            false
        }
    }
}

/// Look up a context value from the current scope upwards.
pub fn use_context<T: Clone + 'static>() -> Option<T> {
    Scope::current().and_then(|scope| scope.lookup::<T>())
}

/// Register a cleanup on the current scope.
///
/// Without a current scope the cleanup can never fire, so it runs now.
pub fn on_cleanup(cleanup: impl FnOnce() + 'static) {
    match Scope::current() {
        Some(scope) => scope.on_cleanup(cleanup),
        None => cleanup(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Signal;

    #[test]
    fn run_sets_current_scope() {
        let scope = Scope::root();
        assert!(Scope::current().is_none());

        let inside = scope.run(|| Scope::current().map(|s| s.id()));
        assert_eq!(inside, Some(scope.id()));
        assert!(Scope::current().is_none());
    }

    #[test]
    fn context_is_visible_to_descendants_only() {
        let root = Scope::root();
        let child = Scope::child_of(Some(&root));
        let sibling = Scope::root();

        root.run(|| provide_context(7_u32));

        assert_eq!(child.run(use_context::<u32>), Some(7));
        assert_eq!(sibling.run(use_context::<u32>), None);
        assert_eq!(use_context::<u32>(), None);
    }

    #[test]
    fn nearest_provider_wins() {
        let root = Scope::root();
        let child = Scope::child_of(Some(&root));
        root.provide("outer");
        child.provide("inner");

        assert_eq!(child.lookup::<&str>(), Some("inner"));
        assert_eq!(root.lookup::<&str>(), Some("outer"));
    }

    #[test]
    fn provide_outside_scope_is_dropped() {
        assert!(!provide_context(1_i64));
        assert_eq!(use_context::<i64>(), None);
    }

    #[test]
    fn dispose_stops_effects_and_runs_cleanups() {
        let scope = Scope::root();
        let signal = Signal::new(0);
        let runs = Rc::new(Cell::new(0));
        let cleaned = Rc::new(Cell::new(false));

        scope.run(|| {
            let (signal, runs) = (signal.clone(), runs.clone());
            let _ = Effect::new(move || {
                signal.get();
                runs.set(runs.get() + 1);
            });
            let cleaned = cleaned.clone();
            on_cleanup(move || cleaned.set(true));
        });

        signal.set(1);
        assert_eq!(runs.get(), 2);

        scope.dispose();
        signal.set(2);
        assert_eq!(runs.get(), 2);
        assert!(cleaned.get());
    }

    #[test]
    fn cleanup_reads_do_not_subscribe_the_running_effect() {
        let watched = Signal::new(0);
        let runs = Rc::new(Cell::new(0));
        let scope = Scope::root();
        {
            let watched = watched.clone();
            scope.on_cleanup(move || {
                watched.get();
            });
        }

        let _effect = {
            let runs = runs.clone();
            Effect::new(move || {
                runs.set(runs.get() + 1);
                scope.dispose();
            })
        };
        assert_eq!(runs.get(), 1);

        watched.set(1);
        assert_eq!(runs.get(), 1);
        assert_eq!(watched.subscriber_count(), 0);
    }

    #[test]
    fn dispose_cascades_to_children() {
        let root = Scope::root();
        let child = Scope::child_of(Some(&root));

        root.dispose();
        assert!(!child.is_alive());

        // Second dispose is harmless.
        root.dispose();
    }
}
