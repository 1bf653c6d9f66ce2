//! Dynamic Regions
//!
//! [`dynamic`] turns a render closure into a live part of the view tree.
//! The closure runs inside an effect; whenever a signal it read changes,
//! it runs again and the region's slot is replaced with the new output.
//!
//! Each run gets a fresh child scope. The previous run's scope is disposed
//! first, so components created by a stale render stop reacting and any
//! mount hooks they queued become no-ops.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::host::CommitQueue;
use super::node::{DynamicView, View};
use crate::reactive::{use_context, Effect, Scope};

/// Create a region that re-renders when the signals read by `render` change.
///
/// The first render happens immediately.
pub fn dynamic<F>(render: F) -> View
where
    F: Fn() -> View + 'static,
{
    let slot = Rc::new(RefCell::new(View::Empty));
    let parent = Scope::current();
    let commits = use_context::<CommitQueue>();
    let run_scope: Rc<RefCell<Option<Scope>>> = Rc::new(RefCell::new(None));

    let effect = {
        let slot = Rc::clone(&slot);
        Effect::new(move || {
            let stale = run_scope.borrow_mut().take();
            if let Some(stale) = stale {
                stale.dispose();
            }

            let scope = Scope::child_of(parent.as_ref());
            let view = scope.run(&render);
            *run_scope.borrow_mut() = Some(scope);
            *slot.borrow_mut() = view;

            if let Some(commits) = &commits {
                debug!("dynamic region re-rendered; commit requested");
                commits.request_commit();
            }
        })
    };

    View::Dynamic(DynamicView { slot, effect })
}
