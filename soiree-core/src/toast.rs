//! Toast notifications.
//!
//! A [`Toaster`] is installed into a scope by [`provide_toaster`] and found
//! again with [`use_toast`]. The list lives in a [`Signal`], so a
//! `dynamic` region that reads [`Toaster::list`] re-renders whenever a
//! toast is added, changed or removed.
//!
//! Dismissing a toast only closes it; it stays in the list until its
//! removal delay passes and a [`Toaster::sweep_at`] call collects it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::UiError;
use crate::reactive::{provide_context, use_context, Signal};

/// Identifies a toast. Ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    /// A fresh id, unique across every toaster in the process.
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
    /// False once dismissed; the toast is removed after the delay.
    pub open: bool,
}

/// The content of a toast to add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewToast {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: ToastVariant,
}

impl NewToast {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn destructive(mut self) -> Self {
        self.variant = ToastVariant::Destructive;
        self
    }
}

/// Fields to change on an existing toast. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: Option<ToastVariant>,
}

#[derive(Debug, Default)]
struct Bookkeeping {
    /// Dismissed toasts and when they may be removed.
    removals: IndexMap<ToastId, Instant>,
}

/// The notification registry. Clones share the same list.
#[derive(Clone)]
pub struct Toaster {
    toasts: Signal<Vec<Toast>>,
    books: Rc<RefCell<Bookkeeping>>,
    limit: usize,
    remove_delay: Duration,
}

impl Toaster {
    /// A toaster keeping at most `limit` toasts.
    pub fn new(limit: usize, remove_delay: Duration) -> Self {
        Self {
            toasts: Signal::new(Vec::new()),
            books: Rc::new(RefCell::new(Bookkeeping::default())),
            limit: limit.max(1),
            remove_delay,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.toast_limit,
            Duration::from_millis(config.toast_remove_delay_ms),
        )
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Add a toast at the front of the list and return its id.
    ///
    /// Older toasts beyond the limit are dropped.
    pub fn add(&self, toast: NewToast) -> ToastId {
        let id = ToastId::next();

        let mut evicted = Vec::new();
        self.toasts.update(|list| {
            list.insert(
                0,
                Toast {
                    id,
                    title: toast.title,
                    description: toast.description,
                    variant: toast.variant,
                    open: true,
                },
            );
            if list.len() > self.limit {
                evicted.extend(list.drain(self.limit..).map(|t| t.id));
            }
        });

        if !evicted.is_empty() {
            let mut books = self.books.borrow_mut();
            for old in &evicted {
                books.removals.shift_remove(old);
            }
            debug!(count = evicted.len(), "toasts evicted past limit");
        }
        id
    }

    /// Apply `patch` to the toast with `id`. Returns false if it is gone.
    pub fn update(&self, id: ToastId, patch: ToastUpdate) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.toasts.update(|list| {
            if let Some(toast) = list.iter_mut().find(|t| t.id == id) {
                if let Some(title) = patch.title {
                    toast.title = Some(title);
                }
                if let Some(description) = patch.description {
                    toast.description = Some(description);
                }
                if let Some(variant) = patch.variant {
                    toast.variant = variant;
                }
            }
        });
        true
    }

    /// Close one toast, or every toast with `None`, and schedule removal.
    pub fn dismiss(&self, id: Option<ToastId>) {
        self.dismiss_at(id, Instant::now());
    }

    /// [`dismiss`](Self::dismiss) with an explicit clock.
    pub fn dismiss_at(&self, id: Option<ToastId>, now: Instant) {
        let targets: Vec<ToastId> = self.toasts.with_untracked(|list| {
            list.iter()
                .filter(|t| id.map_or(true, |id| t.id == id))
                .map(|t| t.id)
                .collect()
        });
        if targets.is_empty() {
            return;
        }

        {
            let mut books = self.books.borrow_mut();
            let deadline = now + self.remove_delay;
            for target in &targets {
                // A second dismiss keeps the first deadline.
                books.removals.entry(*target).or_insert(deadline);
            }
        }

        self.toasts.update(|list| {
            for toast in list.iter_mut().filter(|t| targets.contains(&t.id)) {
                toast.open = false;
            }
        });
    }

    /// Remove one toast, or every toast with `None`, immediately.
    pub fn remove(&self, id: Option<ToastId>) {
        match id {
            Some(id) => {
                self.books.borrow_mut().removals.shift_remove(&id);
                if self.contains(id) {
                    self.toasts.update(|list| list.retain(|t| t.id != id));
                }
            }
            None => {
                self.books.borrow_mut().removals.clear();
                if self.toasts.with_untracked(|list| !list.is_empty()) {
                    self.toasts.set(Vec::new());
                }
            }
        }
    }

    /// Remove dismissed toasts whose delay has passed by `now`.
    /// Returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let due: Vec<ToastId> = {
            let mut books = self.books.borrow_mut();
            let due: Vec<ToastId> = books
                .removals
                .iter()
                .filter(|(_, deadline)| **deadline <= now)
                .map(|(id, _)| *id)
                .collect();
            books.removals.retain(|_, deadline| *deadline > now);
            due
        };
        if due.is_empty() {
            return 0;
        }

        self.toasts.update(|list| list.retain(|t| !due.contains(&t.id)));
        due.len()
    }

    /// The toasts, newest first. Tracked when read inside an effect.
    pub fn list(&self) -> Vec<Toast> {
        self.toasts.get()
    }

    pub fn get(&self, id: ToastId) -> Option<Toast> {
        self.toasts
            .with_untracked(|list| list.iter().find(|t| t.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.toasts.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: ToastId) -> bool {
        self.toasts.with_untracked(|list| list.iter().any(|t| t.id == id))
    }
}

impl fmt::Debug for Toaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toaster")
            .field("toasts", &self.len())
            .field("limit", &self.limit)
            .field("remove_delay", &self.remove_delay)
            .finish()
    }
}

/// Install a toaster in the current scope and return it.
///
/// Outside any scope the toaster is still returned, but [`use_toast`]
/// will not find it.
pub fn provide_toaster(config: &SiteConfig) -> Toaster {
    let toaster = Toaster::from_config(config);
    provide_context(toaster.clone());
    toaster
}

/// The toaster provided by an enclosing scope.
pub fn use_toast() -> Result<Toaster, UiError> {
    use_context::<Toaster>().ok_or(UiError::MissingContext {
        hook: "use_toast",
        provider: "a toast provider",
    })
}
