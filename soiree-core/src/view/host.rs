//! Render Host
//!
//! The host owns a view tree and drives the render/commit cycle:
//!
//! 1. The root component runs inside the host's root scope and produces a
//!    [`View`]. Dynamic regions render immediately.
//!
//! 2. The host commits: it serializes the tree to HTML and records the
//!    result as the live output.
//!
//! 3. In [`RenderMode::Client`] the host then drains the post-commit hooks
//!    that components queued with [`on_mount`]. A hook that changes a
//!    signal re-renders the regions that read it, which requests another
//!    commit. The cycle repeats until no hooks are pending and no commit is
//!    requested.
//!
//! In [`RenderMode::Server`] nothing is ever committed to a live target, so
//! no [`CommitQueue`] is provided and mount hooks never fire.
//!
//! [`Host::hydrate`] mounts on the client over server-rendered HTML and
//! compares the first client commit against it. A difference is a hydration
//! mismatch: it is logged and recorded on the host.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::node::View;
use crate::reactive::{use_context, Runtime, Scope};

/// Upper bound on commit passes triggered by a single flush.
const MAX_COMMIT_PASSES: usize = 64;

/// Which side of hydration a render happens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Non-interactive render; output is never committed to a live target.
    Server,
    /// Interactive render; commits fire post-commit hooks.
    Client,
}

/// The render mode of the host the current scope belongs to, if any.
pub fn render_mode() -> Option<RenderMode> {
    use_context::<RenderMode>()
}

struct CommitQueueInner {
    hooks: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    commit_requested: Cell<bool>,
}

/// Post-commit hooks and the pending-commit flag of an interactive host.
///
/// Provided as a context value in the host's root scope.
#[derive(Clone)]
pub struct CommitQueue {
    inner: Rc<CommitQueueInner>,
}

impl CommitQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CommitQueueInner {
                hooks: RefCell::new(VecDeque::new()),
                commit_requested: Cell::new(false),
            }),
        }
    }

    /// Queue a hook to run after the next commit.
    pub fn defer(&self, hook: impl FnOnce() + 'static) {
        self.inner.hooks.borrow_mut().push_back(Box::new(hook));
    }

    /// Number of hooks waiting for a commit.
    pub fn pending(&self) -> usize {
        self.inner.hooks.borrow().len()
    }

    /// Ask the host to commit again.
    pub fn request_commit(&self) {
        self.inner.commit_requested.set(true);
    }

    /// Whether a commit was requested since the flag was last taken.
    pub fn commit_requested(&self) -> bool {
        self.inner.commit_requested.get()
    }

    fn take_commit_request(&self) -> bool {
        self.inner.commit_requested.replace(false)
    }

    /// Run the hooks queued so far.
    ///
    /// Hooks queued while these run wait for the next flush. Signal writes
    /// made by the hooks are batched, so a region that several hooks touch
    /// re-renders once. Returns how many hooks ran.
    pub fn flush(&self) -> usize {
        let batch: Vec<_> = self.inner.hooks.borrow_mut().drain(..).collect();
        let ran = batch.len();
        Runtime::batch(|| {
            for hook in batch {
                hook();
            }
        });
        ran
    }
}

impl Default for CommitQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommitQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitQueue")
            .field("pending", &self.pending())
            .field("commit_requested", &self.commit_requested())
            .finish()
    }
}

/// Queue `hook` to run right after the current host commits.
///
/// Returns `false` when there is no interactive host in scope (server
/// render, or no host at all); the hook is dropped and will never run.
/// The hook is skipped if the scope that queued it is disposed before the
/// commit happens.
pub fn on_mount(hook: impl FnOnce() + 'static) -> bool {
    let Some(commits) = use_context::<CommitQueue>() else {
        trace!("no interactive commit target; mount hook dropped");
        return false;
    };

    // Hooks run inside the scope that queued them, so they can reach its
    // context values.
    let owner = Scope::current();
    commits.defer(move || match owner {
        Some(owner) if !owner.is_alive() => {
            trace!("owning scope disposed before commit; mount hook skipped");
        }
        Some(owner) => owner.run(hook),
        None => hook(),
    });
    true
}

/// Server HTML and the first client commit, when they differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationMismatch {
    pub server: String,
    pub client: String,
}

/// Owns a mounted view tree and its commit history.
pub struct Host {
    mode: RenderMode,
    scope: Scope,
    view: View,
    commits: Option<CommitQueue>,
    history: Vec<String>,
    mismatch: Option<HydrationMismatch>,
}

impl Host {
    /// Mount `root` and perform the initial commit.
    pub fn mount(mode: RenderMode, root: impl FnOnce() -> View) -> Self {
        let scope = Scope::root();
        let commits = (mode == RenderMode::Client).then(CommitQueue::new);

        let view = scope.run(|| {
            scope.provide(mode);
            if let Some(commits) = &commits {
                scope.provide(commits.clone());
            }
            root()
        });

        let mut host = Self {
            mode,
            scope,
            view,
            commits,
            history: Vec::new(),
            mismatch: None,
        };
        host.commit();
        host.flush();
        host
    }

    /// Render `root` non-interactively and return its HTML.
    ///
    /// The tree is torn down before returning.
    pub fn render_to_string(root: impl FnOnce() -> View) -> String {
        let host = Self::mount(RenderMode::Server, root);
        let html = host.html().to_string();
        host.unmount();
        html
    }

    /// Mount `root` on the client over previously server-rendered HTML.
    pub fn hydrate(server_html: &str, root: impl FnOnce() -> View) -> Self {
        let mut host = Self::mount(RenderMode::Client, root);
        let first = host.history.first().cloned().unwrap_or_default();
        if first != server_html {
            warn!(
                server = server_html,
                client = first.as_str(),
                "hydration mismatch: first client render differs from server output"
            );
            host.mismatch = Some(HydrationMismatch {
                server: server_html.to_string(),
                client: first,
            });
        }
        host
    }

    fn commit(&mut self) {
        if let Some(commits) = &self.commits {
            commits.take_commit_request();
        }
        let html = self.view.to_html();
        debug!(pass = self.history.len(), bytes = html.len(), "commit");
        self.history.push(html);
    }

    /// Run pending post-commit hooks and commit again until the tree settles.
    ///
    /// Call this after changing signals from outside the tree. Returns the
    /// number of commits performed.
    pub fn flush(&mut self) -> usize {
        let Some(commits) = self.commits.clone() else {
            return 0;
        };

        let mut performed = 0;
        for _ in 0..MAX_COMMIT_PASSES {
            commits.flush();
            if commits.take_commit_request() {
                self.commit();
                performed += 1;
            } else if commits.pending() == 0 {
                return performed;
            }
        }

        warn!(
            passes = MAX_COMMIT_PASSES,
            "render did not settle; giving up on further commits"
        );
        performed
    }

    /// The render mode this host was mounted in.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The most recently committed HTML.
    pub fn html(&self) -> &str {
        self.history.last().map_or("", String::as_str)
    }

    /// Every committed HTML snapshot, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The hydration mismatch detected by [`Host::hydrate`], if any.
    pub fn mismatch(&self) -> Option<&HydrationMismatch> {
        self.mismatch.as_ref()
    }

    /// The host's root scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run `f` inside the host's root scope.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.scope.run(f)
    }

    /// Tear down the tree. Pending hooks become no-ops.
    ///
    /// Dropping the host does the same.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        // Regions and their scopes refer to each other; disposing breaks
        // the cycle so nothing keeps re-rendering a discarded tree.
        self.scope.dispose();
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("mode", &self.mode)
            .field("commits", &self.history.len())
            .field("mismatch", &self.mismatch.is_some())
            .finish()
    }
}
