//! Client-Only Rendering
//!
//! [`ClientOnly`] keeps content that depends on client-only state (random
//! ids, viewport size, the visitor's locale) out of the first render pass,
//! so the first client commit matches the server HTML exactly.
//!
//! # State Machine
//!
//! ```text
//! NotYetMounted --(post-commit hook)--> Mounted
//! ```
//!
//! The first render shows the placeholder. The mount hook queued with
//! [`on_mount`] fires right after that render is committed to a live
//! target, flips the [`MountLatch`], and the region re-renders once with
//! the content. `Mounted` is terminal.
//!
//! Without an interactive host (server render, or no host at all) the hook
//! never fires and the placeholder stays. That is the expected outcome, not
//! an error.

use std::rc::Rc;

use tracing::debug;

use super::dynamic::dynamic;
use super::host::on_mount;
use super::node::View;
use crate::reactive::Signal;

/// Whether a [`ClientOnly`] has seen its first commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    #[default]
    NotYetMounted,
    Mounted,
}

/// A one-shot latch from `NotYetMounted` to `Mounted`.
#[derive(Debug, Clone)]
pub struct MountLatch {
    state: Signal<MountState>,
}

impl MountLatch {
    /// A latch in the `NotYetMounted` state.
    pub fn new() -> Self {
        Self {
            state: Signal::new(MountState::NotYetMounted),
        }
    }

    /// Flip to `Mounted`. Returns `true` only for the first call.
    ///
    /// Later calls change nothing and notify nobody.
    pub fn fire(&self) -> bool {
        self.state.set_if_changed(MountState::Mounted)
    }

    /// The current state, tracked.
    pub fn state(&self) -> MountState {
        self.state.get()
    }

    /// The current state, untracked.
    pub fn peek(&self) -> MountState {
        self.state.get_untracked()
    }

    /// Tracked check for `Mounted`.
    pub fn is_mounted(&self) -> bool {
        self.state() == MountState::Mounted
    }
}

impl Default for MountLatch {
    fn default() -> Self {
        Self::new()
    }
}

type RenderFn = Rc<dyn Fn() -> View>;

/// Renders `placeholder` until mounted, then `content`.
///
/// ```rust
/// use soiree_core::view::{text, ClientOnly, Host};
///
/// let html = Host::render_to_string(|| {
///     ClientOnly::new(|| text("42 guests online"))
///         .with_placeholder(|| text("…"))
///         .into_view()
/// });
/// assert_eq!(html, "…");
/// ```
pub struct ClientOnly {
    content: RenderFn,
    placeholder: Option<RenderFn>,
}

impl ClientOnly {
    /// Gate `content` behind the first commit.
    pub fn new<F>(content: F) -> Self
    where
        F: Fn() -> View + 'static,
    {
        Self {
            content: Rc::new(content),
            placeholder: None,
        }
    }

    /// Show `placeholder` before mounting instead of nothing.
    pub fn with_placeholder<F>(mut self, placeholder: F) -> Self
    where
        F: Fn() -> View + 'static,
    {
        self.placeholder = Some(Rc::new(placeholder));
        self
    }

    /// Build the region and queue its mount hook.
    pub fn mount(self) -> ClientOnlyHandle {
        let latch = MountLatch::new();

        let view = {
            let latch = latch.clone();
            let Self {
                content,
                placeholder,
            } = self;
            dynamic(move || {
                if latch.is_mounted() {
                    content()
                } else {
                    placeholder.as_ref().map_or(View::Empty, |render| render())
                }
            })
        };

        let queued = {
            let latch = latch.clone();
            on_mount(move || {
                if latch.fire() {
                    debug!("client-only region mounted");
                }
            })
        };
        if !queued {
            debug!("client-only region has no live commit target; keeping placeholder");
        }

        ClientOnlyHandle { latch, view }
    }

    /// Build the region and return only its view.
    pub fn into_view(self) -> View {
        self.mount().view
    }
}

impl From<ClientOnly> for View {
    fn from(gate: ClientOnly) -> Self {
        gate.into_view()
    }
}

/// A mounted [`ClientOnly`] region.
#[derive(Debug, Clone)]
pub struct ClientOnlyHandle {
    latch: MountLatch,
    view: View,
}

impl ClientOnlyHandle {
    /// The region's mount state.
    pub fn mount_state(&self) -> MountState {
        self.latch.peek()
    }

    /// The region's latch, for hosts that signal mounting themselves.
    pub fn latch(&self) -> &MountLatch {
        &self.latch
    }

    /// Number of times the region has rendered.
    pub fn render_count(&self) -> usize {
        match &self.view {
            View::Dynamic(region) => region.render_count(),
            _ => 0,
        }
    }

    /// The region's view. Clones share the live slot.
    pub fn view(&self) -> View {
        self.view.clone()
    }

    /// Current HTML of the region.
    pub fn html(&self) -> String {
        self.view.to_html()
    }
}

/// Function form of [`ClientOnly`].
pub fn client_only<C, P>(content: C, placeholder: Option<P>) -> View
where
    C: Fn() -> View + 'static,
    P: Fn() -> View + 'static,
{
    let gate = ClientOnly::new(content);
    match placeholder {
        Some(placeholder) => gate.with_placeholder(placeholder).into_view(),
        None => gate.into_view(),
    }
}
