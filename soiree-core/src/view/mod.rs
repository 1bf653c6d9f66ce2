//! View Layer
//!
//! Views are plain trees built once per component; the parts that change
//! are [`dynamic`] regions driven by effects. A [`Host`] mounts a tree,
//! commits its HTML and runs post-commit hooks, either on the server
//! (non-interactive) or on the client (interactive, hydrating over server
//! output).
//!
//! [`ClientOnly`] builds on all three: a dynamic region reading a
//! [`MountLatch`] that a post-commit hook flips.

mod client_only;
mod dynamic;
mod host;
mod node;

pub use client_only::{client_only, ClientOnly, ClientOnlyHandle, MountLatch, MountState};
pub use dynamic::dynamic;
pub use host::{on_mount, render_mode, CommitQueue, Host, HydrationMismatch, RenderMode};
pub use node::{el, text, DynamicView, Element, View};
