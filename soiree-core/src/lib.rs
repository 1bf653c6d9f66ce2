//! Soiree Core
//!
//! This crate provides the client core of the Soiree event-booking site.
//! It implements:
//!
//! - Reactive primitives (signals, effects, owner scopes)
//! - A view tree with server rendering, hydration and post-commit hooks
//! - `ClientOnly` regions that render a placeholder until the page mounts
//! - JSON persistence over an injected key-value store
//! - Locale-aware currency formatting
//! - A scope-provided toast registry
//!
//! # Architecture
//!
//! - `reactive`: signals, effects, dependency tracking and scopes
//! - `view`: view nodes, dynamic regions, the render host and `ClientOnly`
//! - `storage`: persistence helper and store implementations
//! - `currency`: currency formatter
//! - `toast`: notification registry
//! - `catalog` / `booking`: site data and the booking draft
//! - `config` / `error`: site configuration and error types
//!
//! # Example
//!
//! ```rust
//! use soiree_core::view::{el, ClientOnly, Host, RenderMode, View};
//!
//! let page = || -> View {
//!     el("main")
//!         .child(ClientOnly::new(|| "local time".into()).with_placeholder(|| "…".into()))
//!         .into()
//! };
//!
//! let server_html = Host::render_to_string(page);
//! assert_eq!(server_html, "<main>…</main>");
//!
//! let host = Host::hydrate(&server_html, page);
//! assert!(host.mismatch().is_none());
//! assert_eq!(host.html(), "<main>local time</main>");
//! ```

pub mod booking;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod error;
pub mod reactive;
pub mod storage;
pub mod toast;
pub mod view;

pub use config::SiteConfig;
pub use error::{StorageError, StoreError, UiError};
