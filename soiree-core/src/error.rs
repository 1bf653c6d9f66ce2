//! Error types.
//!
//! Only two situations surface as errors to callers: using a provided
//! service outside the scope that provides it, and malformed configuration
//! or catalog data. Storage failures have their own taxonomy so the
//! `try_*` persistence calls can tell callers what went wrong; the lossy
//! calls log and swallow them.

use thiserror::Error;

/// Errors raised by the view-facing APIs.
#[derive(Debug, Error)]
pub enum UiError {
    /// A hook was used outside the provider that installs its service.
    #[error("{hook} must be used within {provider}")]
    MissingContext {
        hook: &'static str,
        provider: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid catalog data: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Failures reported by a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("quota exceeded writing {key:?}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("store backend failed: {0}")]
    Backend(String),
}

/// Why a persistence operation did not complete.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No client-side store exists in this environment.
    #[error("no client store is available")]
    Unavailable,

    #[error("failed to serialize value for {key:?}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to deserialize value for {key:?}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
