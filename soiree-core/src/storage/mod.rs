//! Client-side persistence.
//!
//! The browser's key-value store only exists during interactive sessions,
//! so it is injected rather than assumed: a [`Persistence`] either wraps a
//! [`KeyValueStore`] or is detached, in which case every save and clear is
//! a no-op and every load comes back empty.
//!
//! Values are stored as JSON text. The plain calls (`save`, `load`,
//! `clear`) never fail: serialization, deserialization and store errors are
//! logged and swallowed. The `try_*` calls report the same failures as a
//! [`StorageError`] for callers that need to tell "nothing stored" apart
//! from "no store" and "write refused".

mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

pub use memory::MemoryStore;

use crate::error::{StorageError, StoreError};

/// A string-keyed, string-valued store.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Every key currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// JSON persistence over an optional store.
#[derive(Clone, Default)]
pub struct Persistence {
    store: Option<Arc<dyn KeyValueStore>>,
    namespace: String,
}

impl Persistence {
    /// Persist into `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store: Some(store),
            namespace: String::new(),
        }
    }

    /// No store: saves are dropped and loads find nothing.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Prefix every key with `namespace:`. An empty namespace disables it.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Whether a store is attached.
    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    fn scoped_key(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}:{key}", self.namespace)
        }
    }

    fn store(&self) -> Result<&dyn KeyValueStore, StorageError> {
        self.store.as_deref().ok_or(StorageError::Unavailable)
    }

    /// Serialize `value` and write it under `key`.
    ///
    /// Nothing is written if serialization fails.
    pub fn try_save<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let store = self.store()?;
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        store.set_item(&self.scoped_key(key), &json)?;
        Ok(())
    }

    /// Read and deserialize the value under `key`.
    pub fn try_load<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        let store = self.store()?;
        let Some(json) = store.get_item(&self.scoped_key(key))? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Deserialize {
                key: key.to_string(),
                source,
            })
    }

    /// Remove the value under `key`.
    pub fn try_clear(&self, key: &str) -> Result<(), StorageError> {
        self.store()?.remove_item(&self.scoped_key(key))?;
        Ok(())
    }

    /// Save `value` under `key`, logging and dropping any failure.
    pub fn save<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        match self.try_save(key, value) {
            Ok(()) => {}
            Err(StorageError::Unavailable) => debug!(key, "no client store; save skipped"),
            Err(err) => warn!(key, error = %err, "failed to save to client store"),
        }
    }

    /// Load the value under `key`, or `None` if absent or unreadable.
    pub fn load<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.try_load(key) {
            Ok(value) => value,
            Err(StorageError::Unavailable) => None,
            Err(err) => {
                warn!(key, error = %err, "failed to load from client store");
                None
            }
        }
    }

    /// Remove the value under `key`, logging any failure.
    pub fn clear(&self, key: &str) {
        match self.try_clear(key) {
            Ok(()) | Err(StorageError::Unavailable) => {}
            Err(err) => warn!(key, error = %err, "failed to clear client store entry"),
        }
    }

    /// Remove every key in this namespace. Returns how many were removed.
    ///
    /// Without a namespace this empties the whole store.
    pub fn clear_namespace(&self) -> usize {
        let Ok(store) = self.store() else {
            return 0;
        };
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to list client store keys");
                return 0;
            }
        };

        let prefix = format!("{}:", self.namespace);
        let mut removed = 0;
        for key in keys {
            if !self.namespace.is_empty() && !key.starts_with(&prefix) {
                continue;
            }
            match store.remove_item(&key) {
                Ok(()) => removed += 1,
                Err(err) => warn!(key, error = %err, "failed to clear client store entry"),
            }
        }
        removed
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("available", &self.is_available())
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serializer};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Preferences {
        currency: String,
        guests: u32,
        tags: Vec<String>,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("value refers to itself"))
        }
    }

    fn attached() -> (Arc<MemoryStore>, Persistence) {
        let store = Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store.clone());
        (store, persistence)
    }

    #[test]
    fn round_trips_structured_values() {
        let (_, persistence) = attached();
        let prefs = Preferences {
            currency: "PHP".into(),
            guests: 80,
            tags: vec!["garden".into(), "evening".into()],
        };

        persistence.save("prefs", &prefs);
        assert_eq!(persistence.load::<Preferences>("prefs"), Some(prefs));
    }

    #[test]
    fn round_trips_arbitrary_json() {
        let (_, persistence) = attached();
        let value = json!({"a": [1, 2, {"b": null}], "c": "ñ"});
        persistence.save("raw", &value);
        assert_eq!(persistence.load::<serde_json::Value>("raw"), Some(value));
    }

    #[test]
    fn missing_key_is_absent() {
        let (_, persistence) = attached();
        assert_eq!(persistence.load::<u32>("never-saved"), None);
    }

    #[test]
    fn detached_store_is_absent_for_every_key() {
        let persistence = Persistence::detached();
        persistence.save("k", &1);
        persistence.clear("k");
        assert_eq!(persistence.load::<i32>("k"), None);
        assert!(matches!(
            persistence.try_load::<i32>("k"),
            Err(StorageError::Unavailable)
        ));
        assert_eq!(persistence.clear_namespace(), 0);
    }

    #[test]
    fn failed_serialization_leaves_store_unchanged() {
        let (store, persistence) = attached();
        persistence.save("k", &"before");

        persistence.save("k", &Unserializable);
        assert_eq!(persistence.load::<String>("k").as_deref(), Some("before"));

        let err = persistence.try_save("fresh", &Unserializable).unwrap_err();
        assert!(matches!(err, StorageError::Serialize { .. }));
        assert_eq!(store.get_item("fresh").unwrap(), None);
    }

    #[test]
    fn corrupt_entries_load_as_absent() {
        let (store, persistence) = attached();
        store.set_item("k", "{not json").unwrap();

        assert_eq!(persistence.load::<u32>("k"), None);
        assert!(matches!(
            persistence.try_load::<u32>("k"),
            Err(StorageError::Deserialize { .. })
        ));
    }

    #[test]
    fn clear_removes_value() {
        let (_, persistence) = attached();
        persistence.save("k", &5);
        persistence.clear("k");
        assert_eq!(persistence.load::<i32>("k"), None);
    }

    #[test]
    fn quota_failures_surface_only_through_try_save() {
        let store = Arc::new(MemoryStore::with_quota(8));
        let persistence = Persistence::new(store.clone());

        persistence.save("k", &"far too long for the quota");
        assert!(store.is_empty());

        let err = persistence.try_save("k", &"far too long").unwrap_err();
        assert!(matches!(err, StorageError::Store(StoreError::QuotaExceeded { .. })));
    }

    #[test]
    fn namespaces_prefix_keys_and_clear_together() {
        let store = Arc::new(MemoryStore::new());
        let site = Persistence::new(store.clone()).with_namespace("soiree");
        let other = Persistence::new(store.clone()).with_namespace("other");

        site.save("draft", &1);
        site.save("prefs", &2);
        other.save("draft", &3);

        assert_eq!(store.get_item("soiree:draft").unwrap().as_deref(), Some("1"));
        assert_eq!(site.clear_namespace(), 2);
        assert_eq!(site.load::<i32>("draft"), None);
        assert_eq!(other.load::<i32>("draft"), Some(3));
    }
}
