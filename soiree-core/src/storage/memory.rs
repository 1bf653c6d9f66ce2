//! In-memory key-value store.

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::KeyValueStore;
use crate::error::StoreError;

/// A string store held in memory, optionally capped at a byte quota.
///
/// Keys keep insertion order. The quota counts key and value bytes of every
/// entry, the way browser storage counts its budget.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<IndexMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// An unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes pushing it past `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            quota: Some(limit),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write();

        if let Some(limit) = self.quota {
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let needed = used - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().shift_remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
