//! Volatile keyed store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::keyed::{KeyedStore, StoreError, StoreResult};

/// In-memory keyed store. Flushing is a no-op.
pub struct MemoryStore<V> {
    entries: RwLock<BTreeMap<String, V>>,
}

impl<V> MemoryStore<V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with `entries`
    pub fn from_entries(entries: impl IntoIterator<Item = (String, V)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> KeyedStore<V> for MemoryStore<V> {
    fn put(&self, key: &str, value: V) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<V> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn entries(&self) -> Vec<(String, V)> {
        match self.entries.read() {
            Ok(entries) => entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(key)
            .is_some())
    }

    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
