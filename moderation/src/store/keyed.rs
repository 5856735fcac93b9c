//! Keyed store contract shared by case and point-balance persistence

use std::sync::Arc;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Shared, type-erased reference to a keyed store
pub type SharedStore<V> = Arc<dyn KeyedStore<V>>;

/// Durable keyed collection.
///
/// The in-memory view is authoritative. A mutation is applied to the view
/// first and then flushed; an `Err` from [`put`](KeyedStore::put) or
/// [`delete`](KeyedStore::delete) means the view changed but the backing
/// medium did not. [`flush`](KeyedStore::flush) retries the write of the
/// whole view.
pub trait KeyedStore<V>: Send + Sync {
    /// Insert or replace the value under `key`.
    fn put(&self, key: &str, value: V) -> StoreResult<()>;

    /// Fetch the value under `key`.
    fn get(&self, key: &str) -> Option<V>;

    /// All `(key, value)` pairs. Order is unspecified.
    fn entries(&self) -> Vec<(String, V)>;

    /// Remove `key`. `Ok(false)` when the key was absent.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Write the current view to the backing medium.
    fn flush(&self) -> StoreResult<()>;

    /// All values. Order is unspecified.
    fn get_all(&self) -> Vec<V> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    /// Number of stored values.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
