//! JSON-file backed keyed store
//!
//! The whole collection lives in memory and is rewritten to disk on every
//! mutation (temp file + rename). Loading never fails: an absent or
//! unreadable file yields an empty store and a log line.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::keyed::{KeyedStore, StoreError, StoreResult};
use super::schema::{CORRUPT_SUFFIX, TEMP_SUFFIX};

/// Keyed store persisted as a single JSON object
pub struct JsonFileStore<V> {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, V>>,
}

impl<V> JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open the store at `path`, loading whatever is already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Backing file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> BTreeMap<String, V> {
        if !path.exists() {
            info!(path = %path.display(), "No store file found, starting empty");
            return BTreeMap::new();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Store file unreadable, starting empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, V>>(&content) {
            Ok(entries) => {
                debug!(path = %path.display(), count = entries.len(), "Store loaded");
                entries
            }
            Err(e) => {
                let preserved = sibling(path, CORRUPT_SUFFIX);
                warn!(
                    path = %path.display(),
                    preserved = %preserved.display(),
                    error = %e,
                    "Store file corrupted, starting empty"
                );
                // Keep the old file around for manual recovery before the
                // next flush overwrites it.
                if let Err(e) = std::fs::copy(path, &preserved) {
                    warn!(error = %e, "Failed to preserve corrupted store file");
                }
                BTreeMap::new()
            }
        }
    }

    /// Write `entries` to disk. Called with the write lock held so that
    /// flushes land in mutation order.
    fn write(&self, entries: &BTreeMap<String, V>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let temp_path = sibling(&self.path, TEMP_SUFFIX);
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl<V> KeyedStore<V> for JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    fn put(&self, key: &str, value: V) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value);
        self.write(&entries)
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
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write(&entries)?;
        Ok(true)
    }

    fn flush(&self) -> StoreResult<()> {
        let entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        self.write(&entries)
    }
}

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
