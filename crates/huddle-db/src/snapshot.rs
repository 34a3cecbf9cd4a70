//! Whole-collection snapshot persistence.
//!
//! A [`SnapshotStore`] is a tiny key-value interface: each key holds one
//! serialized snapshot (a JSON array) and is read and replaced as a whole.
//! [`FileSnapshotStore`] keeps one file per key; [`MemorySnapshotStore`]
//! keeps everything in memory and can enforce a byte quota.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{StoreConfig, snapshot_path_in};

/// Errors raised while writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {key:?}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot {key:?}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {key:?} needs {needed} bytes but the store quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
}

/// Key-value persistence for serialized collection snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Return the snapshot stored under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError>;

    /// Replace the snapshot stored under `key`.
    fn store(&self, key: &str, snapshot: &str) -> Result<(), SnapshotError>;
}

// Compile-time assertion: SnapshotStore must be usable as `dyn SnapshotStore`.
const _: () = {
    fn _assert_object_safe(_: &dyn SnapshotStore) {}
};

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Load the collection stored under `key`.
///
/// A missing, unreadable, or corrupt snapshot yields an empty collection.
/// Corruption is logged but never surfaced as an error.
pub fn load_collection<T: DeserializeOwned>(store: &dyn SnapshotStore, key: &str) -> Vec<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no snapshot stored, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "snapshot unreadable, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, error = %e, "snapshot corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Serialize `items` and store them under `key`.
pub fn store_collection<T: Serialize>(
    store: &dyn SnapshotStore,
    key: &str,
    items: &[T],
) -> Result<(), SnapshotError> {
    let snapshot = serde_json::to_string(items).map_err(|source| SnapshotError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.store(key, &snapshot)?;
    debug!(key, count = items.len(), "snapshot stored");
    Ok(())
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each key as `<data_dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is flushed and then renamed
/// over the target, so a reader never observes a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store for the configured data directory.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    /// The directory snapshots live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_atomically(&self, key: &str, snapshot: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = snapshot_path_in(&self.dir, key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(snapshot.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &target)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let path = snapshot_path_in(&self.dir, key);
        match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Read {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn store(&self, key: &str, snapshot: &str) -> Result<(), SnapshotError> {
        self.write_atomically(key, snapshot)
            .map_err(|source| SnapshotError::Write {
                key: key.to_owned(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps snapshots in memory.
///
/// With [`Self::with_quota`], a write whose total stored size would exceed
/// the quota fails with [`SnapshotError::QuotaExceeded`] and leaves the
/// previous snapshot in place.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `quota` total bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Whether no snapshot has been stored under any key.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Seed a raw snapshot, bypassing the quota.
    pub fn insert_raw(&self, key: &str, snapshot: &str) {
        self.lock().insert(key.to_owned(), snapshot.to_owned());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map; recover it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        Ok(self.lock().get(key).cloned())
    }

    fn store(&self, key: &str, snapshot: &str) -> Result<(), SnapshotError> {
        let mut entries = self.lock();
        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + snapshot.len();
            if needed > quota {
                return Err(SnapshotError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    quota,
                });
            }
        }
        entries.insert(key.to_owned(), snapshot.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySnapshotStore::new();
        assert!(store.load("k").unwrap().is_none());
        store.store("k", "[1,2]").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn memory_store_quota_rejects_and_keeps_previous() {
        let store = MemorySnapshotStore::with_quota(8);
        store.store("k", "[1]").unwrap();

        let err = store.store("k", "[1,2,3,4,5]").unwrap_err();
        assert!(matches!(err, SnapshotError::QuotaExceeded { needed: 11, quota: 8, .. }));
        assert_eq!(store.load("k").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn quota_counts_other_keys() {
        let store = MemorySnapshotStore::with_quota(10);
        store.store("a", "[1,2,3]").unwrap();
        assert!(store.store("b", "[4,5,6,7]").is_err());
        assert!(store.store("b", "[4]").is_ok());
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let store = MemorySnapshotStore::new();
        store.insert_raw("nums", "{not json");
        let nums: Vec<u32> = load_collection(&store, "nums");
        assert!(nums.is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let store = MemorySnapshotStore::new();
        store.insert_raw("nums", r#"{"items": [1, 2]}"#);
        let nums: Vec<u32> = load_collection(&store, "nums");
        assert!(nums.is_empty());
    }

    #[test]
    fn typed_roundtrip_preserves_order() {
        let store = MemorySnapshotStore::new();
        store_collection(&store, "nums", &[3u32, 1, 2]).unwrap();
        let nums: Vec<u32> = load_collection(&store, "nums");
        assert_eq!(nums, vec![3, 1, 2]);
    }
}
