//! Injectable key-value persistence.
//!
//! The custody core never talks to a concrete storage technology
//! directly; it goes through the [`KeyValueStore`] trait so the same
//! store logic runs against an in-memory fake in tests, a single JSON
//! file, or an embedded sled database. Values are strings: everything
//! the keyring persists is JSON text.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use halcyon_types::{HalcyonError, Result};

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// Durable string-keyed persistence, last-writer-wins per key.
///
/// Implementations must tolerate a missing underlying store (first
/// run): [`get`](Self::get) on an empty backend returns `Ok(None)`,
/// never an error. No transactional multi-key guarantees are required.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the value under `key`; no-op if absent.
    fn delete(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryKeyValueStore
// ---------------------------------------------------------------------------

/// Process-local backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| HalcyonError::StorageError {
            reason: "in-memory store lock poisoned".into(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| HalcyonError::StorageError {
            reason: "in-memory store lock poisoned".into(),
        })?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| HalcyonError::StorageError {
            reason: "in-memory store lock poisoned".into(),
        })?;
        entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileKeyValueStore
// ---------------------------------------------------------------------------

/// Single-file JSON backend.
///
/// The whole store is one JSON object on disk. Writes go through a
/// temporary file followed by a rename, so a crash mid-write leaves
/// the previous contents intact. A missing file is an empty store; an
/// unparseable file is logged and treated as empty rather than
/// blocking the application.
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store backed by the JSON file at `path`.
    ///
    /// No I/O happens until the first operation; the file does not
    /// need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(HalcyonError::StorageError {
                    reason: format!("failed to read store file: {e}"),
                })
            }
        };

        match serde_json::from_str(&json) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %e,
                    "store file is not valid JSON, treating as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to serialize store file: {e}"),
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes()).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to write store file: {e}"),
        })?;

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            HalcyonError::StorageError {
                reason: format!("failed to replace store file: {e}"),
            }
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledKeyValueStore
// ---------------------------------------------------------------------------

/// Embedded-database backend over sled.
///
/// Every write is flushed before returning so a stored wallet record
/// survives an immediate process exit.
pub struct SledKeyValueStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledKeyValueStore {
    /// Opens (or creates) a sled database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::StorageError`] if the database cannot be
    /// opened.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to open sled database: {e}"),
        })?;
        let tree = db.open_tree("wallets").map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to open tree 'wallets': {e}"),
        })?;
        Ok(Self { db, tree })
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to flush database: {e}"),
        })?;
        Ok(())
    }
}

impl KeyValueStore for SledKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.tree.get(key).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to read key: {e}"),
        })?;
        value
            .map(|bytes| {
                String::from_utf8(bytes.to_vec()).map_err(|_| HalcyonError::StorageError {
                    reason: "stored value is not valid UTF-8".into(),
                })
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree
            .insert(key, value.as_bytes())
            .map_err(|e| HalcyonError::StorageError {
                reason: format!("failed to write key: {e}"),
            })?;
        self.flush()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.tree.remove(key).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to delete key: {e}"),
        })?;
        self.flush()
    }
}
