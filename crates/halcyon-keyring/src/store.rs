//! Persistent wallet record storage.
//!
//! An [`EncryptedWalletStore`] keeps zero or more
//! [`EncryptedWalletRecord`]s in one JSON object under a single fixed
//! backend key, addressed by wallet address. The backend is any
//! [`KeyValueStore`]; the store itself owns only the map layout and
//! the corruption policy: a record that fails to parse or validate is
//! logged and treated as absent, never fatal.

use std::collections::BTreeMap;

use halcyon_types::{HalcyonError, Result};
use serde_json::Value;

use crate::kv::KeyValueStore;
use crate::record::EncryptedWalletRecord;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed backend key the whole wallet map lives under.
///
/// Public so embedders sharing a storage area with other data can
/// reserve the key. The `v1` suffix is the map layout version.
pub const STORE_KEY: &str = "halcyon/wallets/v1";

// ---------------------------------------------------------------------------
// EncryptedWalletStore
// ---------------------------------------------------------------------------

/// Wallet record persistence over an injected backend.
///
/// All operations are synchronous and last-writer-wins per address;
/// there are no multi-record transactions. An empty or missing backend
/// is a first run, not an error.
pub struct EncryptedWalletStore<S> {
    backend: S,
}

impl<S: KeyValueStore> EncryptedWalletStore<S> {
    /// Wraps a backend. No I/O happens until the first operation.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Upserts a record under its address.
    ///
    /// An existing record under the same address is overwritten; this
    /// is how re-import supersedes a previous encryption.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::StorageError`] if the record fails
    /// structural validation or the backend write fails. Validation
    /// happens first, so nothing is written on the failure path.
    pub fn save(&self, record: &EncryptedWalletRecord) -> Result<()> {
        record.validate()?;

        let mut map = self.read_map()?;
        let entry = serde_json::to_value(record).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to serialize record: {e}"),
        })?;
        map.insert(record.address.clone(), entry);
        self.write_map(&map)?;

        tracing::debug!(address = %record.address, "wallet record saved");
        Ok(())
    }

    /// Loads the record stored under `address`.
    ///
    /// Returns `Ok(None)` when no record is stored under the address
    /// or the stored entry is corrupted (the corruption is logged).
    pub fn load(&self, address: &str) -> Result<Option<EncryptedWalletRecord>> {
        let map = self.read_map()?;
        match map.get(address) {
            Some(entry) => Ok(parse_entry(address, entry)),
            None => Ok(None),
        }
    }

    /// Loads every stored record. Order is not meaningful.
    ///
    /// Corrupted entries are skipped with a warning; one damaged
    /// record never hides the others.
    pub fn load_all(&self) -> Result<Vec<EncryptedWalletRecord>> {
        let map = self.read_map()?;
        Ok(map
            .iter()
            .filter_map(|(address, entry)| parse_entry(address, entry))
            .collect())
    }

    /// Deletes the record under `address`; no-op if absent.
    pub fn remove(&self, address: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(address).is_none() {
            return Ok(());
        }
        self.write_map(&map)?;

        tracing::debug!(%address, "wallet record removed");
        Ok(())
    }

    /// Updates only the label of the record under `address`.
    ///
    /// `None` clears the label. The entry is edited in place as raw
    /// JSON, so ciphertext, nonce, and salt are untouched byte for
    /// byte; renaming never re-encrypts.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::StorageError`] if no record is stored
    /// under the address.
    pub fn rename(&self, address: &str, name: Option<&str>) -> Result<()> {
        let mut map = self.read_map()?;
        let entry = map.get_mut(address).ok_or_else(|| HalcyonError::StorageError {
            reason: format!("no wallet stored under address '{address}'"),
        })?;
        let object = entry.as_object_mut().ok_or_else(|| HalcyonError::StorageError {
            reason: format!("stored entry for '{address}' is not an object"),
        })?;

        match name {
            Some(name) => {
                object.insert("name".into(), Value::String(name.to_owned()));
            }
            None => {
                object.remove("name");
            }
        }
        self.write_map(&map)
    }

    fn read_map(&self) -> Result<BTreeMap<String, Value>> {
        let json = match self.backend.get(STORE_KEY)? {
            Some(json) => json,
            None => return Ok(BTreeMap::new()),
        };

        match serde_json::from_str(&json) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(%e, "stored wallet map is not valid JSON, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, Value>) -> Result<()> {
        let json = serde_json::to_string(map).map_err(|e| HalcyonError::StorageError {
            reason: format!("failed to serialize wallet map: {e}"),
        })?;
        self.backend.set(STORE_KEY, &json)
    }
}

/// Parses one stored map entry, logging and dropping corrupted ones.
fn parse_entry(address: &str, entry: &Value) -> Option<EncryptedWalletRecord> {
    let record: EncryptedWalletRecord = match serde_json::from_value(entry.clone()) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(%address, %e, "skipping unparseable wallet record");
            return None;
        }
    };
    if let Err(e) = record.validate() {
        tracing::warn!(%address, %e, "skipping invalid wallet record");
        return None;
    }
    Some(record)
}
