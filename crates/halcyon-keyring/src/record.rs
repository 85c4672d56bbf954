//! The at-rest wallet record format.
//!
//! One [`EncryptedWalletRecord`] is persisted per wallet as a JSON
//! object. Binary fields are carried as base64 text so the record
//! survives any string-oriented storage backend:
//!
//! ```json
//! {
//!   "address": "hal1...",
//!   "type": "mnemonic",
//!   "ciphertext": "<base64>",
//!   "iv": "<base64, 12 bytes>",
//!   "salt": "<base64, 16 bytes>",
//!   "name": "savings"
//! }
//! ```
//!
//! A record is self-contained: together with the user password it holds
//! everything required for decryption. No plaintext secret material
//! appears in any field.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use halcyon_types::{HalcyonError, Result};
use serde::{Deserialize, Serialize};

use crate::secret::SourceKind;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Exact decoded length of the `iv` field (AES-GCM nonce).
pub const IV_LEN: usize = 12;

/// Exact decoded length of the `salt` field (PBKDF2 salt).
pub const SALT_LEN: usize = 16;

/// Minimum decoded length of the `ciphertext` field. AES-GCM appends a
/// 16-byte authentication tag, so nothing shorter can ever verify.
const MIN_CIPHERTEXT_LEN: usize = 16;

// ---------------------------------------------------------------------------
// EncryptedWalletRecord
// ---------------------------------------------------------------------------

/// Persisted envelope for one encrypted wallet secret.
///
/// `address` doubles as the storage key; saving a record under an
/// already-present address overwrites the previous entry. The optional
/// `name` is a user-chosen label with no security role; it is omitted
/// from the JSON entirely when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedWalletRecord {
    /// Account address derived from the encrypted secret.
    pub address: String,
    /// Which secret shape the ciphertext protects.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Base64 of the AES-256-GCM ciphertext plus tag.
    pub ciphertext: String,
    /// Base64 of the 12-byte AES-GCM nonce, fresh per encryption.
    pub iv: String,
    /// Base64 of the 16-byte PBKDF2 salt, fresh per encryption.
    pub salt: String,
    /// Optional user-facing label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EncryptedWalletRecord {
    /// Checks the structural invariants of a stored record.
    ///
    /// A record passing validation is well-formed; it is not
    /// necessarily decryptable (that requires the password).
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::StorageError`] naming the offending
    /// field when the address is empty, a binary field is not valid
    /// base64, or a decoded field has the wrong length.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(HalcyonError::StorageError {
                reason: "record address is empty".into(),
            });
        }
        self.decode_parts()?;
        Ok(())
    }

    /// Decodes the base64 fields into raw bytes, enforcing the fixed
    /// nonce and salt lengths.
    pub(crate) fn decode_parts(&self) -> Result<(Vec<u8>, [u8; IV_LEN], [u8; SALT_LEN])> {
        let ciphertext = STANDARD.decode(&self.ciphertext).map_err(|e| {
            HalcyonError::StorageError {
                reason: format!("ciphertext is not valid base64: {e}"),
            }
        })?;
        if ciphertext.len() < MIN_CIPHERTEXT_LEN {
            return Err(HalcyonError::StorageError {
                reason: format!(
                    "ciphertext must be at least {MIN_CIPHERTEXT_LEN} bytes, got {}",
                    ciphertext.len()
                ),
            });
        }

        let iv = decode_fixed::<IV_LEN>("iv", &self.iv)?;
        let salt = decode_fixed::<SALT_LEN>("salt", &self.salt)?;
        Ok((ciphertext, iv, salt))
    }
}

/// Decodes a base64 field into an exact-length byte array.
fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    let bytes = STANDARD.decode(value).map_err(|e| HalcyonError::StorageError {
        reason: format!("{field} is not valid base64: {e}"),
    })?;
    if bytes.len() != N {
        return Err(HalcyonError::StorageError {
            reason: format!("{field} must be {N} bytes, got {}", bytes.len()),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
