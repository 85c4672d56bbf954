//! In-memory representations of wallet secrets.
//!
//! A [`Secret`] is exactly one of a BIP39 mnemonic phrase or a raw
//! secp256k1 private key; the two-variant sum type makes the
//! "both present" and "both absent" shapes unrepresentable. A
//! [`KeyMaterial`] pairs a secret with the account address derived
//! from it. Both types are held only for the duration of a session and
//! zeroize their contents on drop.

use std::fmt;

use halcyon_types::AccountId;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Declares which kind of secret a wallet was created from.
///
/// Persisted verbatim in the record's `type` field so the custody layer
/// knows how to rebuild a [`KeyMaterial`] after decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// The wallet was imported from or generated as a BIP39 phrase.
    #[serde(rename = "mnemonic")]
    Mnemonic,
    /// The wallet was imported from a raw 32-byte private key.
    #[serde(rename = "privateKey")]
    PrivateKey,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mnemonic => write!(f, "mnemonic"),
            SourceKind::PrivateKey => write!(f, "privateKey"),
        }
    }
}

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A plaintext wallet secret.
///
/// Exists only in memory. The variant determines how the signing
/// identity is derived: a mnemonic goes through BIP39 seed generation
/// and BIP32 path derivation, a private key is used as the secp256k1
/// scalar directly.
#[derive(Zeroize, ZeroizeOnDrop)]
pub enum Secret {
    /// A BIP39 phrase, normalized to lowercase single-space form.
    Mnemonic(String),
    /// A raw secp256k1 private scalar.
    PrivateKey([u8; 32]),
}

// Secret does not implement Clone/Debug to prevent leakage.

impl Secret {
    /// Returns the [`SourceKind`] corresponding to this variant.
    pub fn kind(&self) -> SourceKind {
        match self {
            Secret::Mnemonic(_) => SourceKind::Mnemonic,
            Secret::PrivateKey(_) => SourceKind::PrivateKey,
        }
    }

    /// Returns the mnemonic phrase, or `None` for a private-key secret.
    pub fn mnemonic_phrase(&self) -> Option<&str> {
        match self {
            Secret::Mnemonic(phrase) => Some(phrase),
            Secret::PrivateKey(_) => None,
        }
    }

    /// Returns the raw private key bytes, or `None` for a mnemonic secret.
    pub fn private_key_bytes(&self) -> Option<&[u8; 32]> {
        match self {
            Secret::Mnemonic(_) => None,
            Secret::PrivateKey(bytes) => Some(bytes),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyMaterial
// ---------------------------------------------------------------------------

/// An imported signing identity: the secret plus its derived address.
///
/// # Invariants
///
/// - `address` is always derived from `secret` under the configured
///   network prefix; it is never accepted from user input. The only
///   constructor lives in [`crate::signer`], which enforces this.
/// - Never serialized in plaintext; persistence goes through
///   [`crate::cipher::encrypt_secret`].
pub struct KeyMaterial {
    /// Account address derived from the secret.
    address: AccountId,
    /// The plaintext secret, zeroized when this value drops.
    secret: Secret,
}

impl KeyMaterial {
    /// Pairs a derived address with its secret. Callers must have
    /// derived `address` from `secret`; this constructor does not check.
    pub(crate) fn new(address: AccountId, secret: Secret) -> Self {
        Self { address, secret }
    }

    /// Returns the derived account address.
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    /// Returns the plaintext secret.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Returns the kind of secret this identity was built from.
    pub fn kind(&self) -> SourceKind {
        self.secret.kind()
    }
}
