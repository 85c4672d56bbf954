//! Core shared types for the Halcyon wallet custody core.
//!
//! This crate defines all fundamental types used across the workspace.
//! No other crate should define shared types — everything lives here.

pub mod config;

use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Bech32 account address: `RIPEMD160(SHA256(compressed_pubkey))` under a
/// human-readable prefix.
///
/// This is the primary on-chain identity of a Halcyon wallet. The 20-byte
/// hash is canonical; the prefix identifies the network the address belongs
/// to. Rendering and parsing both use the classic Bech32 variant (the
/// Bech32m variant is rejected).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct AccountId {
    /// Human-readable prefix, e.g. `hal`.
    hrp: String,
    /// 20-byte public key hash.
    hash: [u8; 20],
}

impl AccountId {
    /// The fixed byte length of the public key hash.
    pub const HASH_LEN: usize = 20;

    /// Creates an `AccountId` from a prefix and a 20-byte public key hash.
    ///
    /// # Errors
    ///
    /// Returns [`HalcyonError::InvalidAddress`] if `hrp` is not a valid
    /// Bech32 human-readable prefix.
    pub fn from_parts(hrp: &str, hash: [u8; 20]) -> Result<Self> {
        // A trial encoding validates the prefix up front so that Display
        // cannot fail later.
        bech32::encode(hrp, hash.to_base32(), Variant::Bech32).map_err(|e| {
            HalcyonError::InvalidAddress {
                reason: format!("invalid bech32 prefix '{hrp}': {e}"),
            }
        })?;
        Ok(Self {
            hrp: hrp.to_owned(),
            hash,
        })
    }

    /// Returns the human-readable prefix.
    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    /// Returns the 20-byte public key hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Returns `true` if this address carries the expected prefix.
    pub fn matches_hrp(&self, expected: &str) -> bool {
        self.hrp == expected
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode(&self.hrp, self.hash.to_base32(), Variant::Bech32)
            .map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for AccountId {
    type Err = HalcyonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (hrp, data_base32, variant) =
            bech32::decode(s).map_err(|e| HalcyonError::InvalidAddress {
                reason: format!("bech32 decoding failed: {e}"),
            })?;

        if variant != Variant::Bech32 {
            return Err(HalcyonError::InvalidAddress {
                reason: "bech32m variant is not accepted for account addresses".into(),
            });
        }

        let bytes = Vec::<u8>::from_base32(&data_base32).map_err(|e| {
            HalcyonError::InvalidAddress {
                reason: format!("bech32 base32 conversion failed: {e}"),
            }
        })?;

        if bytes.len() != Self::HASH_LEN {
            return Err(HalcyonError::InvalidAddress {
                reason: format!(
                    "expected {} payload bytes, got {}",
                    Self::HASH_LEN,
                    bytes.len()
                ),
            });
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes);
        Ok(Self { hrp, hash })
    }
}

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AccountIdVisitor;

        impl Visitor<'_> for AccountIdVisitor {
            type Value = AccountId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a bech32-encoded account address")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<AccountId, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AccountIdVisitor)
    }
}

// ---------------------------------------------------------------------------
// HalcyonError
// ---------------------------------------------------------------------------

/// Central error type for the Halcyon wallet core.
///
/// All crates in the workspace convert their internal errors into variants
/// of this enum, ensuring a unified error handling surface. The set is
/// closed: callers can match exhaustively to route every failure.
#[derive(Debug, Error)]
pub enum HalcyonError {
    /// The provided mnemonic phrase is malformed, has an unsupported word
    /// count, contains unknown words, or fails its checksum.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Human-readable description of the mnemonic validation failure.
        reason: String,
    },

    /// The provided private key is not 64 hexadecimal characters or does
    /// not represent a valid secp256k1 scalar.
    #[error("invalid private key: {reason}")]
    InvalidPrivateKey {
        /// Human-readable description of the private key validation failure.
        reason: String,
    },

    /// The provided address is malformed, fails checksum validation, or
    /// carries a prefix from a different network.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Human-readable description of why the address is invalid.
        reason: String,
    },

    /// The provided transfer amount is not a positive finite number or
    /// rounds to zero base units.
    #[error("invalid amount: {reason}")]
    InvalidAmount {
        /// Human-readable description of the amount validation failure.
        reason: String,
    },

    /// The spendable balance cannot cover the transfer amount plus fee.
    #[error("insufficient funds: need {needed} base units, have {available}")]
    InsufficientFunds {
        /// Amount plus fee, in base units.
        needed: u128,
        /// Spendable balance, in base units.
        available: u128,
    },

    /// Authenticated decryption failed. A wrong password and tampered or
    /// corrupted ciphertext are deliberately indistinguishable; no further
    /// detail is attached.
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// Decryption succeeded but the plaintext does not have the expected
    /// secret shape. Indicates a corrupted or foreign record, not a wrong
    /// password.
    #[error("malformed secret payload: {reason}")]
    MalformedSecret {
        /// Human-readable description of the payload problem.
        reason: String,
    },

    /// No account address could be derived from otherwise valid key
    /// material. Unreachable for well-formed secrets; kept as a guard.
    #[error("address derivation failed: {reason}")]
    AddressDerivation {
        /// Human-readable description of the derivation failure.
        reason: String,
    },

    /// A state machine operation was called in a state that does not
    /// permit it. The machine is left unchanged.
    #[error("invalid transition: {reason}")]
    InvalidTransition {
        /// Human-readable description of the attempted transition.
        reason: String,
    },

    /// The connected node reports a different chain than configured.
    #[error("chain id mismatch: expected '{expected}', got '{actual}'")]
    ChainMismatch {
        /// Chain id the wallet is configured for.
        expected: String,
        /// Chain id reported by the node.
        actual: String,
    },

    /// A network or RPC transport operation failed before the chain gave
    /// a definitive answer.
    #[error("transport error: {reason}")]
    TransportError {
        /// Human-readable description of the transport failure.
        reason: String,
    },

    /// A storage backend operation failed or stored data is corrupted.
    #[error("storage error: {reason}")]
    StorageError {
        /// Human-readable description of the storage failure.
        reason: String,
    },

    /// A cryptographic operation failed (key derivation, encryption,
    /// randomness).
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable description of the cryptographic failure.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`HalcyonError`].
pub type Result<T> = std::result::Result<T, HalcyonError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_roundtrip_bech32() -> std::result::Result<(), HalcyonError> {
        let account = AccountId::from_parts("hal", [0xABu8; 20])?;
        let encoded = account.to_string();
        assert!(encoded.starts_with("hal1"));
        let parsed: AccountId = encoded.parse()?;
        assert_eq!(account, parsed);
        Ok(())
    }

    #[test]
    fn account_id_uppercase_input_canonicalized() -> std::result::Result<(), HalcyonError> {
        let account = AccountId::from_parts("hal", [0x11u8; 20])?;
        let upper = account.to_string().to_uppercase();
        let parsed: AccountId = upper.parse()?;
        assert_eq!(account, parsed);
        assert_eq!(parsed.to_string(), account.to_string());
        Ok(())
    }

    #[test]
    fn account_id_corrupted_checksum_rejected() -> std::result::Result<(), HalcyonError> {
        let encoded = AccountId::from_parts("hal", [0x42u8; 20])?.to_string();
        let mut chars: Vec<char> = encoded.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'q' { 'p' } else { 'q' };
        let corrupted: String = chars.into_iter().collect();
        let result: std::result::Result<AccountId, _> = corrupted.parse();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn account_id_wrong_payload_length_rejected(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let encoded = bech32::encode("hal", [0u8; 19].to_base32(), Variant::Bech32)?;
        let result: std::result::Result<AccountId, _> = encoded.parse();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn account_id_bech32m_variant_rejected() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let encoded = bech32::encode("hal", [0u8; 20].to_base32(), Variant::Bech32m)?;
        let result: std::result::Result<AccountId, _> = encoded.parse();
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn account_id_hrp_match() -> std::result::Result<(), HalcyonError> {
        let account = AccountId::from_parts("hal", [0x01u8; 20])?;
        assert!(account.matches_hrp("hal"));
        assert!(!account.matches_hrp("cosmos"));
        Ok(())
    }

    #[test]
    fn account_id_foreign_prefix_parses_but_mismatches() -> std::result::Result<(), HalcyonError> {
        let foreign = AccountId::from_parts("cosmos", [0x07u8; 20])?;
        let parsed: AccountId = foreign.to_string().parse()?;
        assert_eq!(parsed.hrp(), "cosmos");
        assert!(!parsed.matches_hrp("hal"));
        Ok(())
    }

    #[test]
    fn account_id_garbage_rejected() {
        let result: std::result::Result<AccountId, _> = "not an address".parse();
        assert!(result.is_err());
        let result: std::result::Result<AccountId, _> = "".parse();
        assert!(result.is_err());
    }

    #[test]
    fn account_id_serde_json_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let account = AccountId::from_parts("hal", [0x33u8; 20])?;
        let json = serde_json::to_string(&account)?;
        assert!(json.starts_with("\"hal1"));
        let parsed: AccountId = serde_json::from_str(&json)?;
        assert_eq!(account, parsed);
        Ok(())
    }

    #[test]
    fn error_display() {
        let err = HalcyonError::InvalidAddress {
            reason: "too short".into(),
        };
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn decryption_error_is_opaque() {
        let msg = HalcyonError::DecryptionFailed.to_string();
        assert_eq!(msg, "decryption failed: wrong password or corrupted data");
    }

    #[test]
    fn insufficient_funds_carries_both_sides() {
        let err = HalcyonError::InsufficientFunds {
            needed: 1_002_500,
            available: 1_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("1002500"));
        assert!(msg.contains("1000000"));
    }
}
