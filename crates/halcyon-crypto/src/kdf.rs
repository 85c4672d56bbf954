//! PBKDF2 key derivation for wallet record encryption.
//!
//! Derives a 256-bit encryption key from a user-supplied password and
//! random salt using PBKDF2-HMAC-SHA256. The iteration count is
//! configurable; invalid parameters return
//! [`HalcyonError::ConfigError`].

use halcyon_types::{HalcyonError, Result};
use hmac::Hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Pbkdf2Params
// ---------------------------------------------------------------------------

/// Configurable parameters for the PBKDF2 key derivation function.
///
/// The default of 250 000 iterations targets interactive unlock on
/// commodity hardware while keeping offline guessing expensive.
/// Lowering it weakens stored records; raising it only costs unlock
/// latency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pbkdf2Params {
    /// Number of PBKDF2 iterations. Must be ≥ 1.
    pub iterations: u32,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: 250_000,
        }
    }
}

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// 256-bit key derived by PBKDF2.
///
/// Automatically zeroized when dropped to minimize the time
/// sensitive material resides in memory.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Fixed byte length of the derived key.
    pub const LEN: usize = 32;

    /// Returns the raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// DerivedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Minimum acceptable salt length. The keyring always uses 16-byte
/// salts; the primitive enforces ≥ 8 bytes.
const MIN_SALT_LEN: usize = 8;

/// Derives a 256-bit key from a password and salt using
/// PBKDF2-HMAC-SHA256.
///
/// The derivation is deterministic: equal password, salt, and
/// iteration count always yield the same key.
///
/// # Parameters
///
/// - `password` — user-supplied passphrase (arbitrary bytes).
/// - `salt` — random salt (minimum 8 bytes; 16 used by the keyring).
/// - `params` — iteration count (see [`Pbkdf2Params`]).
///
/// # Errors
///
/// - [`HalcyonError::ConfigError`] if `iterations` is 0 or the salt is
///   too short.
/// - [`HalcyonError::CryptoError`] if the underlying PBKDF2
///   computation fails.
pub fn pbkdf2_derive_key(
    password: &[u8],
    salt: &[u8],
    params: &Pbkdf2Params,
) -> Result<DerivedKey> {
    if params.iterations == 0 {
        return Err(HalcyonError::ConfigError {
            reason: "PBKDF2 iteration count must be at least 1".into(),
        });
    }

    if salt.len() < MIN_SALT_LEN {
        return Err(HalcyonError::ConfigError {
            reason: format!(
                "salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            ),
        });
    }

    let mut output = [0u8; 32];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, &mut output).map_err(
        |e| HalcyonError::CryptoError {
            reason: format!("PBKDF2 derivation failed: {e}"),
        },
    )?;

    Ok(DerivedKey(output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
