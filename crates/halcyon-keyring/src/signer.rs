//! Signing identity construction.
//!
//! Turns raw user input (a BIP39 phrase or a hex private key), fresh OS
//! entropy, or a stored [`EncryptedWalletRecord`] into a
//! [`KeyMaterial`] whose address is derived deterministically from the
//! secret: BIP39 seed (empty passphrase) → BIP32 secp256k1 derivation
//! at the configured path → compressed public key → HASH160 → bech32
//! under the configured prefix. The address is never accepted as input.
//!
//! All operations here are deterministic and perform no I/O beyond
//! entropy collection in [`generate`].

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use halcyon_crypto::hash::hash160;
use halcyon_crypto::kdf::Pbkdf2Params;
use halcyon_types::config::ChainConfig;
use halcyon_types::{AccountId, HalcyonError, Result};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::cipher::decrypt_secret_with_params;
use crate::record::EncryptedWalletRecord;
use crate::secret::{KeyMaterial, Secret};

// ---------------------------------------------------------------------------
// Import operations
// ---------------------------------------------------------------------------

/// Builds a signing identity from a user-supplied mnemonic phrase.
///
/// # Process
///
/// 1. Normalize the input: trim, lowercase, collapse internal
///    whitespace to single spaces.
/// 2. Enforce the 12-or-24 word policy, then validate word list and
///    checksum against the English BIP39 word list.
/// 3. Derive the signing key and address.
///
/// # Errors
///
/// - [`HalcyonError::InvalidMnemonic`] if the word count is not 12 or
///   24, a word is not in the word list, or the checksum fails.
/// - [`HalcyonError::AddressDerivation`] if no address can be derived
///   from an otherwise valid phrase (unreachable in practice).
pub fn import_mnemonic(raw: &str, config: &ChainConfig) -> Result<KeyMaterial> {
    let normalized = normalize_phrase(raw);
    material_from_secret(Secret::Mnemonic(normalized), config)
}

/// Builds a signing identity from a raw hex private key.
///
/// The trimmed input must be exactly 64 hex characters (32 bytes),
/// case-insensitive, with no `0x` prefix.
///
/// # Errors
///
/// - [`HalcyonError::InvalidPrivateKey`] if the input has the wrong
///   length, contains non-hex characters, or is not a valid secp256k1
///   scalar (zero or not below the curve order).
pub fn import_private_key(raw: &str, config: &ChainConfig) -> Result<KeyMaterial> {
    // 1. Gate the textual form before touching any key machinery.
    let trimmed = raw.trim();
    if trimmed.len() != 64 {
        return Err(HalcyonError::InvalidPrivateKey {
            reason: format!("expected 64 hex characters, got {}", trimmed.len()),
        });
    }
    let mut raw_bytes = hex::decode(trimmed).map_err(|_| HalcyonError::InvalidPrivateKey {
        reason: "value contains non-hex characters".into(),
    })?;

    // 2. Move the bytes into a Secret and scrub the intermediates.
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&raw_bytes);
    raw_bytes.zeroize();
    let secret = Secret::PrivateKey(bytes);
    bytes.zeroize();

    material_from_secret(secret, config)
}

/// Generates a fresh wallet identity from OS entropy.
///
/// `word_count` selects the phrase length: 12 words (128-bit entropy)
/// or 24 words (256-bit entropy). The phrase is available through
/// [`Secret::mnemonic_phrase`] on the returned material for the user
/// to back up.
///
/// # Errors
///
/// - [`HalcyonError::InvalidMnemonic`] for any other word count.
/// - [`HalcyonError::CryptoError`] if OS randomness is unavailable.
pub fn generate(word_count: usize, config: &ChainConfig) -> Result<KeyMaterial> {
    // 1. Map the word count to an entropy size.
    let entropy_len = match word_count {
        12 => 16,
        24 => 32,
        other => {
            return Err(HalcyonError::InvalidMnemonic {
                reason: format!("word count must be 12 or 24, got {other}"),
            })
        }
    };

    // 2. Draw entropy. Zeroize it on all paths.
    let mut entropy = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut entropy[..entropy_len])
        .map_err(|e| HalcyonError::CryptoError {
            reason: format!("failed to generate mnemonic entropy: {e}"),
        })?;

    // 3. Encode the phrase and derive the identity.
    let result = (|| -> Result<KeyMaterial> {
        let mut mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
            .map_err(|e| HalcyonError::CryptoError {
                reason: format!("entropy does not encode a mnemonic: {e}"),
            })?;
        let phrase = mnemonic.to_string();
        mnemonic.zeroize();
        material_from_secret(Secret::Mnemonic(phrase), config)
    })();

    entropy.zeroize();
    result
}

// ---------------------------------------------------------------------------
// Restore operation
// ---------------------------------------------------------------------------

/// Restores a signing identity from a stored record with the default
/// derivation cost.
///
/// See [`restore_with_params`].
pub fn restore(
    record: &EncryptedWalletRecord,
    password: &str,
    config: &ChainConfig,
) -> Result<KeyMaterial> {
    restore_with_params(record, password, config, &Pbkdf2Params::default())
}

/// Decrypts a stored record and rebuilds the signing identity.
///
/// The address derived from the decrypted secret must reproduce the
/// record's stored address; a mismatch means the record was paired
/// with foreign key material and is rejected.
///
/// # Errors
///
/// - [`HalcyonError::DecryptionFailed`] for a wrong password or a
///   tampered record (indistinguishable by design).
/// - [`HalcyonError::MalformedSecret`] if the decrypted payload is not
///   a valid secret or does not derive the stored address.
pub fn restore_with_params(
    record: &EncryptedWalletRecord,
    password: &str,
    config: &ChainConfig,
    params: &Pbkdf2Params,
) -> Result<KeyMaterial> {
    // 1. Decrypt the stored secret.
    let secret = decrypt_secret_with_params(record, password, params)?;

    // 2. Rebuild the identity. Validation failures at this point mean
    //    the stored payload is damaged, not that the user mistyped.
    let material = material_from_secret(secret, config).map_err(|e| match e {
        HalcyonError::InvalidMnemonic { reason }
        | HalcyonError::InvalidPrivateKey { reason } => HalcyonError::MalformedSecret { reason },
        other => other,
    })?;

    // 3. The derived address must reproduce the stored one.
    if material.address().to_string() != record.address {
        return Err(HalcyonError::MalformedSecret {
            reason: "decrypted secret does not derive the record address".into(),
        });
    }
    Ok(material)
}

// ---------------------------------------------------------------------------
// Derivation internals
// ---------------------------------------------------------------------------

/// Derives the address for a secret and pairs the two into a
/// [`KeyMaterial`]. Shared tail of every construction path.
pub(crate) fn material_from_secret(secret: Secret, config: &ChainConfig) -> Result<KeyMaterial> {
    let signing_key = signing_key_from_secret(&secret, config)?;
    let address = account_id_for_key(&signing_key, &config.bech32_prefix)?;
    Ok(KeyMaterial::new(address, secret))
}

/// Reconstructs the secp256k1 signing key a secret encodes.
fn signing_key_from_secret(secret: &Secret, config: &ChainConfig) -> Result<SigningKey> {
    match secret {
        Secret::Mnemonic(phrase) => {
            // 12 or 24 words only; BIP39 itself would also accept
            // 15/18/21-word phrases.
            let words = phrase.split_whitespace().count();
            if words != 12 && words != 24 {
                return Err(HalcyonError::InvalidMnemonic {
                    reason: format!("phrase must be 12 or 24 words, got {words}"),
                });
            }

            let mut mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
                .map_err(|e| HalcyonError::InvalidMnemonic {
                    reason: e.to_string(),
                })?;
            let mut seed = mnemonic.to_seed("");
            mnemonic.zeroize();

            let key = derive_at_path(&seed, &config.derivation_path);
            seed.zeroize();
            key
        }
        Secret::PrivateKey(bytes) => {
            SigningKey::from_slice(bytes).map_err(|_| HalcyonError::InvalidPrivateKey {
                reason: "value is not a valid secp256k1 scalar".into(),
            })
        }
    }
}

/// Runs BIP32 derivation over a BIP39 seed.
fn derive_at_path(seed: &[u8; 64], path: &str) -> Result<SigningKey> {
    let derivation_path: DerivationPath =
        path.parse().map_err(|e| HalcyonError::ConfigError {
            reason: format!("invalid derivation path '{path}': {e}"),
        })?;
    let xprv = XPrv::derive_from_path(seed, &derivation_path).map_err(|e| {
        HalcyonError::AddressDerivation {
            reason: format!("BIP32 derivation failed: {e}"),
        }
    })?;
    Ok(xprv.private_key().clone())
}

/// Hashes the compressed public key into a bech32 account address.
fn account_id_for_key(key: &SigningKey, prefix: &str) -> Result<AccountId> {
    let point = key.verifying_key().to_encoded_point(true);
    let digest = hash160(point.as_bytes());
    AccountId::from_parts(prefix, digest).map_err(|e| HalcyonError::AddressDerivation {
        reason: format!("cannot encode account id: {e}"),
    })
}

/// Normalizes a user-supplied mnemonic phrase: trim, lowercase, and
/// collapse internal whitespace runs to single spaces.
fn normalize_phrase(raw: &str) -> String {
    let mut lowered = raw.to_lowercase();
    let normalized = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    lowered.zeroize();
    normalized
}
