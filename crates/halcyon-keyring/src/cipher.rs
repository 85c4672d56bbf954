//! Password-based encryption of wallet secrets.
//!
//! [`encrypt_secret`] turns a [`KeyMaterial`] into a self-contained
//! [`EncryptedWalletRecord`]; [`decrypt_secret`] reverses it given the
//! password. Every encryption draws a fresh random salt and nonce, so
//! encrypting the same secret twice never produces related ciphertexts.
//!
//! Decryption failure is deliberately opaque: a wrong password and a
//! tampered record both surface as [`HalcyonError::DecryptionFailed`]
//! with no distinguishing detail.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use halcyon_crypto::aead::{decrypt_aes256_gcm, encrypt_aes256_gcm, AeadNonce};
use halcyon_crypto::kdf::{pbkdf2_derive_key, Pbkdf2Params};
use halcyon_types::{HalcyonError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::record::{EncryptedWalletRecord, IV_LEN, SALT_LEN};
use crate::secret::{KeyMaterial, Secret, SourceKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Additional authenticated data for record encryption.
///
/// Binds ciphertext to the keyring record format. Any attempt to
/// decrypt with a different AAD (e.g. from a different application)
/// will fail authentication.
pub(crate) const RECORD_AAD: &[u8] = b"halcyon-keyring-v1";

// ---------------------------------------------------------------------------
// SecretPayload
// ---------------------------------------------------------------------------

/// JSON shape of the plaintext inside a record's ciphertext.
///
/// Serializes as `{"mnemonic": "..."}` or `{"privateKeyHex": "..."}`;
/// the field name alone identifies the variant, so the ciphertext
/// carries no separate tag. Must round-trip byte-for-byte for equal
/// inputs, which `serde_json` object serialization guarantees for a
/// single-field struct variant.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(untagged)]
enum SecretPayload {
    /// Mnemonic wallet payload.
    Mnemonic {
        /// The normalized BIP39 phrase.
        mnemonic: String,
    },
    /// Imported-key wallet payload.
    PrivateKey {
        /// Lowercase hex of the 32-byte private scalar.
        #[serde(rename = "privateKeyHex")]
        private_key_hex: String,
    },
}

// ---------------------------------------------------------------------------
// Encryption
// ---------------------------------------------------------------------------

/// Encrypts a secret under a password with the default derivation cost.
///
/// See [`encrypt_secret_with_params`].
pub fn encrypt_secret(
    material: &KeyMaterial,
    password: &str,
    name: Option<&str>,
) -> Result<EncryptedWalletRecord> {
    encrypt_secret_with_params(material, password, name, &Pbkdf2Params::default())
}

/// Encrypts a secret under a password into a persistable record.
///
/// # Process
///
/// 1. Generate a fresh random 16-byte salt and 12-byte nonce.
/// 2. Derive the AES key via PBKDF2(password, salt).
/// 3. Serialize the secret payload to canonical JSON.
/// 4. Encrypt with AES-256-GCM under the record AAD.
/// 5. Assemble the record with base64-encoded binary fields.
///
/// # Errors
///
/// - [`HalcyonError::CryptoError`] if OS randomness is unavailable or a
///   primitive fails.
pub fn encrypt_secret_with_params(
    material: &KeyMaterial,
    password: &str,
    name: Option<&str>,
    params: &Pbkdf2Params,
) -> Result<EncryptedWalletRecord> {
    // 1. Fresh salt and nonce for every call; reuse would break the
    //    AEAD security guarantee.
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| HalcyonError::CryptoError {
            reason: format!("failed to generate random salt: {e}"),
        })?;

    let mut nonce_bytes = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| HalcyonError::CryptoError {
            reason: format!("failed to generate random nonce: {e}"),
        })?;
    let nonce = AeadNonce::from_bytes(nonce_bytes);

    // 2. Derive the encryption key.
    let derived_key = pbkdf2_derive_key(password.as_bytes(), &salt, params)?;

    // 3. Serialize the secret payload. Zeroize the plaintext on all paths.
    let payload = match material.secret() {
        Secret::Mnemonic(phrase) => SecretPayload::Mnemonic {
            mnemonic: phrase.clone(),
        },
        Secret::PrivateKey(bytes) => SecretPayload::PrivateKey {
            private_key_hex: hex::encode(bytes),
        },
    };
    let mut plaintext = serde_json::to_vec(&payload).map_err(|e| HalcyonError::CryptoError {
        reason: format!("failed to serialize secret payload: {e}"),
    })?;

    // 4. Encrypt.
    let encrypted = encrypt_aes256_gcm(derived_key.as_bytes(), &nonce, &plaintext, RECORD_AAD);
    plaintext.zeroize();
    let encrypted = encrypted?;

    // 5. Assemble the record.
    Ok(EncryptedWalletRecord {
        address: material.address().to_string(),
        kind: material.kind(),
        ciphertext: STANDARD.encode(&encrypted.ciphertext),
        iv: STANDARD.encode(nonce_bytes),
        salt: STANDARD.encode(salt),
        name: name.map(str::to_owned),
    })
}

// ---------------------------------------------------------------------------
// Decryption
// ---------------------------------------------------------------------------

/// Decrypts a record with the default derivation cost.
///
/// See [`decrypt_secret_with_params`].
pub fn decrypt_secret(record: &EncryptedWalletRecord, password: &str) -> Result<Secret> {
    decrypt_secret_with_params(record, password, &Pbkdf2Params::default())
}

/// Recovers the plaintext secret from a record given the password.
///
/// # Process
///
/// 1. Decode the base64 fields and check the nonce/salt lengths.
/// 2. Derive the AES key via PBKDF2(password, record.salt).
/// 3. Authenticated decryption of the ciphertext.
/// 4. Parse the plaintext payload and cross-check it against the
///    record's declared kind.
///
/// # Errors
///
/// - [`HalcyonError::DecryptionFailed`] if a field fails to decode or
///   the authentication tag does not verify. A wrong password and a
///   corrupted record are indistinguishable here by design.
/// - [`HalcyonError::MalformedSecret`] if authentication succeeded but
///   the plaintext is not a recognized secret payload, or disagrees
///   with the record's `type` field. This indicates a damaged record,
///   not a wrong password.
pub fn decrypt_secret_with_params(
    record: &EncryptedWalletRecord,
    password: &str,
    params: &Pbkdf2Params,
) -> Result<Secret> {
    // 1. Decode stored fields. Malformed fields are treated exactly like
    //    tampering: the caller learns nothing beyond "decryption failed".
    let (ciphertext, iv, salt) = match record.decode_parts() {
        Ok(parts) => parts,
        Err(_) => return Err(HalcyonError::DecryptionFailed),
    };

    // 2. Derive the decryption key.
    let derived_key = pbkdf2_derive_key(password.as_bytes(), &salt, params)?;

    // 3. Authenticated decryption.
    let nonce = AeadNonce::from_bytes(iv);
    let mut plaintext =
        match decrypt_aes256_gcm(derived_key.as_bytes(), &nonce, &ciphertext, RECORD_AAD) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::debug!(address = %record.address, "record failed authenticated decryption");
                return Err(e);
            }
        };

    // 4. Parse the payload. Zeroize the plaintext on all paths.
    let parsed: std::result::Result<SecretPayload, _> = serde_json::from_slice(&plaintext);
    plaintext.zeroize();
    let mut payload = parsed.map_err(|_| HalcyonError::MalformedSecret {
        reason: "decrypted payload does not match any known secret shape".into(),
    })?;

    // 5. Cross-check the declared kind and rebuild the secret.
    let secret = match &mut payload {
        SecretPayload::Mnemonic { mnemonic } => {
            if record.kind != SourceKind::Mnemonic {
                return Err(HalcyonError::MalformedSecret {
                    reason: "record kind disagrees with decrypted payload".into(),
                });
            }
            Secret::Mnemonic(std::mem::take(mnemonic))
        }
        SecretPayload::PrivateKey { private_key_hex } => {
            if record.kind != SourceKind::PrivateKey {
                return Err(HalcyonError::MalformedSecret {
                    reason: "record kind disagrees with decrypted payload".into(),
                });
            }
            Secret::PrivateKey(private_key_from_hex(private_key_hex)?)
        }
    };
    Ok(secret)
}

/// Decodes the hex private key carried inside a decrypted payload.
fn private_key_from_hex(hex_str: &str) -> Result<[u8; 32]> {
    let mut raw = hex::decode(hex_str).map_err(|_| HalcyonError::MalformedSecret {
        reason: "private key payload is not valid hex".into(),
    })?;
    if raw.len() != 32 {
        raw.zeroize();
        return Err(HalcyonError::MalformedSecret {
            reason: "private key payload has the wrong length".into(),
        });
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&raw);
    raw.zeroize();
    Ok(bytes)
}
