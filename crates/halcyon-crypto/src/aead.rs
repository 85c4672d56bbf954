//! AES-256-GCM authenticated encryption with associated data.
//!
//! All symmetric encryption in the Halcyon wallet core uses AES-256-GCM
//! with 96-bit (12-byte) nonces. Nonces are generated from OS entropy
//! and **must never be reused** with the same key.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use halcyon_types::{HalcyonError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

// ---------------------------------------------------------------------------
// AeadNonce
// ---------------------------------------------------------------------------

/// 96-bit (12-byte) nonce for AES-256-GCM.
///
/// Stored as the `iv` field of an encrypted wallet record. Each nonce
/// must be unique per encryption operation; reuse with the same key
/// destroys confidentiality and authenticity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; 12]);

impl AeadNonce {
    /// Fixed byte length of an AES-GCM nonce.
    pub const LEN: usize = 12;

    /// Creates an [`AeadNonce`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 12-byte array.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

/// Generates a fresh 96-bit random nonce from OS entropy.
///
/// Each call produces a nonce suitable for a single AES-256-GCM
/// encryption.
pub fn generate_aead_nonce() -> AeadNonce {
    let mut bytes = [0u8; 12];
    OsRng.fill_bytes(&mut bytes);
    AeadNonce(bytes)
}

// ---------------------------------------------------------------------------
// CiphertextWithTag
// ---------------------------------------------------------------------------

/// Bundle of nonce + ciphertext produced by [`encrypt_aes256_gcm`].
///
/// The `ciphertext` field includes the 16-byte GCM authentication tag
/// appended by the AEAD cipher.
#[derive(Clone, Debug)]
pub struct CiphertextWithTag {
    /// Nonce used for this encryption. Must be stored alongside the
    /// ciphertext so the owner can decrypt.
    pub nonce: AeadNonce,
    /// Encrypted payload with the GCM tag appended
    /// (length = plaintext length + 16).
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Encrypt / Decrypt
// ---------------------------------------------------------------------------

/// Encrypts `plaintext` with AES-256-GCM.
///
/// # Parameters
///
/// - `key` — 256-bit symmetric key.
/// - `nonce` — 96-bit nonce (must be unique per key; use
///   [`generate_aead_nonce`]).
/// - `plaintext` — data to encrypt.
/// - `aad` — additional authenticated data. Authenticated but **not**
///   encrypted. Pass `&[]` if unused.
///
/// # Returns
///
/// A [`CiphertextWithTag`] containing the nonce and the ciphertext
/// with the appended 16-byte authentication tag.
pub fn encrypt_aes256_gcm(
    key: &[u8; 32],
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<CiphertextWithTag> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let gcm_nonce = Nonce::from_slice(&nonce.0);
    let payload = Payload { msg: plaintext, aad };

    let ciphertext = cipher.encrypt(gcm_nonce, payload).map_err(|e| {
        HalcyonError::CryptoError {
            reason: format!("AES-256-GCM encryption failed: {e}"),
        }
    })?;

    Ok(CiphertextWithTag {
        nonce: *nonce,
        ciphertext,
    })
}

/// Decrypts `ciphertext` with AES-256-GCM.
///
/// # Parameters
///
/// - `key` — 256-bit symmetric key (must match the one used for encryption).
/// - `nonce` — 96-bit nonce used during encryption.
/// - `ciphertext` — encrypted data with the GCM tag appended.
/// - `aad` — additional authenticated data (must match what was passed
///   to [`encrypt_aes256_gcm`]).
///
/// # Errors
///
/// Returns [`HalcyonError::DecryptionFailed`] if tag verification
/// fails. A wrong key, wrong nonce, tampered ciphertext, and wrong AAD
/// all produce the same opaque error; callers cannot tell them apart.
pub fn decrypt_aes256_gcm(
    key: &[u8; 32],
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let gcm_nonce = Nonce::from_slice(&nonce.0);
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(gcm_nonce, payload)
        .map_err(|_| HalcyonError::DecryptionFailed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();
        let plaintext = b"halcyon wallet secret";
        let aad = b"metadata";

        let encrypted = encrypt_aes256_gcm(&key, &nonce, plaintext, aad)?;
        assert_ne!(encrypted.ciphertext.as_slice(), plaintext.as_slice());
        assert_eq!(encrypted.ciphertext.len(), plaintext.len() + 16);

        let decrypted = decrypt_aes256_gcm(&key, &encrypted.nonce, &encrypted.ciphertext, aad)?;
        assert_eq!(decrypted.as_slice(), plaintext.as_slice());
        Ok(())
    }

    #[test]
    fn empty_plaintext_roundtrip() -> std::result::Result<(), HalcyonError> {
        let key = [0x01u8; 32];
        let nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"", b"")?;
        assert_eq!(encrypted.ciphertext.len(), 16); // tag only

        let decrypted = decrypt_aes256_gcm(&key, &nonce, &encrypted.ciphertext, b"")?;
        assert!(decrypted.is_empty());
        Ok(())
    }

    #[test]
    fn wrong_key_fails_decrypt() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let wrong_key = [0x43u8; 32];
        let nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"secret", b"")?;
        let result = decrypt_aes256_gcm(&wrong_key, &nonce, &encrypted.ciphertext, b"");
        assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));
        Ok(())
    }

    #[test]
    fn wrong_nonce_fails_decrypt() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();
        let wrong_nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"secret", b"")?;
        let result = decrypt_aes256_gcm(&key, &wrong_nonce, &encrypted.ciphertext, b"");
        assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));
        Ok(())
    }

    #[test]
    fn wrong_aad_fails_decrypt() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"secret", b"correct aad")?;
        let result = decrypt_aes256_gcm(&key, &nonce, &encrypted.ciphertext, b"wrong aad");
        assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));
        Ok(())
    }

    #[test]
    fn tampered_ciphertext_fails_decrypt() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"secret", b"")?;
        let mut tampered = encrypted.ciphertext.clone();
        if let Some(byte) = tampered.first_mut() {
            *byte ^= 0xFF;
        }
        let result = decrypt_aes256_gcm(&key, &nonce, &tampered, b"");
        assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));
        Ok(())
    }

    #[test]
    fn truncated_ciphertext_fails_decrypt() -> std::result::Result<(), HalcyonError> {
        let key = [0x42u8; 32];
        let nonce = generate_aead_nonce();

        let encrypted = encrypt_aes256_gcm(&key, &nonce, b"secret", b"")?;
        let truncated = &encrypted.ciphertext[..encrypted.ciphertext.len() - 1];
        let result = decrypt_aes256_gcm(&key, &nonce, truncated, b"");
        assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));
        Ok(())
    }

    #[test]
    fn deterministic_with_same_inputs() -> std::result::Result<(), HalcyonError> {
        let key = [0xAA; 32];
        let nonce = AeadNonce::from_bytes([0xBB; 12]);
        let plaintext = b"determinism test";
        let aad = b"aad";

        let enc1 = encrypt_aes256_gcm(&key, &nonce, plaintext, aad)?;
        let enc2 = encrypt_aes256_gcm(&key, &nonce, plaintext, aad)?;
        assert_eq!(enc1.ciphertext, enc2.ciphertext);
        Ok(())
    }

    #[test]
    fn generated_nonces_are_unique() {
        let n1 = generate_aead_nonce();
        let n2 = generate_aead_nonce();
        assert_ne!(n1.as_bytes(), n2.as_bytes());
    }
}
