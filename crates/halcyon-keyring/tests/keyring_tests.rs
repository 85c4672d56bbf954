//! Integration tests for halcyon-keyring.
//!
//! All tests use deterministic BIP39 mnemonics (all-zero and all-FF
//! entropy) and fixed passwords. Randomness only feeds wallet-internal
//! salt/nonce generation, which never affects an assertion. Most tests
//! run with a reduced PBKDF2 cost; exactly one roundtrip exercises the
//! production iteration count.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use halcyon_crypto::kdf::Pbkdf2Params;
use halcyon_types::config::ChainConfig;
use halcyon_types::HalcyonError;

use halcyon_keyring::cipher::{decrypt_secret_with_params, encrypt_secret, encrypt_secret_with_params};
use halcyon_keyring::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SledKeyValueStore};
use halcyon_keyring::secret::SourceKind;
use halcyon_keyring::signer::{
    generate, import_mnemonic, import_private_key, restore, restore_with_params,
};
use halcyon_keyring::store::{EncryptedWalletStore, STORE_KEY};

// ---------------------------------------------------------------------------
// Test constants (deterministic BIP39 mnemonics)
// ---------------------------------------------------------------------------

/// BIP39 mnemonic from all-zero 128-bit entropy.
const MNEMONIC_12: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

/// BIP39 mnemonic from all-zero 256-bit entropy.
const MNEMONIC_A: &str = "abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon art";

/// BIP39 mnemonic from all-0xFF 256-bit entropy.
const MNEMONIC_B: &str = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo \
                          zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote";

/// 32-byte secp256k1 private key, hex-encoded (0x11 repeated).
const PRIVATE_KEY_HEX: &str = "1111111111111111111111111111111111111111111111111111111111111111";

/// Wallet encryption password used in tests.
const PASSWORD: &str = "correct horse battery staple";

/// Alternative password for wrong-password tests.
const WRONG_PASSWORD: &str = "wrong passphrase entirely";

/// Reduced PBKDF2 cost so the suite stays fast.
fn light_params() -> Pbkdf2Params {
    Pbkdf2Params { iterations: 1_000 }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// RAII guard that removes a temporary file on drop.
struct TempFile(std::path::PathBuf);

impl TempFile {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "halcyon_test_{name}_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }

    fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// RAII guard that removes a temporary directory tree on drop.
struct TempDir(std::path::PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "halcyon_test_{name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        Self(path)
    }

    fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ---------------------------------------------------------------------------
// 1. Import → Encrypt → Restore cycle
// ---------------------------------------------------------------------------

#[test]
fn mnemonic_import_encrypt_restore_roundtrip() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let address = material.address().to_string();
    assert!(address.starts_with("hal1"));

    // Encrypt, then forget the plaintext material.
    let record = encrypt_secret_with_params(&material, PASSWORD, Some("main"), &light_params())?;
    drop(material);
    assert_eq!(record.address, address);
    assert_eq!(record.kind, SourceKind::Mnemonic);
    assert_eq!(record.name.as_deref(), Some("main"));

    // Restore with the correct password.
    let restored = restore_with_params(&record, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.address().to_string(), address);
    assert_eq!(restored.secret().mnemonic_phrase(), Some(MNEMONIC_A));

    Ok(())
}

#[test]
fn private_key_import_encrypt_restore_roundtrip() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_private_key(PRIVATE_KEY_HEX, &config)?;
    let address = material.address().to_string();

    let record = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;
    assert_eq!(record.kind, SourceKind::PrivateKey);
    assert_eq!(record.name, None);

    let restored = restore_with_params(&record, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.address().to_string(), address);
    assert_eq!(restored.secret().private_key_bytes(), Some(&[0x11u8; 32]));

    Ok(())
}

#[test]
fn wrong_password_rejected_then_correct_still_works() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let record = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;

    let result = restore_with_params(&record, WRONG_PASSWORD, &config, &light_params());
    assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));

    // The failed attempt must not damage the record.
    let restored = restore_with_params(&record, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.address().to_string(), record.address);

    Ok(())
}

#[test]
fn empty_password_works() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_12, &config)?;
    let record = encrypt_secret_with_params(&material, "", None, &light_params())?;

    restore_with_params(&record, "", &config, &light_params())?;

    // A non-empty password is still wrong.
    let result = restore_with_params(&record, "any", &config, &light_params());
    assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));

    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Record freshness and tamper resistance
// ---------------------------------------------------------------------------

#[test]
fn repeated_encryption_never_reuses_salt_or_nonce() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_A, &config)?;

    let r1 = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;
    let r2 = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;

    assert_ne!(r1.salt, r2.salt);
    assert_ne!(r1.iv, r2.iv);
    assert_ne!(r1.ciphertext, r2.ciphertext);

    // Both decrypt to the same secret regardless.
    let s1 = decrypt_secret_with_params(&r1, PASSWORD, &light_params())?;
    let s2 = decrypt_secret_with_params(&r2, PASSWORD, &light_params())?;
    assert_eq!(s1.mnemonic_phrase(), s2.mnemonic_phrase());

    Ok(())
}

#[test]
fn tampered_ciphertext_indistinguishable_from_wrong_password(
) -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let mut record = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;

    // Flip one bit inside the authenticated ciphertext.
    let mut raw = STANDARD
        .decode(&record.ciphertext)
        .map_err(|e| HalcyonError::StorageError {
            reason: e.to_string(),
        })?;
    let last = raw.len() - 1;
    raw[last] ^= 0x01;
    record.ciphertext = STANDARD.encode(&raw);

    let result = restore_with_params(&record, PASSWORD, &config, &light_params());
    assert!(matches!(result, Err(HalcyonError::DecryptionFailed)));

    Ok(())
}

#[test]
fn record_paired_with_foreign_address_rejected() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material_a = import_mnemonic(MNEMONIC_A, &config)?;
    let material_b = import_mnemonic(MNEMONIC_B, &config)?;

    // Pair A's ciphertext with B's address. Decryption succeeds, but
    // the rebuilt identity no longer matches the stored address.
    let mut record = encrypt_secret_with_params(&material_a, PASSWORD, None, &light_params())?;
    record.address = material_b.address().to_string();

    let result = restore_with_params(&record, PASSWORD, &config, &light_params());
    assert!(matches!(result, Err(HalcyonError::MalformedSecret { .. })));

    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Store lifecycle
// ---------------------------------------------------------------------------

#[test]
fn store_save_load_remove_cycle() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let store = EncryptedWalletStore::new(MemoryKeyValueStore::new());

    let material_a = import_mnemonic(MNEMONIC_A, &config)?;
    let material_b = import_private_key(PRIVATE_KEY_HEX, &config)?;
    let record_a = encrypt_secret_with_params(&material_a, PASSWORD, Some("first"), &light_params())?;
    let record_b = encrypt_secret_with_params(&material_b, PASSWORD, None, &light_params())?;

    store.save(&record_a)?;
    store.save(&record_b)?;
    assert_eq!(store.load_all()?.len(), 2);

    let loaded = store.load(&record_a.address)?;
    assert_eq!(loaded, Some(record_a.clone()));

    store.remove(&record_a.address)?;
    assert_eq!(store.load(&record_a.address)?, None);
    assert_eq!(store.load_all()?.len(), 1);

    // Removing again is a no-op.
    store.remove(&record_a.address)?;

    Ok(())
}

#[test]
fn reimport_overwrites_stored_record() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let store = EncryptedWalletStore::new(MemoryKeyValueStore::new());

    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let first = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;
    store.save(&first)?;

    // Same wallet encrypted again lands under the same address.
    let second = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;
    store.save(&second)?;

    let records = store.load_all()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ciphertext, second.ciphertext);

    Ok(())
}

#[test]
fn rename_preserves_decryptability() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let store = EncryptedWalletStore::new(MemoryKeyValueStore::new());

    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let record = encrypt_secret_with_params(&material, PASSWORD, Some("old name"), &light_params())?;
    store.save(&record)?;

    store.rename(&record.address, Some("new name"))?;

    let renamed = store
        .load(&record.address)?
        .ok_or(HalcyonError::StorageError {
            reason: "record vanished".into(),
        })?;
    assert_eq!(renamed.name.as_deref(), Some("new name"));
    assert_eq!(renamed.ciphertext, record.ciphertext);
    assert_eq!(renamed.iv, record.iv);
    assert_eq!(renamed.salt, record.salt);

    // The label is not authenticated data; decryption still succeeds.
    let restored = restore_with_params(&renamed, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.secret().mnemonic_phrase(), Some(MNEMONIC_A));

    Ok(())
}

#[test]
fn corrupted_entry_skipped_others_survive() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let store = EncryptedWalletStore::new(MemoryKeyValueStore::new());

    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let record = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;
    store.save(&record)?;

    // Wedge a structurally broken entry next to the good one.
    let json = store
        .backend()
        .get(STORE_KEY)?
        .ok_or(HalcyonError::StorageError {
            reason: "map missing".into(),
        })?;
    let patched = json.replacen('{', "{\"hal1broken\":\"not a record\",", 1);
    store.backend().set(STORE_KEY, &patched)?;

    let records = store.load_all()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, record.address);
    assert_eq!(store.load("hal1broken")?, None);

    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Persistence across store instances
// ---------------------------------------------------------------------------

#[test]
fn file_backend_survives_reopen() -> std::result::Result<(), HalcyonError> {
    let tmp = TempFile::new("file_reopen");
    let config = ChainConfig::default();

    let material = import_mnemonic(MNEMONIC_A, &config)?;
    let record = encrypt_secret_with_params(&material, PASSWORD, Some("persisted"), &light_params())?;

    {
        let store = EncryptedWalletStore::new(FileKeyValueStore::new(tmp.path()));
        store.save(&record)?;
    }

    // A fresh store over the same file sees the record.
    let store = EncryptedWalletStore::new(FileKeyValueStore::new(tmp.path()));
    let loaded = store.load(&record.address)?.ok_or(HalcyonError::StorageError {
        reason: "record not persisted".into(),
    })?;
    assert_eq!(loaded, record);

    let restored = restore_with_params(&loaded, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.address().to_string(), record.address);

    Ok(())
}

#[test]
fn sled_backend_survives_reopen() -> std::result::Result<(), HalcyonError> {
    let tmp = TempDir::new("sled_reopen");
    let config = ChainConfig::default();

    let material = import_private_key(PRIVATE_KEY_HEX, &config)?;
    let record = encrypt_secret_with_params(&material, PASSWORD, None, &light_params())?;

    {
        let store = EncryptedWalletStore::new(SledKeyValueStore::open(tmp.path())?);
        store.save(&record)?;
    }

    // Reopen the database after the first handle is dropped.
    let store = EncryptedWalletStore::new(SledKeyValueStore::open(tmp.path())?);
    let loaded = store.load(&record.address)?.ok_or(HalcyonError::StorageError {
        reason: "record not persisted".into(),
    })?;
    assert_eq!(loaded, record);

    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Generation
// ---------------------------------------------------------------------------

#[test]
fn generated_wallet_full_custody_lifecycle() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let store = EncryptedWalletStore::new(MemoryKeyValueStore::new());

    // Generate, encrypt, persist, forget.
    let material = generate(24, &config)?;
    let address = material.address().to_string();
    let phrase = material.secret().mnemonic_phrase().map(str::to_owned);
    let record = encrypt_secret_with_params(&material, PASSWORD, Some("generated"), &light_params())?;
    store.save(&record)?;
    drop(material);

    // Load and restore from storage alone.
    let loaded = store.load(&address)?.ok_or(HalcyonError::StorageError {
        reason: "record vanished".into(),
    })?;
    let restored = restore_with_params(&loaded, PASSWORD, &config, &light_params())?;
    assert_eq!(restored.address().to_string(), address);
    assert_eq!(restored.secret().mnemonic_phrase().map(str::to_owned), phrase);

    Ok(())
}

#[test]
fn generated_phrase_reimports_to_same_address() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();

    for word_count in [12, 24] {
        let material = generate(word_count, &config)?;
        let phrase = material
            .secret()
            .mnemonic_phrase()
            .map(str::to_owned)
            .ok_or(HalcyonError::MalformedSecret {
                reason: "generated material has no phrase".into(),
            })?;
        assert_eq!(phrase.split_whitespace().count(), word_count);

        let reimported = import_mnemonic(&phrase, &config)?;
        assert_eq!(reimported.address(), material.address());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// 6. Address prefix behavior
// ---------------------------------------------------------------------------

#[test]
fn same_key_different_prefix_same_key_hash() -> std::result::Result<(), HalcyonError> {
    let hal = ChainConfig::default();
    let osmo = ChainConfig {
        bech32_prefix: "osmo".to_owned(),
        ..ChainConfig::default()
    };

    let on_hal = import_mnemonic(MNEMONIC_A, &hal)?;
    let on_osmo = import_mnemonic(MNEMONIC_A, &osmo)?;

    // Same underlying key hash, different bech32 rendering.
    assert_eq!(on_hal.address().as_bytes(), on_osmo.address().as_bytes());
    assert_ne!(on_hal.address().to_string(), on_osmo.address().to_string());
    assert!(on_hal.address().to_string().starts_with("hal1"));
    assert!(on_osmo.address().to_string().starts_with("osmo1"));
    assert!(on_hal.address().matches_hrp("hal"));
    assert!(!on_hal.address().matches_hrp("osmo"));

    Ok(())
}

#[test]
fn distinct_mnemonics_distinct_addresses() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();

    let a = import_mnemonic(MNEMONIC_A, &config)?;
    let b = import_mnemonic(MNEMONIC_B, &config)?;
    let twelve = import_mnemonic(MNEMONIC_12, &config)?;

    assert_ne!(a.address(), b.address());
    assert_ne!(a.address(), twelve.address());
    assert_ne!(b.address(), twelve.address());

    Ok(())
}

// ---------------------------------------------------------------------------
// 7. Production derivation cost
// ---------------------------------------------------------------------------

#[test]
fn default_cost_roundtrip() -> std::result::Result<(), HalcyonError> {
    let config = ChainConfig::default();
    let material = import_mnemonic(MNEMONIC_12, &config)?;

    // Full-strength KDF, once; everything else runs reduced.
    let record = encrypt_secret(&material, PASSWORD, None)?;
    let restored = restore(&record, PASSWORD, &config)?;
    assert_eq!(restored.address(), material.address());

    Ok(())
}
