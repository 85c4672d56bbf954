//! Credential custody for the Halcyon wallet.
//!
//! This crate owns the full lifecycle of a wallet secret: importing or
//! generating key material, encrypting it under a user password,
//! persisting the ciphertext envelope, and reconstructing the signing
//! identity from it later. Plaintext secrets exist only in memory and
//! are zeroized on drop; nothing in this crate ever writes a secret to
//! a backend in the clear.
//!
//! # Modules
//!
//! - [`secret`] — in-memory key material ([`secret::Secret`],
//!   [`secret::KeyMaterial`], [`secret::SourceKind`])
//! - [`signer`] — identity construction from mnemonics, raw private
//!   keys, or stored records
//! - [`cipher`] — password-based encryption of secrets into records
//! - [`record`] — the at-rest [`record::EncryptedWalletRecord`] format
//! - [`kv`] — the injectable [`kv::KeyValueStore`] persistence seam and
//!   its memory, file, and sled backends
//! - [`store`] — [`store::EncryptedWalletStore`], record persistence
//!   keyed by address

pub mod cipher;
pub mod kv;
pub mod record;
pub mod secret;
pub mod signer;
pub mod store;
