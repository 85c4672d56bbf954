//! Cryptographic primitives for the Halcyon wallet custody core.
//!
//! This crate is the **sole** location for all raw cryptographic
//! operations. No other crate in the workspace may perform raw crypto
//! directly.
//!
//! # Modules
//!
//! - [`kdf`] — PBKDF2-HMAC-SHA256 key derivation for record encryption
//! - [`aead`] — AES-256-GCM authenticated encryption/decryption
//! - [`hash`] — SHA-256 and HASH160 for address derivation

pub mod aead;
pub mod hash;
pub mod kdf;
