//! SHA-256 and HASH160 digests.
//!
//! HASH160 (`RIPEMD160(SHA256(data))`) over the compressed secp256k1
//! public key is the payload of every Halcyon account address.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Computes `RIPEMD160(SHA256(data))`, the 20-byte address hash.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripe);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
