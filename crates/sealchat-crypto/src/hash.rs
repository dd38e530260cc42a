//! SHA3-256 hashing and key-id derivation.

use sealchat_types::KeyId;
use sha3::{Digest, Sha3_256};

/// Computes the SHA3-256 hash of arbitrary data.
///
/// Deterministic: identical inputs always produce identical outputs.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Derives the stable 8-byte identifier of a public key.
///
/// `KeyId = SHA3-256(public_key_bytes)[0..8]`. Applied uniformly to
/// signing and encryption public keys; the decryptor matches
/// session-key records against this value.
pub fn derive_key_id(public_key_bytes: &[u8]) -> KeyId {
    let digest = sha3_256(public_key_bytes);
    let mut id = [0u8; 8];
    id.copy_from_slice(&digest[..8]);
    KeyId::new(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
