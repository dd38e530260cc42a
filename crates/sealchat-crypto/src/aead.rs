//! XChaCha20-Poly1305 authenticated encryption.
//!
//! All symmetric encryption in the engine — the message body under the
//! session key, and the session key itself under each per-recipient
//! wrap key — goes through this module. The Poly1305 tag appended to
//! every ciphertext is the engine's modification-detection code:
//! [`aead_open`] refuses to return a single plaintext byte when the
//! tag does not verify.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sealchat_types::{Result, SealchatError};
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// SymmetricKey
// ---------------------------------------------------------------------------

/// 256-bit XChaCha20-Poly1305 key. Zeroized on drop.
///
/// Serves both as the per-message session key (freshly generated for
/// every seal operation) and as the HKDF-derived wrap key protecting
/// the session key inside a recipient record.
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Fixed byte length of a symmetric key.
    pub const LEN: usize = 32;

    /// Generates a fresh random key from OS entropy.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Creates a [`SymmetricKey`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a [`SymmetricKey`] from a slice that must be exactly
    /// 32 bytes.
    ///
    /// # Errors
    ///
    /// [`SealchatError::IntegrityFailure`] on any other length — the
    /// only caller feeds this from an unwrapped session-key record,
    /// where a wrong length means the record was corrupted.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(SealchatError::IntegrityFailure {
                reason: format!(
                    "unwrapped session key has {} bytes, expected {}",
                    bytes.len(),
                    Self::LEN
                ),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// SymmetricKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// AeadNonce
// ---------------------------------------------------------------------------

/// 192-bit (24-byte) nonce for XChaCha20-Poly1305.
///
/// Generated from OS entropy once per encryption; the 192-bit space
/// makes accidental collision negligible. Transmitted in the clear
/// next to its ciphertext.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; 24]);

impl AeadNonce {
    /// Fixed byte length of an XChaCha20-Poly1305 nonce.
    pub const LEN: usize = 24;

    /// Creates an [`AeadNonce`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 24-byte array.
    pub fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }

    /// Generates a fresh random nonce from OS entropy.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 24];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// Seal / Open
// ---------------------------------------------------------------------------

/// Encrypts `plaintext`, returning the ciphertext with the 16-byte
/// Poly1305 tag appended.
///
/// # Errors
///
/// [`SealchatError::CryptoFailure`] if the underlying cipher fails.
pub fn aead_seal(
    key: &SymmetricKey,
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let xnonce = XNonce::from_slice(&nonce.0);
    let payload = Payload { msg: plaintext, aad };

    cipher
        .encrypt(xnonce, payload)
        .map_err(|e| SealchatError::CryptoFailure {
            reason: format!("XChaCha20-Poly1305 encryption failed: {e}"),
        })
}

/// Decrypts `ciphertext` and verifies its Poly1305 tag.
///
/// # Errors
///
/// [`SealchatError::IntegrityFailure`] if tag verification fails
/// (wrong key, wrong nonce, tampered ciphertext, or wrong AAD). The
/// cipher discards the plaintext internally in that case — nothing
/// partial is ever surfaced.
pub fn aead_open(
    key: &SymmetricKey,
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let xnonce = XNonce::from_slice(&nonce.0);
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(xnonce, payload)
        .map_err(|_| SealchatError::IntegrityFailure {
            reason: "XChaCha20-Poly1305 tag verification failed".into(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
