//! X25519 Elliptic-Curve Diffie-Hellman key agreement.
//!
//! Session keys are never transmitted directly: each per-recipient
//! record carries an ephemeral X25519 public key, and both sides
//! derive the same shared secret by combining it with the recipient's
//! static encryption key. The raw shared secret is only ever fed into
//! HKDF (see [`crate::hkdf`]), never used as a cipher key itself.

use rand::rngs::OsRng;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// X25519PublicKey
// ---------------------------------------------------------------------------

/// X25519 public key (32 bytes, Montgomery form).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct X25519PublicKey(x25519_dalek::PublicKey);

impl X25519PublicKey {
    /// Fixed byte length of an X25519 public key.
    pub const LEN: usize = 32;

    /// Creates an [`X25519PublicKey`] from its raw 32-byte form.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(x25519_dalek::PublicKey::from(bytes))
    }

    /// Returns the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

// ---------------------------------------------------------------------------
// X25519StaticSecret
// ---------------------------------------------------------------------------

/// Long-lived X25519 secret key — the decryption half of a personal
/// key.
///
/// The underlying `x25519-dalek`
/// [`StaticSecret`](x25519_dalek::StaticSecret) zeroizes its memory on
/// drop. Clamping is performed internally during scalar
/// multiplication, so raw bytes are stored as-is.
pub struct X25519StaticSecret(x25519_dalek::StaticSecret);

impl X25519StaticSecret {
    /// Generates a fresh static secret from OS entropy.
    pub fn generate() -> Self {
        Self(x25519_dalek::StaticSecret::random_from_rng(OsRng))
    }

    /// Creates an [`X25519StaticSecret`] from raw 32-byte key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(x25519_dalek::StaticSecret::from(bytes))
    }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(x25519_dalek::PublicKey::from(&self.0))
    }

    /// Performs ECDH against a peer's public key.
    pub fn diffie_hellman(&self, their_public: &X25519PublicKey) -> SharedSecret {
        SharedSecret(self.0.diffie_hellman(&their_public.0).to_bytes())
    }
}

// X25519StaticSecret does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// X25519EphemeralSecret
// ---------------------------------------------------------------------------

/// Single-use ephemeral X25519 secret key.
///
/// Generated once per session-key record, used for one ECDH, then
/// discarded. Stored as a
/// [`StaticSecret`](x25519_dalek::StaticSecret) because the dalek
/// `EphemeralSecret` is consumed on `diffie_hellman` and the public
/// key must be extracted *before* the agreement runs.
pub struct X25519EphemeralSecret {
    inner: x25519_dalek::StaticSecret,
}

impl X25519EphemeralSecret {
    /// Generates a fresh ephemeral secret from OS entropy.
    pub fn generate() -> Self {
        Self {
            inner: x25519_dalek::StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Returns the public key corresponding to this ephemeral secret.
    ///
    /// Written into the session-key record so the recipient can derive
    /// the same shared secret.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(x25519_dalek::PublicKey::from(&self.inner))
    }

    /// Performs ECDH against the recipient's static public key,
    /// consuming the ephemeral secret.
    pub fn diffie_hellman(self, their_public: &X25519PublicKey) -> SharedSecret {
        SharedSecret(self.inner.diffie_hellman(&their_public.0).to_bytes())
    }
}

// ---------------------------------------------------------------------------
// SharedSecret
// ---------------------------------------------------------------------------

/// Raw 32-byte X25519 shared secret. Zeroized on drop.
///
/// Must only be used as HKDF input keying material.
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Returns the raw shared secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// SharedSecret does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
