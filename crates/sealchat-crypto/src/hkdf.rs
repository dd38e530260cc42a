//! HKDF-SHA256 wrap-key derivation.
//!
//! The raw X25519 shared secret from a session-key record is never
//! used as a cipher key directly. It is expanded through HKDF-SHA256
//! (RFC 5869) with a fixed domain-separating salt and an info string
//! binding the derivation to the exact ephemeral/recipient key pair:
//!
//! ```text
//! wrap_key = HKDF-SHA256(
//!     IKM  = X25519 shared secret,
//!     salt = b"Sealchat-Wrap-v1",
//!     info = ephemeral_pub || recipient_pub,
//!     L    = 32
//! )
//! ```

use hkdf::Hkdf;
use sealchat_types::{Result, SealchatError};
use sha2::Sha256;

use crate::aead::SymmetricKey;
use crate::ecdh::{SharedSecret, X25519PublicKey};

/// Fixed HKDF salt for wrap-key derivation.
///
/// Domain separator: keys derived here are cryptographically
/// independent from any other use of the same shared secret.
const WRAP_KEY_SALT: &[u8] = b"Sealchat-Wrap-v1";

/// Derives the wrap key protecting a session key inside one
/// per-recipient record.
///
/// Both sides call this with the same inputs: the sender with its
/// freshly generated ephemeral public key, the recipient with the
/// ephemeral public key read back from the record.
///
/// # Errors
///
/// [`SealchatError::CryptoFailure`] if HKDF expansion fails.
pub fn derive_wrap_key(
    shared_secret: &SharedSecret,
    ephemeral_public: &X25519PublicKey,
    recipient_public: &X25519PublicKey,
) -> Result<SymmetricKey> {
    let mut info = Vec::with_capacity(64);
    info.extend_from_slice(ephemeral_public.as_bytes());
    info.extend_from_slice(recipient_public.as_bytes());

    let hk = Hkdf::<Sha256>::new(Some(WRAP_KEY_SALT), shared_secret.as_bytes());

    let mut okm = [0u8; 32];
    hk.expand(&info, &mut okm)
        .map_err(|e| SealchatError::CryptoFailure {
            reason: format!("HKDF-SHA256 expansion failed: {e}"),
        })?;

    Ok(SymmetricKey::from_bytes(okm))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
