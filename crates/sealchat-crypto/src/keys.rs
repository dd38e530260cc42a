//! Personal and recipient key material.
//!
//! The engine consumes key material, it never produces or persists it:
//! a [`PersonalKey`] arrives ready-made from the caller's key store
//! with separate signing and decryption keypairs, and every seal call
//! is handed a list of [`RecipientKey`]s by the recipient-key source.
//! Revocation, expiry, and trust have all been decided before key
//! material reaches this crate.

use sealchat_types::{Address, KeyId};

use crate::ecdh::{X25519PublicKey, X25519StaticSecret};
use crate::hash::derive_key_id;
use crate::signing::Keypair;

// ---------------------------------------------------------------------------
// PersonalKey
// ---------------------------------------------------------------------------

/// The local identity's key material: an Ed25519 signing keypair, an
/// X25519 decryption keypair, and the local user part of the address.
///
/// Borrowed by the coder for the duration of one operation; the
/// engine never mutates or regenerates it.
pub struct PersonalKey {
    sign: Keypair,
    decrypt: X25519StaticSecret,
    local_part: String,
}

impl PersonalKey {
    /// Assembles a personal key from existing keypairs.
    pub fn new(sign: Keypair, decrypt: X25519StaticSecret, local_part: impl Into<String>) -> Self {
        Self {
            sign,
            decrypt,
            local_part: local_part.into(),
        }
    }

    /// Generates a fresh personal key. Intended for tests and
    /// first-run provisioning; long-term storage is the key store's
    /// concern.
    pub fn generate(local_part: impl Into<String>) -> Self {
        Self::new(
            Keypair::generate(),
            X25519StaticSecret::generate(),
            local_part,
        )
    }

    /// Returns the signing keypair.
    pub fn signing_keypair(&self) -> &Keypair {
        &self.sign
    }

    /// Returns the identifier of the signing public key, as embedded
    /// in one-pass and trailing signature packets.
    pub fn signing_key_id(&self) -> KeyId {
        derive_key_id(self.sign.public_key().as_bytes())
    }

    /// Returns the X25519 decryption secret.
    pub fn decryption_secret(&self) -> &X25519StaticSecret {
        &self.decrypt
    }

    /// Returns the X25519 public key recipients encrypt to.
    pub fn decryption_public(&self) -> X25519PublicKey {
        self.decrypt.public_key()
    }

    /// Returns the identifier of the decryption public key, matched
    /// against session-key records on decrypt.
    pub fn decryption_key_id(&self) -> KeyId {
        derive_key_id(self.decrypt.public_key().as_bytes())
    }

    /// Returns the full user address for a given network, in
    /// `local@network` form. Written into the envelope `From:` header.
    pub fn user_id(&self, network: &str) -> Address {
        Address::new(format!("{}@{}", self.local_part, network))
    }
}

// ---------------------------------------------------------------------------
// RecipientKey
// ---------------------------------------------------------------------------

/// One recipient's public encryption key, its derived identifier, and
/// the address used in envelope headers.
///
/// Supplied per seal call by the recipient-key source. Order of the
/// supplied list is preserved; the engine neither deduplicates nor
/// reorders.
#[derive(Clone, Debug)]
pub struct RecipientKey {
    public_key: X25519PublicKey,
    key_id: KeyId,
    address: Address,
}

impl RecipientKey {
    /// Creates a recipient entry, deriving the key id from the public
    /// key.
    pub fn new(public_key: X25519PublicKey, address: Address) -> Self {
        let key_id = derive_key_id(public_key.as_bytes());
        Self {
            public_key,
            key_id,
            address,
        }
    }

    /// Returns the recipient's X25519 public key.
    pub fn public_key(&self) -> &X25519PublicKey {
        &self.public_key
    }

    /// Returns the identifier written into this recipient's
    /// session-key record.
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Returns the recipient's address for the envelope `To:` header.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
