//! Ed25519 digital signatures over streamed literal data.
//!
//! Signing uses the prehashed Ed25519ph variant (RFC 8032 §5.1) so the
//! literal data can be fed through a SHA-512 hasher in bounded chunks
//! and never has to be buffered whole for the signature. A fixed
//! domain-separation context binds every signature to the Sealchat
//! literal stream, making it unusable in any other protocol position.
//! The private key is zeroized on drop via `ed25519-dalek`'s built-in
//! `ZeroizeOnDrop`.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sealchat_types::{Result, SealchatError};
use sha2::{Digest, Sha512};

/// Domain-separation context for Ed25519ph over literal data.
///
/// Passed as the Ed25519ph context string on both sign and verify.
const LITERAL_SIGNING_CONTEXT: &[u8] = b"sealchat.literal.v1";

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Fixed byte length of an Ed25519 public key.
    pub const LEN: usize = 32;

    /// Creates a [`PublicKey`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Fixed byte length of an Ed25519 signature.
    pub const LEN: usize = 64;

    /// Creates a [`Signature`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 64-byte array.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// Ed25519 signing keypair.
///
/// Wraps an `ed25519-dalek` [`SigningKey`]. The engine only ever
/// borrows a keypair for the duration of one pipeline run; it is
/// owned by the caller's key provider.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a new random keypair using OS-level entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Reconstructs a keypair deterministically from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Returns the public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }
}

// Keypair intentionally does not implement Clone or Debug to prevent
// accidental leakage of the private key in logs or copies.

// ---------------------------------------------------------------------------
// StreamingSigner
// ---------------------------------------------------------------------------

/// Incremental signer over literal data.
///
/// Feed the exact literal bytes through [`update`](Self::update) in
/// any chunking, then call [`finalize`](Self::finalize) to produce
/// the trailing signature. The bytes hashed here must match the bytes
/// between the one-pass marker and the trailing signature packet —
/// any byte outside that bracket invalidates verification.
pub struct StreamingSigner {
    hasher: Sha512,
}

impl StreamingSigner {
    /// Starts a new signing run.
    pub fn new() -> Self {
        Self {
            hasher: Sha512::new(),
        }
    }

    /// Absorbs one chunk of literal data.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Produces the Ed25519ph signature over everything absorbed.
    ///
    /// # Errors
    ///
    /// [`SealchatError::CryptoFailure`] if the underlying signing
    /// operation fails; no partial signature is ever emitted.
    pub fn finalize(self, keypair: &Keypair) -> Result<Signature> {
        let sig = keypair
            .signing_key
            .sign_prehashed(self.hasher, Some(LITERAL_SIGNING_CONTEXT))
            .map_err(|e| SealchatError::CryptoFailure {
                reason: format!("Ed25519ph signing failed: {e}"),
            })?;
        Ok(Signature(sig.to_bytes()))
    }
}

impl Default for StreamingSigner {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// StreamingVerifier
// ---------------------------------------------------------------------------

/// Incremental verifier, the read-side counterpart of
/// [`StreamingSigner`].
pub struct StreamingVerifier {
    hasher: Sha512,
}

impl StreamingVerifier {
    /// Starts a new verification run.
    pub fn new() -> Self {
        Self {
            hasher: Sha512::new(),
        }
    }

    /// Absorbs one chunk of literal data.
    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    /// Checks the signature against everything absorbed.
    ///
    /// # Errors
    ///
    /// [`SealchatError::CryptoFailure`] if the public key is invalid,
    /// [`SealchatError::IntegrityFailure`] if the signature does not
    /// verify.
    pub fn finalize(self, public_key: &PublicKey, signature: &Signature) -> Result<()> {
        let vk = VerifyingKey::from_bytes(&public_key.0).map_err(|e| {
            SealchatError::CryptoFailure {
                reason: format!("invalid public key: {e}"),
            }
        })?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify_prehashed(self.hasher, Some(LITERAL_SIGNING_CONTEXT), &sig)
            .map_err(|_| SealchatError::IntegrityFailure {
                reason: "literal signature verification failed".into(),
            })
    }
}

impl Default for StreamingVerifier {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
