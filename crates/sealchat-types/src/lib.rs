//! Core shared types for the Sealchat message sealing engine.
//!
//! This crate defines the identifiers and the central error type used
//! across the workspace. No other crate should define shared types —
//! everything lives here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// User address in `local@network` form, as it appears in envelope
/// headers.
///
/// The engine treats addresses as opaque identifiers: it never parses
/// the local or network part, it only writes them into the canonical
/// envelope. Validation of the address against actual key material is
/// the key provider's job.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Creates a new `Address` from any string-like value.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// KeyId
// ---------------------------------------------------------------------------

/// Stable 8-byte key identifier: the first 8 bytes of
/// SHA3-256(public key bytes).
///
/// Used to tag per-recipient session-key records so a decryptor can
/// locate the record addressed to its own key without trial
/// decryption, and to bind one-pass and trailing signature packets to
/// the same signer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyId([u8; 8]);

impl KeyId {
    /// The fixed byte length of a key identifier.
    pub const LEN: usize = 8;

    /// Creates a new `KeyId` from raw bytes.
    pub fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl From<[u8; 8]> for KeyId {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for KeyId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for KeyId {
    type Err = SealchatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| SealchatError::InvalidEnvelope {
            reason: "invalid hex encoding for key id".into(),
        })?;
        if bytes.len() != 8 {
            return Err(SealchatError::InvalidEnvelope {
                reason: format!("expected 8 bytes for key id, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// UTC timestamp written into the canonical envelope `Date:` header.
///
/// Always rendered in RFC 3339 form with whole-second precision so
/// that building the envelope from identical inputs yields identical
/// bytes regardless of sub-second clock state or timezone.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` representing the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the RFC 3339 rendering used in envelope headers.
    ///
    /// Whole-second precision, `Z` suffix. Deterministic for a given
    /// instant: two timestamps within the same second render
    /// identically only if their inner instants are identical, which
    /// the envelope builder guarantees by reusing one `Timestamp`.
    pub fn to_header_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_string())
    }
}

impl FromStr for Timestamp {
    type Err = SealchatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| SealchatError::InvalidEnvelope {
                reason: format!("invalid RFC 3339 timestamp: {e}"),
            })?
            .with_timezone(&Utc);
        Ok(Self(dt))
    }
}

// ---------------------------------------------------------------------------
// SealchatError
// ---------------------------------------------------------------------------

/// Central error type for the sealing engine.
///
/// This enum is the single security-error kind crossing the engine
/// boundary; callers branch on variants, never on message strings.
/// The variants keep the five failure categories distinguishable:
/// envelope/build errors, cryptographic setup failures, the expected
/// recipient-not-found outcome, integrity failures, and payload-shape
/// errors ([`MalformedPacket`](Self::MalformedPacket),
/// [`SignedOnlyPayload`](Self::SignedOnlyPayload),
/// [`UnsupportedPayload`](Self::UnsupportedPayload)).
#[derive(Debug, Error)]
pub enum SealchatError {
    /// Envelope inputs are malformed (e.g. empty recipient list).
    /// Not expected in normal operation; fail fast, never retried.
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope {
        /// Human-readable description of the build failure.
        reason: String,
    },

    /// A cryptographic operation failed (signing, key derivation,
    /// encryption) or the compression stage aborted. Fatal to the
    /// single call.
    #[error("crypto failure: {reason}")]
    CryptoFailure {
        /// Human-readable description of the cryptographic failure.
        reason: String,
    },

    /// The packet carries no session-key record addressed to the
    /// local decryption key. An expected outcome for a message not
    /// addressed to this identity — recoverable by the caller and
    /// distinct from corruption.
    #[error("no session key record for local key {key_id}")]
    RecipientNotFound {
        /// Identifier of the local decryption key that found no match.
        key_id: KeyId,
    },

    /// The integrity check over decrypted material failed. The
    /// partially decrypted plaintext is discarded, never surfaced.
    #[error("integrity check failed: {reason}")]
    IntegrityFailure {
        /// Human-readable description of what failed verification.
        reason: String,
    },

    /// The packet structure itself could not be parsed (truncated
    /// frame, bad length, wrong record size).
    #[error("malformed packet: {reason}")]
    MalformedPacket {
        /// Human-readable description of the framing problem.
        reason: String,
    },

    /// The decrypted payload contains only signature packets with no
    /// literal data reachable.
    #[error("payload is signed-only, no literal data")]
    SignedOnlyPayload,

    /// The decrypted payload starts with a packet type the extractor
    /// does not recognize as message content.
    #[error("unsupported payload: {reason}")]
    UnsupportedPayload {
        /// Human-readable description of the unexpected packet.
        reason: String,
    },

    /// The operation is part of the declared coder surface but has no
    /// implementation.
    #[error("operation not implemented: {operation}")]
    Unimplemented {
        /// Name of the unimplemented operation.
        operation: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`SealchatError`].
pub type Result<T> = std::result::Result<T, SealchatError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
