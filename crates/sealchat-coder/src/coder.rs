//! The polymorphic coder surface.
//!
//! "A way to secure a message" is a capability, not a concrete type:
//! callers hold a `dyn` [`Coder`] selected per conversation via
//! [`SecurityMode`] and never inspect which implementation they got.
//! Two modes exist: [`SealedCoder`] runs the full
//! sign → compress → seal pipeline, [`PlainCoder`] sends the canonical
//! envelope in the clear.
//!
//! The stream-wrapping and length-estimation operations are part of
//! the declared surface but have no implementation; they return
//! [`SealchatError::Unimplemented`] rather than guessing at a
//! streaming-cipher design.

use std::io::{Read, Write};

use sealchat_crypto::keys::{PersonalKey, RecipientKey};
use sealchat_types::{Result, SealchatError, Timestamp};
use tracing::debug;

use crate::compress::{compress, decompress};
use crate::envelope::CanonicalEnvelope;
use crate::literal::{read_literal, write_signed_literal};
use crate::seal::{open_packet, seal_for_recipients};

// ---------------------------------------------------------------------------
// Coder trait
// ---------------------------------------------------------------------------

/// One message-securing capability.
///
/// Both directions are synchronous blocking calls with no internal
/// threading or retries; each call is independent and reentrant given
/// independent key material.
pub trait Coder {
    /// Builds the canonical envelope for `text` (sender, recipients,
    /// current time) and secures it.
    fn encrypt_text(&self, text: &str) -> Result<Vec<u8>>;

    /// Secures already-built canonical envelope bytes.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Reverses [`encrypt`](Self::encrypt), returning the canonical
    /// envelope bytes.
    fn decrypt(&self, packet: &[u8]) -> Result<Vec<u8>>;

    /// Wraps a raw input stream for on-the-fly decryption.
    ///
    /// Declared but unimplemented in every current mode.
    fn wrap_input_stream<'a>(&self, _input: Box<dyn Read + 'a>) -> Result<Box<dyn Read + 'a>> {
        Err(SealchatError::Unimplemented {
            operation: "wrap_input_stream",
        })
    }

    /// Wraps a raw output stream for on-the-fly encryption.
    ///
    /// Declared but unimplemented in every current mode.
    fn wrap_output_stream<'a>(&self, _output: Box<dyn Write + 'a>) -> Result<Box<dyn Write + 'a>> {
        Err(SealchatError::Unimplemented {
            operation: "wrap_output_stream",
        })
    }

    /// Estimates the encrypted length for a given decrypted length.
    ///
    /// Declared but unimplemented in every current mode.
    fn encrypted_len(&self, _decrypted_len: u64) -> Result<u64> {
        Err(SealchatError::Unimplemented {
            operation: "encrypted_len",
        })
    }
}

// ---------------------------------------------------------------------------
// SecurityMode
// ---------------------------------------------------------------------------

/// Which coder implementation a conversation uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecurityMode {
    /// Canonical envelope in the clear; no signing, no encryption.
    Cleartext,
    /// Full sign → compress → multi-recipient seal pipeline.
    Sealed,
}

/// Returns the coder for `mode`, borrowing the caller's key material
/// for the coder's lifetime.
pub fn coder_for_mode<'a>(
    mode: SecurityMode,
    key: &'a PersonalKey,
    recipients: &'a [RecipientKey],
    network: &str,
) -> Box<dyn Coder + 'a> {
    match mode {
        SecurityMode::Cleartext => Box::new(PlainCoder::new(key, recipients, network)),
        SecurityMode::Sealed => Box::new(SealedCoder::new(key, recipients, network)),
    }
}

fn build_envelope(
    key: &PersonalKey,
    recipients: &[RecipientKey],
    network: &str,
    text: &str,
) -> Vec<u8> {
    let to = recipients.iter().map(|r| r.address().clone()).collect();
    CanonicalEnvelope::new(
        key.user_id(network),
        to,
        Timestamp::now(),
        text.as_bytes().to_vec(),
    )
    .to_bytes()
}

// ---------------------------------------------------------------------------
// SealedCoder
// ---------------------------------------------------------------------------

/// The encrypting coder: signs, compresses, and seals for every
/// recipient.
///
/// Borrows the personal key and recipient list per operation — the
/// coder never copies, mutates, or outlives the caller's key
/// material.
pub struct SealedCoder<'a> {
    key: &'a PersonalKey,
    recipients: &'a [RecipientKey],
    network: String,
}

impl<'a> SealedCoder<'a> {
    /// Creates a sealed coder for one sender/recipient-set pairing.
    pub fn new(key: &'a PersonalKey, recipients: &'a [RecipientKey], network: &str) -> Self {
        Self {
            key,
            recipients,
            network: network.to_owned(),
        }
    }
}

impl Coder for SealedCoder<'_> {
    fn encrypt_text(&self, text: &str) -> Result<Vec<u8>> {
        let envelope = build_envelope(self.key, self.recipients, &self.network, text);
        self.encrypt(&envelope)
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let signed = write_signed_literal(plaintext, self.key.signing_keypair())?;
        let compressed = compress(&signed)?;
        let packet = seal_for_recipients(&compressed, self.recipients)?;
        debug!(
            recipients = self.recipients.len(),
            plaintext_len = plaintext.len(),
            packet_len = packet.len(),
            "sealed message"
        );
        Ok(packet)
    }

    fn decrypt(&self, packet: &[u8]) -> Result<Vec<u8>> {
        let compressed = open_packet(packet, self.key)?;
        let stream = decompress(&compressed)?;
        let literal = read_literal(&stream)?;
        debug!(
            packet_len = packet.len(),
            plaintext_len = literal.len(),
            "opened sealed message"
        );
        Ok(literal)
    }
}

// ---------------------------------------------------------------------------
// PlainCoder
// ---------------------------------------------------------------------------

/// The cleartext coder: envelope bytes pass through untouched in both
/// directions.
pub struct PlainCoder<'a> {
    key: &'a PersonalKey,
    recipients: &'a [RecipientKey],
    network: String,
}

impl<'a> PlainCoder<'a> {
    /// Creates a cleartext coder for one sender/recipient-set pairing.
    pub fn new(key: &'a PersonalKey, recipients: &'a [RecipientKey], network: &str) -> Self {
        Self {
            key,
            recipients,
            network: network.to_owned(),
        }
    }
}

impl Coder for PlainCoder<'_> {
    fn encrypt_text(&self, text: &str) -> Result<Vec<u8>> {
        Ok(build_envelope(self.key, self.recipients, &self.network, text))
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, packet: &[u8]) -> Result<Vec<u8>> {
        Ok(packet.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
