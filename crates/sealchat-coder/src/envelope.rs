//! Canonical plaintext envelope.
//!
//! Before signing and sealing, every message is wrapped in a fixed
//! UTF-8 header layout so that the signed bytes carry the claimed
//! sender, the full recipient list, and the send time:
//!
//! ```text
//! From: alice@example.net
//! To: bob@example.net; carol@example.net
//! Date: 2026-08-29T12:00:00Z
//!
//! <body bytes>
//! ```
//!
//! Serialization is deterministic: identical inputs always produce
//! byte-identical output. There is no encoding negotiation (UTF-8
//! fixed), no randomness, and no failure mode.

use sealchat_types::{Address, Timestamp};

/// Separator between recipient addresses in the `To:` header.
const RECIPIENT_SEPARATOR: &str = "; ";

/// The canonical plaintext envelope that gets signed and sealed.
///
/// Transient: built immediately before a pipeline run and dropped when
/// the run completes.
#[derive(Clone, Debug)]
pub struct CanonicalEnvelope {
    sender: Address,
    recipients: Vec<Address>,
    timestamp: Timestamp,
    body: Vec<u8>,
}

impl CanonicalEnvelope {
    /// Assembles an envelope. Recipient order is preserved exactly as
    /// supplied.
    pub fn new(
        sender: Address,
        recipients: Vec<Address>,
        timestamp: Timestamp,
        body: Vec<u8>,
    ) -> Self {
        Self {
            sender,
            recipients,
            timestamp,
            body,
        }
    }

    /// Serializes the envelope into its canonical byte form.
    ///
    /// Pure function of the envelope fields; calling it twice yields
    /// byte-identical output.
    pub fn to_bytes(&self) -> Vec<u8> {
        let to_header = self
            .recipients
            .iter()
            .map(Address::as_str)
            .collect::<Vec<_>>()
            .join(RECIPIENT_SEPARATOR);
        let date_header = self.timestamp.to_header_string();

        let mut out = Vec::with_capacity(
            self.sender.as_str().len() + to_header.len() + date_header.len() + self.body.len() + 32,
        );
        out.extend_from_slice(b"From: ");
        out.extend_from_slice(self.sender.as_str().as_bytes());
        out.extend_from_slice(b"\nTo: ");
        out.extend_from_slice(to_header.as_bytes());
        out.extend_from_slice(b"\nDate: ");
        out.extend_from_slice(date_header.as_bytes());
        out.extend_from_slice(b"\n\n");
        out.extend_from_slice(&self.body);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
