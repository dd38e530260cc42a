//! Multi-recipient sealing and opening.
//!
//! One fresh session key encrypts the body; the session key itself is
//! wrapped independently for every recipient behind an ephemeral
//! X25519 agreement, so any single recipient's private key opens the
//! packet without a shared secret between recipients. All session-key
//! records are written before the body, letting a decryptor scan them
//! without buffering the body.

use sealchat_crypto::aead::{aead_open, aead_seal, AeadNonce, SymmetricKey};
use sealchat_crypto::ecdh::X25519EphemeralSecret;
use sealchat_crypto::hkdf::derive_wrap_key;
use sealchat_crypto::keys::{PersonalKey, RecipientKey};
use sealchat_types::{Result, SealchatError};

use crate::packet::{
    write_packet, EncryptedBody, PacketReader, SessionKeyRecord, TAG_ENCRYPTED_BODY,
    TAG_SESSION_KEY_RECORD,
};

/// Seals `payload` (the compressed signed-literal stream) for a
/// non-empty set of recipients.
///
/// Generates a fresh 256-bit session key from OS entropy, wraps it
/// once per recipient, and encrypts the body under it with
/// XChaCha20-Poly1305. Recipient order in the packet follows the
/// supplied list; no deduplication is performed.
///
/// # Errors
///
/// - [`SealchatError::InvalidEnvelope`] if `recipients` is empty —
///   sealing to nobody would produce a packet nobody can read.
/// - [`SealchatError::CryptoFailure`] on any key-derivation or
///   encryption failure.
pub fn seal_for_recipients(payload: &[u8], recipients: &[RecipientKey]) -> Result<Vec<u8>> {
    if recipients.is_empty() {
        return Err(SealchatError::InvalidEnvelope {
            reason: "recipient list is empty".into(),
        });
    }

    let session_key = SymmetricKey::generate();
    let mut out = Vec::new();

    for recipient in recipients {
        let ephemeral = X25519EphemeralSecret::generate();
        let ephemeral_public = ephemeral.public_key();
        let shared = ephemeral.diffie_hellman(recipient.public_key());
        let wrap_key = derive_wrap_key(&shared, &ephemeral_public, recipient.public_key())?;

        let nonce = AeadNonce::generate();
        let wrapped = aead_seal(&wrap_key, &nonce, session_key.as_bytes(), &[])?;
        let wrapped_key: [u8; 48] =
            wrapped
                .try_into()
                .map_err(|_| SealchatError::CryptoFailure {
                    reason: "wrapped session key has unexpected length".into(),
                })?;

        let record = SessionKeyRecord {
            key_id: recipient.key_id(),
            ephemeral_public,
            nonce,
            wrapped_key,
        };
        write_packet(&mut out, TAG_SESSION_KEY_RECORD, &record.encode())?;
    }

    let body_nonce = AeadNonce::generate();
    let ciphertext = aead_seal(&session_key, &body_nonce, payload, &[])?;
    let body = EncryptedBody {
        nonce: body_nonce,
        ciphertext,
    };
    write_packet(&mut out, TAG_ENCRYPTED_BODY, &body.encode())?;
    Ok(out)
}

/// Opens a sealed packet with the local personal key.
///
/// Scans the session-key records for one tagged with the local
/// decryption key's id; the first match wins. The session key is
/// unwrapped and the body decrypted and tag-verified under it.
///
/// # Errors
///
/// - [`SealchatError::RecipientNotFound`] if no record matches —
///   the expected outcome for a message addressed to someone else,
///   distinct from corruption.
/// - [`SealchatError::IntegrityFailure`] if unwrapping or the body
///   tag check fails; no partial plaintext is returned.
/// - [`SealchatError::MalformedPacket`] on framing errors or a
///   missing body.
pub fn open_packet(packet: &[u8], key: &PersonalKey) -> Result<Vec<u8>> {
    let local_id = key.decryption_key_id();

    let mut reader = PacketReader::new(packet);
    let mut matched: Option<SessionKeyRecord> = None;
    let mut body: Option<EncryptedBody> = None;

    while let Some(raw) = reader.next()? {
        match raw.tag {
            TAG_SESSION_KEY_RECORD => {
                let record = SessionKeyRecord::decode(raw.payload)?;
                if matched.is_none() && record.key_id == local_id {
                    matched = Some(record);
                }
            }
            TAG_ENCRYPTED_BODY => {
                body = Some(EncryptedBody::decode(raw.payload)?);
                break;
            }
            other => {
                return Err(SealchatError::MalformedPacket {
                    reason: format!("unexpected packet tag 0x{other:02x} in sealed packet"),
                })
            }
        }
    }

    let body = body.ok_or_else(|| SealchatError::MalformedPacket {
        reason: "sealed packet has no encrypted body".into(),
    })?;
    let record = matched.ok_or(SealchatError::RecipientNotFound { key_id: local_id })?;

    let shared = key.decryption_secret().diffie_hellman(&record.ephemeral_public);
    let wrap_key = derive_wrap_key(&shared, &record.ephemeral_public, &key.decryption_public())?;

    let session_bytes = aead_open(&wrap_key, &record.nonce, &record.wrapped_key, &[])?;
    let session_key = SymmetricKey::from_slice(&session_bytes)?;

    aead_open(&session_key, &body.nonce, &body.ciphertext, &[])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use sealchat_types::Address;

    fn personal(seed: u8, local: &str) -> PersonalKey {
        PersonalKey::new(
            sealchat_crypto::signing::Keypair::from_seed(&[seed; 32]),
            sealchat_crypto::ecdh::X25519StaticSecret::from_bytes([seed.wrapping_add(1); 32]),
            local,
        )
    }

    fn recipient_of(key: &PersonalKey, addr: &str) -> RecipientKey {
        RecipientKey::new(key.decryption_public(), Address::new(addr))
    }

    #[test]
    fn seal_open_roundtrip() -> Result<()> {
        let bob = personal(0x10, "bob");
        let packet = seal_for_recipients(b"payload", &[recipient_of(&bob, "bob@n")])?;
        assert_eq!(open_packet(&packet, &bob)?, b"payload");
        Ok(())
    }

    #[test]
    fn both_recipients_open_independently() -> Result<()> {
        let bob = personal(0x20, "bob");
        let carol = personal(0x30, "carol");
        let recipients = [recipient_of(&bob, "bob@n"), recipient_of(&carol, "carol@n")];

        let packet = seal_for_recipients(b"shared payload", &recipients)?;
        assert_eq!(open_packet(&packet, &bob)?, b"shared payload");
        assert_eq!(open_packet(&packet, &carol)?, b"shared payload");
        Ok(())
    }

    #[test]
    fn non_recipient_gets_recipient_not_found() -> Result<()> {
        let bob = personal(0x40, "bob");
        let mallory = personal(0x50, "mallory");

        let packet = seal_for_recipients(b"secret", &[recipient_of(&bob, "bob@n")])?;
        let result = open_packet(&packet, &mallory);
        assert!(matches!(
            result,
            Err(SealchatError::RecipientNotFound { key_id }) if key_id == mallory.decryption_key_id()
        ));
        Ok(())
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        assert!(matches!(
            seal_for_recipients(b"payload", &[]),
            Err(SealchatError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn tampered_body_is_integrity_failure() -> Result<()> {
        let bob = personal(0x60, "bob");
        let mut packet = seal_for_recipients(b"payload", &[recipient_of(&bob, "bob@n")])?;

        // Flip the final ciphertext byte inside the body packet.
        let last = packet.len() - 1;
        packet[last] ^= 0x01;

        assert!(matches!(
            open_packet(&packet, &bob),
            Err(SealchatError::IntegrityFailure { .. })
        ));
        Ok(())
    }

    #[test]
    fn duplicate_recipient_uses_first_record() -> Result<()> {
        // Same key listed twice: both records carry the same id; the
        // scan takes the first and must still open cleanly.
        let bob = personal(0x70, "bob");
        let recipients = [recipient_of(&bob, "bob@n"), recipient_of(&bob, "bob@n")];

        let packet = seal_for_recipients(b"payload", &recipients)?;
        assert_eq!(open_packet(&packet, &bob)?, b"payload");
        Ok(())
    }

    #[test]
    fn truncated_packet_without_body_is_malformed() -> Result<()> {
        let bob = personal(0x80, "bob");
        let packet = seal_for_recipients(b"payload", &[recipient_of(&bob, "bob@n")])?;

        // Keep only the first packet (the session-key record).
        let record_frame_len = 5 + crate::packet::SessionKeyRecord::LEN;
        let truncated = &packet[..record_frame_len];

        assert!(matches!(
            open_packet(truncated, &bob),
            Err(SealchatError::MalformedPacket { .. })
        ));
        Ok(())
    }

    #[test]
    fn sealing_twice_differs_but_both_open() -> Result<()> {
        let bob = personal(0x90, "bob");
        let recipients = [recipient_of(&bob, "bob@n")];

        let a = seal_for_recipients(b"payload", &recipients)?;
        let b = seal_for_recipients(b"payload", &recipients)?;
        assert_ne!(a, b); // fresh session key and nonces every call

        assert_eq!(open_packet(&a, &bob)?, b"payload");
        assert_eq!(open_packet(&b, &bob)?, b"payload");
        Ok(())
    }
}
