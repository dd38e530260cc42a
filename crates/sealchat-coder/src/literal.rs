//! Signed literal stream: one-pass bracket and literal extraction.
//!
//! The write side brackets the canonical envelope bytes between a
//! one-pass signature marker and a trailing Ed25519ph signature over
//! exactly those bytes. The read side extracts the literal data with
//! three possible outcomes: literal found, signed-only stream, or an
//! unrecognized payload.
//!
//! Signature *verification* is a capability this module exposes
//! ([`verify_literal_signature`]) but the decrypt pipeline does not
//! invoke it — transport integrity is enforced by the body AEAD, and
//! checking the claimed sender's signature is left to the caller.

use sealchat_crypto::hash::derive_key_id;
use sealchat_crypto::signing::{Keypair, PublicKey, StreamingSigner, StreamingVerifier};
use sealchat_types::{Result, SealchatError};

use crate::packet::{
    write_packet, OnePassSignature, PacketReader, TrailingSignature, ALGO_ED25519PH, HASH_SHA512,
    TAG_LITERAL_DATA, TAG_ONE_PASS_SIGNATURE, TAG_SIGNATURE,
};
use crate::CHUNK_SIZE;

/// Wraps plaintext in a one-pass signature bracket.
///
/// Output stream: one-pass marker ‖ literal data ‖ trailing
/// signature, all referencing the signer's key id. The literal bytes
/// are hashed in [`CHUNK_SIZE`] chunks; nothing is emitted if signing
/// fails.
pub fn write_signed_literal(plaintext: &[u8], signer: &Keypair) -> Result<Vec<u8>> {
    let key_id = derive_key_id(signer.public_key().as_bytes());

    let mut hasher = StreamingSigner::new();
    for chunk in plaintext.chunks(CHUNK_SIZE) {
        hasher.update(chunk);
    }
    let signature = hasher.finalize(signer)?;

    let marker = OnePassSignature {
        signature_algorithm: ALGO_ED25519PH,
        hash_algorithm: HASH_SHA512,
        key_id,
    };
    let trailing = TrailingSignature { key_id, signature };

    let mut out = Vec::with_capacity(plaintext.len() + 128);
    write_packet(&mut out, TAG_ONE_PASS_SIGNATURE, &marker.encode())?;
    write_packet(&mut out, TAG_LITERAL_DATA, plaintext)?;
    write_packet(&mut out, TAG_SIGNATURE, &trailing.encode())?;
    Ok(out)
}

/// Extracts the literal data from a decrypted, decompressed stream.
///
/// Exactly one of three outcomes, decided in a single pass:
///
/// - literal data reached (one-pass markers before it are skipped) →
///   the raw envelope bytes;
/// - the stream holds one-pass markers but no literal →
///   [`SealchatError::SignedOnlyPayload`];
/// - the first non-marker packet is anything else →
///   [`SealchatError::UnsupportedPayload`].
pub fn read_literal(stream: &[u8]) -> Result<Vec<u8>> {
    let mut reader = PacketReader::new(stream);
    let mut saw_one_pass = false;

    while let Some(raw) = reader.next()? {
        match raw.tag {
            TAG_LITERAL_DATA => return Ok(raw.payload.to_vec()),
            TAG_ONE_PASS_SIGNATURE => {
                saw_one_pass = true;
            }
            other => {
                return Err(SealchatError::UnsupportedPayload {
                    reason: format!("unexpected packet tag 0x{other:02x} before literal data"),
                })
            }
        }
    }

    if saw_one_pass {
        Err(SealchatError::SignedOnlyPayload)
    } else {
        Err(SealchatError::MalformedPacket {
            reason: "stream contains no packets".into(),
        })
    }
}

/// Verifies the trailing signature of a signed literal stream against
/// the claimed signer's public key.
///
/// Checks that the one-pass marker and the trailing signature carry
/// the same key id (the bracket invariant) and that the signature
/// covers exactly the literal bytes between them.
///
/// # Errors
///
/// - [`SealchatError::MalformedPacket`] if the stream is not a
///   well-formed `one-pass ‖ literal ‖ signature` sequence or the
///   bracket key ids disagree.
/// - [`SealchatError::UnsupportedPayload`] on unknown algorithm tags.
/// - [`SealchatError::IntegrityFailure`] if the signature does not
///   verify.
pub fn verify_literal_signature(stream: &[u8], signer_public: &PublicKey) -> Result<()> {
    let mut reader = PacketReader::new(stream);

    let marker = match reader.next()? {
        Some(raw) if raw.tag == TAG_ONE_PASS_SIGNATURE => OnePassSignature::decode(raw.payload)?,
        _ => {
            return Err(SealchatError::MalformedPacket {
                reason: "stream does not start with a one-pass signature".into(),
            })
        }
    };
    if marker.signature_algorithm != ALGO_ED25519PH || marker.hash_algorithm != HASH_SHA512 {
        return Err(SealchatError::UnsupportedPayload {
            reason: format!(
                "unknown algorithm tags: sig 0x{:02x}, hash 0x{:02x}",
                marker.signature_algorithm, marker.hash_algorithm
            ),
        });
    }

    let literal = match reader.next()? {
        Some(raw) if raw.tag == TAG_LITERAL_DATA => raw.payload,
        _ => {
            return Err(SealchatError::MalformedPacket {
                reason: "one-pass signature is not followed by literal data".into(),
            })
        }
    };

    let trailing = match reader.next()? {
        Some(raw) if raw.tag == TAG_SIGNATURE => TrailingSignature::decode(raw.payload)?,
        _ => {
            return Err(SealchatError::MalformedPacket {
                reason: "literal data is not closed by a trailing signature".into(),
            })
        }
    };
    if trailing.key_id != marker.key_id {
        return Err(SealchatError::MalformedPacket {
            reason: format!(
                "signature bracket mismatch: one-pass key {} vs trailing key {}",
                marker.key_id, trailing.key_id
            ),
        });
    }

    let mut verifier = StreamingVerifier::new();
    for chunk in literal.chunks(CHUNK_SIZE) {
        verifier.update(chunk);
    }
    verifier.finalize(signer_public, &trailing.signature)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_recovers_plaintext() -> Result<()> {
        let signer = Keypair::from_seed(&[0x01; 32]);
        let stream = write_signed_literal(b"canonical envelope bytes", &signer)?;
        assert_eq!(read_literal(&stream)?, b"canonical envelope bytes");
        Ok(())
    }

    #[test]
    fn signature_verifies_for_signer() -> Result<()> {
        let signer = Keypair::from_seed(&[0x02; 32]);
        let stream = write_signed_literal(b"message", &signer)?;
        verify_literal_signature(&stream, &signer.public_key())
    }

    #[test]
    fn signature_rejects_other_key() -> Result<()> {
        let signer = Keypair::from_seed(&[0x03; 32]);
        let other = Keypair::from_seed(&[0x04; 32]);
        let stream = write_signed_literal(b"message", &signer)?;
        assert!(verify_literal_signature(&stream, &other.public_key()).is_err());
        Ok(())
    }

    #[test]
    fn byte_inserted_into_literal_breaks_bracket() -> Result<()> {
        let signer = Keypair::from_seed(&[0x05; 32]);
        let stream = write_signed_literal(b"abc", &signer)?;

        // Rebuild the stream with one extra literal byte but the old
        // signature packets.
        let mut reader = PacketReader::new(&stream);
        let marker = reader.next()?.expect("marker").payload.to_vec();
        let _literal = reader.next()?.expect("literal");
        let trailing = reader.next()?.expect("trailing").payload.to_vec();

        let mut forged = Vec::new();
        write_packet(&mut forged, TAG_ONE_PASS_SIGNATURE, &marker)?;
        write_packet(&mut forged, TAG_LITERAL_DATA, b"abcX")?;
        write_packet(&mut forged, TAG_SIGNATURE, &trailing)?;

        assert!(matches!(
            verify_literal_signature(&forged, &signer.public_key()),
            Err(SealchatError::IntegrityFailure { .. })
        ));
        Ok(())
    }

    #[test]
    fn signed_only_stream_is_rejected() -> Result<()> {
        let marker = OnePassSignature {
            signature_algorithm: ALGO_ED25519PH,
            hash_algorithm: HASH_SHA512,
            key_id: sealchat_types::KeyId::new([0x06; 8]),
        };
        let mut stream = Vec::new();
        write_packet(&mut stream, TAG_ONE_PASS_SIGNATURE, &marker.encode())?;

        assert!(matches!(
            read_literal(&stream),
            Err(SealchatError::SignedOnlyPayload)
        ));
        Ok(())
    }

    #[test]
    fn unknown_leading_packet_is_unsupported() -> Result<()> {
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x7F, b"???")?;

        assert!(matches!(
            read_literal(&stream),
            Err(SealchatError::UnsupportedPayload { .. })
        ));
        Ok(())
    }

    #[test]
    fn empty_stream_is_malformed() {
        assert!(matches!(
            read_literal(&[]),
            Err(SealchatError::MalformedPacket { .. })
        ));
    }

    #[test]
    fn empty_plaintext_roundtrips() -> Result<()> {
        let signer = Keypair::from_seed(&[0x07; 32]);
        let stream = write_signed_literal(b"", &signer)?;
        assert!(read_literal(&stream)?.is_empty());
        verify_literal_signature(&stream, &signer.public_key())
    }
}
