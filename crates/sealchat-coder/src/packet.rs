//! Binary packet framing for sealed messages.
//!
//! Every structure crossing the engine boundary is a flat sequence of
//! packets, each framed as `tag (1 byte) ‖ length (u32 big-endian) ‖
//! payload`. Two packet sequences exist:
//!
//! - the **encrypted packet**: one session-key record per recipient,
//!   written *before* the single encrypted body so a decryptor can
//!   scan records without buffering the body;
//! - the **signed literal stream** (inside the encrypted body, after
//!   decompression): one-pass signature marker, literal data,
//!   trailing signature.
//!
//! All fixed-width payload fields are laid out at fixed offsets; a
//! wrong payload size is a framing error, never a panic.

use sealchat_crypto::aead::AeadNonce;
use sealchat_crypto::ecdh::X25519PublicKey;
use sealchat_crypto::signing::Signature;
use sealchat_types::{KeyId, Result, SealchatError};

// ---------------------------------------------------------------------------
// Packet tags
// ---------------------------------------------------------------------------

/// One encrypted-session-key record addressed to a single recipient.
pub const TAG_SESSION_KEY_RECORD: u8 = 0x01;
/// The symmetrically encrypted, integrity-protected body.
pub const TAG_ENCRYPTED_BODY: u8 = 0x02;
/// One-pass signature marker preceding literal data.
pub const TAG_ONE_PASS_SIGNATURE: u8 = 0x03;
/// Raw literal data (the canonical envelope bytes).
pub const TAG_LITERAL_DATA: u8 = 0x04;
/// Trailing full signature closing a one-pass bracket.
pub const TAG_SIGNATURE: u8 = 0x05;

/// Signature algorithm tag: Ed25519ph (RFC 8032 §5.1).
pub const ALGO_ED25519PH: u8 = 0x01;
/// Hash algorithm tag: SHA-512.
pub const HASH_SHA512: u8 = 0x01;

/// Wrapped session key length: 32-byte key + 16-byte Poly1305 tag.
pub const WRAPPED_KEY_LEN: usize = 48;

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Appends one framed packet to `out`.
///
/// # Errors
///
/// [`SealchatError::MalformedPacket`] if `payload` does not fit the
/// u32 length field; the frame is never emitted with a wrapped
/// length.
pub fn write_packet(out: &mut Vec<u8>, tag: u8, payload: &[u8]) -> Result<()> {
    let len = frame_len(payload.len())?;
    out.push(tag);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(())
}

/// Encodes a payload length into the 4-byte frame length field.
fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SealchatError::MalformedPacket {
        reason: format!("payload length {len} exceeds the frame length field"),
    })
}

/// A raw packet view into the input buffer.
#[derive(Debug)]
pub struct RawPacket<'a> {
    /// Packet type tag.
    pub tag: u8,
    /// Packet payload bytes.
    pub payload: &'a [u8],
}

/// Sequential reader over a packet sequence.
pub struct PacketReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    /// Creates a reader over the full input buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the next packet, `None` at end of input.
    ///
    /// # Errors
    ///
    /// [`SealchatError::MalformedPacket`] on a truncated header or a
    /// length running past the end of the buffer.
    pub fn next(&mut self) -> Result<Option<RawPacket<'a>>> {
        if self.pos == self.buf.len() {
            return Ok(None);
        }
        let remaining = &self.buf[self.pos..];
        if remaining.len() < 5 {
            return Err(SealchatError::MalformedPacket {
                reason: format!("truncated packet header: {} bytes left", remaining.len()),
            });
        }

        let tag = remaining[0];
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&remaining[1..5]);
        let len = u32::from_be_bytes(len_bytes) as usize;

        if remaining.len() - 5 < len {
            return Err(SealchatError::MalformedPacket {
                reason: format!(
                    "packet length {len} exceeds remaining {} bytes",
                    remaining.len() - 5
                ),
            });
        }

        let payload = &remaining[5..5 + len];
        self.pos += 5 + len;
        Ok(Some(RawPacket { tag, payload }))
    }
}

// ---------------------------------------------------------------------------
// SessionKeyRecord
// ---------------------------------------------------------------------------

/// The session key, wrapped for exactly one recipient.
///
/// Fixed 112-byte payload layout:
/// `key_id (8) ‖ ephemeral_public (32) ‖ nonce (24) ‖ wrapped_key (48)`.
pub struct SessionKeyRecord {
    /// Identifier of the recipient's encryption public key.
    pub key_id: KeyId,
    /// Sender-generated ephemeral X25519 public key for this record.
    pub ephemeral_public: X25519PublicKey,
    /// AEAD nonce used when wrapping the session key.
    pub nonce: AeadNonce,
    /// Session key encrypted under the HKDF-derived wrap key.
    pub wrapped_key: [u8; WRAPPED_KEY_LEN],
}

impl SessionKeyRecord {
    /// Total payload length of an encoded record.
    pub const LEN: usize = KeyId::LEN + X25519PublicKey::LEN + AeadNonce::LEN + WRAPPED_KEY_LEN;

    /// Encodes the record payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(self.key_id.as_bytes());
        out.extend_from_slice(self.ephemeral_public.as_bytes());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.wrapped_key);
        out
    }

    /// Decodes a record payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::LEN {
            return Err(SealchatError::MalformedPacket {
                reason: format!(
                    "session key record is {} bytes, expected {}",
                    payload.len(),
                    Self::LEN
                ),
            });
        }

        let mut key_id = [0u8; 8];
        key_id.copy_from_slice(&payload[..8]);
        let mut ephemeral = [0u8; 32];
        ephemeral.copy_from_slice(&payload[8..40]);
        let mut nonce = [0u8; 24];
        nonce.copy_from_slice(&payload[40..64]);
        let mut wrapped_key = [0u8; WRAPPED_KEY_LEN];
        wrapped_key.copy_from_slice(&payload[64..]);

        Ok(Self {
            key_id: KeyId::new(key_id),
            ephemeral_public: X25519PublicKey::from_bytes(ephemeral),
            nonce: AeadNonce::from_bytes(nonce),
            wrapped_key,
        })
    }
}

// ---------------------------------------------------------------------------
// EncryptedBody
// ---------------------------------------------------------------------------

/// The compressed signed-literal stream, encrypted under the session
/// key. Payload layout: `nonce (24) ‖ ciphertext (variable, includes
/// the Poly1305 tag)`.
pub struct EncryptedBody {
    /// AEAD nonce for the body encryption.
    pub nonce: AeadNonce,
    /// Body ciphertext with appended integrity tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedBody {
    /// Encodes the body payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(AeadNonce::LEN + self.ciphertext.len());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Decodes a body payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        // 16-byte tag minimum even for an empty plaintext.
        if payload.len() < AeadNonce::LEN + 16 {
            return Err(SealchatError::MalformedPacket {
                reason: format!("encrypted body is {} bytes, too short", payload.len()),
            });
        }
        let mut nonce = [0u8; 24];
        nonce.copy_from_slice(&payload[..24]);
        Ok(Self {
            nonce: AeadNonce::from_bytes(nonce),
            ciphertext: payload[24..].to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// OnePassSignature
// ---------------------------------------------------------------------------

/// One-pass signature marker written before literal data.
///
/// Carries the algorithm tags and the signer key id as unhashed
/// attributes — the signature itself covers only the literal bytes
/// bracketed between this marker and the trailing signature. Payload
/// layout: `signature_algorithm (1) ‖ hash_algorithm (1) ‖ key_id (8)`.
pub struct OnePassSignature {
    /// Signature algorithm tag ([`ALGO_ED25519PH`]).
    pub signature_algorithm: u8,
    /// Hash algorithm tag ([`HASH_SHA512`]).
    pub hash_algorithm: u8,
    /// Identifier of the signer's public key.
    pub key_id: KeyId,
}

impl OnePassSignature {
    /// Total payload length of an encoded marker.
    pub const LEN: usize = 2 + KeyId::LEN;

    /// Encodes the marker payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.push(self.signature_algorithm);
        out.push(self.hash_algorithm);
        out.extend_from_slice(self.key_id.as_bytes());
        out
    }

    /// Decodes a marker payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::LEN {
            return Err(SealchatError::MalformedPacket {
                reason: format!(
                    "one-pass signature is {} bytes, expected {}",
                    payload.len(),
                    Self::LEN
                ),
            });
        }
        let mut key_id = [0u8; 8];
        key_id.copy_from_slice(&payload[2..]);
        Ok(Self {
            signature_algorithm: payload[0],
            hash_algorithm: payload[1],
            key_id: KeyId::new(key_id),
        })
    }
}

// ---------------------------------------------------------------------------
// TrailingSignature
// ---------------------------------------------------------------------------

/// Full signature closing a one-pass bracket. Payload layout:
/// `key_id (8) ‖ signature (64)`.
pub struct TrailingSignature {
    /// Identifier of the signer's public key; must equal the one-pass
    /// marker's key id.
    pub key_id: KeyId,
    /// Ed25519ph signature over the bracketed literal bytes.
    pub signature: Signature,
}

impl TrailingSignature {
    /// Total payload length of an encoded trailing signature.
    pub const LEN: usize = KeyId::LEN + Signature::LEN;

    /// Encodes the signature payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(self.key_id.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out
    }

    /// Decodes a signature payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::LEN {
            return Err(SealchatError::MalformedPacket {
                reason: format!(
                    "trailing signature is {} bytes, expected {}",
                    payload.len(),
                    Self::LEN
                ),
            });
        }
        let mut key_id = [0u8; 8];
        key_id.copy_from_slice(&payload[..8]);
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&payload[8..]);
        Ok(Self {
            key_id: KeyId::new(key_id),
            signature: Signature::from_bytes(sig),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() -> Result<()> {
        let mut buf = Vec::new();
        write_packet(&mut buf, TAG_LITERAL_DATA, b"payload one")?;
        write_packet(&mut buf, TAG_SIGNATURE, b"")?;
        write_packet(&mut buf, 0x7E, b"x")?;

        let mut reader = PacketReader::new(&buf);
        let p1 = reader.next()?.expect("first packet");
        assert_eq!(p1.tag, TAG_LITERAL_DATA);
        assert_eq!(p1.payload, b"payload one");
        let p2 = reader.next()?.expect("second packet");
        assert_eq!(p2.tag, TAG_SIGNATURE);
        assert!(p2.payload.is_empty());
        let p3 = reader.next()?.expect("third packet");
        assert_eq!(p3.tag, 0x7E);
        assert!(reader.next()?.is_none());
        Ok(())
    }

    #[test]
    fn truncated_header_is_malformed() {
        let mut reader = PacketReader::new(&[TAG_LITERAL_DATA, 0x00]);
        assert!(matches!(
            reader.next(),
            Err(SealchatError::MalformedPacket { .. })
        ));
    }

    #[test]
    fn overlong_length_is_malformed() -> Result<()> {
        let mut buf = Vec::new();
        write_packet(&mut buf, TAG_LITERAL_DATA, b"abc")?;
        buf.truncate(buf.len() - 1);

        let mut reader = PacketReader::new(&buf);
        assert!(matches!(
            reader.next(),
            Err(SealchatError::MalformedPacket { .. })
        ));
        Ok(())
    }

    #[test]
    fn frame_length_field_overflow_is_rejected() {
        assert_eq!(frame_len(0).expect("zero fits"), 0);
        assert_eq!(
            frame_len(u32::MAX as usize).expect("u32::MAX fits"),
            u32::MAX
        );

        let too_long = (u64::from(u32::MAX) + 1) as usize;
        assert!(matches!(
            frame_len(too_long),
            Err(SealchatError::MalformedPacket { .. })
        ));
    }

    #[test]
    fn session_key_record_roundtrip() -> Result<()> {
        let record = SessionKeyRecord {
            key_id: KeyId::new([0x01; 8]),
            ephemeral_public: X25519PublicKey::from_bytes([0x02; 32]),
            nonce: AeadNonce::from_bytes([0x03; 24]),
            wrapped_key: [0x04; WRAPPED_KEY_LEN],
        };
        let encoded = record.encode();
        assert_eq!(encoded.len(), SessionKeyRecord::LEN);

        let decoded = SessionKeyRecord::decode(&encoded)?;
        assert_eq!(decoded.key_id, record.key_id);
        assert_eq!(decoded.ephemeral_public, record.ephemeral_public);
        assert_eq!(decoded.nonce, record.nonce);
        assert_eq!(decoded.wrapped_key, record.wrapped_key);
        Ok(())
    }

    #[test]
    fn session_key_record_wrong_size_is_malformed() {
        assert!(matches!(
            SessionKeyRecord::decode(&[0u8; 111]),
            Err(SealchatError::MalformedPacket { .. })
        ));
    }

    #[test]
    fn one_pass_roundtrip() -> Result<()> {
        let marker = OnePassSignature {
            signature_algorithm: ALGO_ED25519PH,
            hash_algorithm: HASH_SHA512,
            key_id: KeyId::new([0xAA; 8]),
        };
        let decoded = OnePassSignature::decode(&marker.encode())?;
        assert_eq!(decoded.signature_algorithm, ALGO_ED25519PH);
        assert_eq!(decoded.hash_algorithm, HASH_SHA512);
        assert_eq!(decoded.key_id, marker.key_id);
        Ok(())
    }

    #[test]
    fn trailing_signature_roundtrip() -> Result<()> {
        let trailing = TrailingSignature {
            key_id: KeyId::new([0xBB; 8]),
            signature: Signature::from_bytes([0xCC; 64]),
        };
        let decoded = TrailingSignature::decode(&trailing.encode())?;
        assert_eq!(decoded.key_id, trailing.key_id);
        assert_eq!(decoded.signature, trailing.signature);
        Ok(())
    }

    #[test]
    fn encrypted_body_too_short_is_malformed() {
        assert!(matches!(
            EncryptedBody::decode(&[0u8; 30]),
            Err(SealchatError::MalformedPacket { .. })
        ));
    }
}
