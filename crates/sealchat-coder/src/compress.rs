//! Deflate compression stage.
//!
//! The signed literal stream is compressed with zlib before
//! encryption. The stage is binary-transparent (no text transcoding)
//! and writes in [`CHUNK_SIZE`] chunks like every other stage. A
//! compression failure aborts the whole pipeline; the engine never
//! silently falls back to emitting uncompressed data.
//!
//! Decompression enforces an output-size cap so a hostile packet
//! cannot expand into unbounded memory.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use sealchat_types::{Result, SealchatError};

use crate::CHUNK_SIZE;

/// Upper bound on decompressed payload size (decompression-bomb
/// guard). Far above any legitimate chat message.
const MAX_DECOMPRESSED_LEN: usize = 32 * 1024 * 1024;

/// Compresses `data` with zlib.
///
/// # Errors
///
/// [`SealchatError::CryptoFailure`] if the encoder fails; the
/// pipeline aborts rather than emitting an uncompressed fallback.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for chunk in data.chunks(CHUNK_SIZE) {
        encoder
            .write_all(chunk)
            .map_err(|e| SealchatError::CryptoFailure {
                reason: format!("deflate write failed: {e}"),
            })?;
    }
    encoder.finish().map_err(|e| SealchatError::CryptoFailure {
        reason: format!("deflate finish failed: {e}"),
    })
}

/// Decompresses a zlib stream, reading in [`CHUNK_SIZE`] chunks.
///
/// # Errors
///
/// [`SealchatError::MalformedPacket`] on a corrupt deflate stream or
/// when the output exceeds [`MAX_DECOMPRESSED_LEN`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let n = decoder
            .read(&mut chunk)
            .map_err(|e| SealchatError::MalformedPacket {
                reason: format!("deflate stream error: {e}"),
            })?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
        if out.len() > MAX_DECOMPRESSED_LEN {
            return Err(SealchatError::MalformedPacket {
                reason: format!("decompressed payload exceeds {MAX_DECOMPRESSED_LEN} bytes"),
            });
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
