//! Message sealing pipeline for Sealchat.
//!
//! Turns a plaintext chat message plus a set of recipient public keys
//! into a signed, compressed, multi-recipient encrypted packet, and
//! reverses the transformation on receipt. Send path:
//!
//! ```text
//! envelope → signed literal stream → deflate → multi-recipient seal
//! ```
//!
//! Receive path: locate the session-key record addressed to the local
//! key, decrypt and verify the body, decompress, extract the literal.
//! Every call is synchronous, single-threaded, and free of shared
//! state; callers run it off their UI thread and impose any timeout
//! around the whole blocking operation.
//!
//! # Modules
//!
//! - [`envelope`] — deterministic canonical plaintext envelope
//! - [`packet`] — OpenPGP-style binary packet framing
//! - [`literal`] — one-pass signature bracket and literal extraction
//! - [`compress`] — deflate stage
//! - [`seal`] — session-key generation, per-recipient records, body AEAD
//! - [`coder`] — the polymorphic [`Coder`](coder::Coder) surface

pub mod coder;
pub mod compress;
pub mod envelope;
pub mod literal;
pub mod packet;
pub mod seal;

/// Chunk size for streamed hashing and compression writes.
///
/// Applied uniformly to every stage. Always a power of 2.
pub(crate) const CHUNK_SIZE: usize = 1 << 12;
