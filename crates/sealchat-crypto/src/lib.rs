//! Cryptographic primitives for the Sealchat message sealing engine.
//!
//! This crate is the **sole** location for all cryptographic
//! operations. The coder crate composes these primitives into the
//! sign → compress → seal pipeline but never touches raw crypto
//! directly.
//!
//! # Modules
//!
//! - [`signing`] — Ed25519 keypairs and streaming (prehashed) signing
//! - [`ecdh`] — X25519 Elliptic-Curve Diffie-Hellman key agreement
//! - [`aead`] — XChaCha20-Poly1305 authenticated encryption
//! - [`hkdf`] — HKDF-SHA256 wrap-key derivation
//! - [`hash`] — SHA3-256 hashing and key-id derivation
//! - [`keys`] — personal and recipient key material

pub mod aead;
pub mod ecdh;
pub mod hash;
pub mod hkdf;
pub mod keys;
pub mod signing;
