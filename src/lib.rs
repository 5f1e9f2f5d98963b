//! # CryptDrop
//!
//! Encrypted file storage: every upload is sealed with its own AES-256-GCM
//! key and stored as an opaque `.enc` blob next to a per-file key record.
//!
//! This package re-exports the library crates for embedding:
//! - [`crypto`]: keys, the envelope codec and hashing
//! - [`core`]: the [`Vault`](core::Vault) lifecycle and its stores
//!
//! The HTTP server and the offline decryption tool live in `cryptdrop-cli`.

pub use cryptdrop_core as core;
pub use cryptdrop_crypto as crypto;

pub use cryptdrop_core::{CoreError, FileId, Vault, VaultConfig};
