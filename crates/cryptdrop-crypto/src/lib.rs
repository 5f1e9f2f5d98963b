//! # CryptDrop Crypto
//!
//! Cryptographic primitives for the CryptDrop encrypted file store.
//!
//! This crate provides:
//! - **Key material**: random 256-bit per-file keys, zeroized on drop
//! - **Envelope codec**: AES-256-GCM sealing into `nonce || tag || ciphertext`
//! - **Hashing**: SHA-256 digests for integrity reports
//!
//! ## Security Model
//!
//! - Every file is sealed under its own key; keys are never reused
//! - Every seal draws a fresh nonce from the OS CSPRNG
//! - Opening verifies the tag over the whole blob before any plaintext is
//!   released
//!
//! ## Example
//!
//! ```rust
//! use cryptdrop_crypto::{SymmetricKey, envelope};
//!
//! let key = SymmetricKey::generate();
//! let sealed = envelope::encrypt(&key, b"Hello, World!")?;
//! let opened = envelope::decrypt(&key, sealed.as_bytes())?;
//! assert_eq!(opened.as_slice(), b"Hello, World!");
//! # Ok::<(), cryptdrop_crypto::CryptoError>(())
//! ```

pub mod envelope;
pub mod error;
pub mod hashing;
pub mod keys;

pub use envelope::{Envelope, EnvelopeCipher, HEADER_SIZE, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, Result};
pub use keys::{KEY_SIZE, SymmetricKey};

/// Algorithm identifier reported to clients
pub const ALGORITHM: &str = "AES-256-GCM";
