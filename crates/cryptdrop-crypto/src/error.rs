//! Error types for the cryptdrop-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Envelope is too short to hold a nonce and tag
    #[error("malformed envelope: {len} bytes is shorter than the {min}-byte header")]
    Malformed { len: usize, min: usize },

    /// Tag verification failed (wrong key, corruption or tampering)
    #[error("authentication failed: envelope could not be verified")]
    AuthenticationFailed,

    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 decode error
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
