//! Error types for the cryptdrop-core crate

use crate::id::FileId;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in core storage operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// File extension is not on the allow-list
    #[error("file type not allowed: {extension:?} (allowed: {allowed})")]
    ExtensionNotAllowed { extension: String, allowed: String },

    /// Upload exceeds the configured byte ceiling
    #[error("file too large: exceeds maximum of {max} bytes")]
    FileTooLarge { max: u64 },

    /// Filename has nothing left after sanitizing
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Identifier is not a valid file id
    #[error("invalid file id: {0:?}")]
    InvalidFileId(String),

    /// No ciphertext exists for the identifier
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// No key record exists for the identifier
    #[error("key not found: {0}")]
    KeyNotFound(FileId),

    /// Ciphertext exists but its key record is gone
    #[error("decryption key missing for file {0}")]
    KeyMissing(FileId),

    /// Key record exists but does not decode to a key
    #[error("key record for {id} is corrupt: {reason}")]
    KeyCorrupt { id: FileId, reason: String },

    /// Stored blob is too short to be an envelope
    #[error("stored envelope for {0} is corrupt")]
    CorruptEnvelope(FileId),

    /// Envelope failed authentication
    #[error("decryption failed for {0}: file may be corrupted")]
    DecryptionFailed(FileId),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Crypto error
    #[error("crypto error: {0}")]
    Crypto(#[from] cryptdrop_crypto::CryptoError),
}

impl CoreError {
    /// Rejected input; nothing was written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ExtensionNotAllowed { .. }
                | Self::FileTooLarge { .. }
                | Self::InvalidFilename(_)
                | Self::InvalidFileId(_)
        )
    }

    /// Identifier resolves to nothing usable
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::KeyNotFound(_) | Self::KeyMissing(_)
        )
    }
}
