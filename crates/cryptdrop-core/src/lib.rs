//! # CryptDrop Core
//!
//! Encrypted-at-rest file storage for the CryptDrop service.
//!
//! This crate provides:
//! - **Vault**: upload, retrieve, delete and key export with per-file keys
//! - **Catalog**: file listing derived from ciphertext names, no index
//! - **Blob and key stores**: crash-safe writes through staged renames
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP Gateway / Tools            │
//! ├─────────────────────────────────────────┤
//! │                 Vault                   │
//! ├─────────────────────────────────────────┤
//! │   Catalog   │  BlobStore  │  KeyStore   │
//! ├─────────────────────────────────────────┤
//! │   uploads/<id>_<name>.enc │ keys/<id>.key│
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use cryptdrop_core::{Vault, VaultConfig};
//!
//! let vault = Vault::new(VaultConfig::with_root("/var/lib/cryptdrop"))?;
//! let id = vault.upload_bytes(b"hello text", "hello.txt")?;
//! let file = vault.retrieve(&id)?;
//! assert_eq!(file.data.as_slice(), b"hello text");
//! # Ok::<(), cryptdrop_core::CoreError>(())
//! ```

pub mod blob_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod id;
pub mod key_store;
pub mod vault;

pub use blob_store::{BlobStore, StagedBlob};
pub use catalog::{Catalog, CatalogEntry};
pub use config::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_SIZE, VaultConfig};
pub use error::{CoreError, Result};
pub use id::FileId;
pub use key_store::{KeyStore, extract_key_text, render_key_artifact};
pub use vault::{RetrievedFile, UploadStage, Vault, VaultStats};
