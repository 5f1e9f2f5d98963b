//! Upload, retrieval and deletion lifecycle
//!
//! An upload moves through [`UploadStage`]s. Ciphertext and key are made
//! durable in an order that keeps the catalog consistent: the envelope is
//! staged first, the key record is persisted, and only then is the blob
//! renamed to its storage name. A file is therefore either absent from the
//! catalog or present with its key.

use crate::{
    BlobStore, Catalog, CatalogEntry, CoreError, KeyStore, Result, VaultConfig,
    catalog::{compose_storage_name, extension_of, sanitize_name},
    id::FileId,
    key_store::render_key_artifact,
};
use cryptdrop_crypto::{CryptoError, SymmetricKey, envelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

/// Progress of a single upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStage {
    /// Bytes accepted and validated
    Received,
    /// Fresh key drawn
    KeyGenerated,
    /// Envelope sealed in memory
    Encrypted,
    /// Key record and blob both durable
    Persisted,
    /// Blob and key removed
    Deleted,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::KeyGenerated => "key_generated",
            Self::Encrypted => "encrypted",
            Self::Persisted => "persisted",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Bytes handed back to the transport layer
pub struct RetrievedFile {
    /// File identifier
    pub id: FileId,
    /// Name to offer the client
    pub name: String,
    /// File contents (plaintext or envelope, depending on the call)
    pub data: Zeroizing<Vec<u8>>,
}

impl RetrievedFile {
    /// Move the contents out, still wiped on drop
    pub fn into_data(self) -> Zeroizing<Vec<u8>> {
        self.data
    }
}

impl fmt::Debug for RetrievedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievedFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Counts reported by the service info endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStats {
    /// Committed ciphertext blobs
    pub files_count: usize,
    /// Key records on disk
    pub keys_count: usize,
}

/// Encrypted file store
///
/// Holds no locks and no in-memory index; every call works directly against
/// the configured directories, so a `Vault` can be shared freely across
/// threads.
#[derive(Debug)]
pub struct Vault {
    config: VaultConfig,
    catalog: Catalog,
    blobs: BlobStore,
    keys: KeyStore,
}

impl Vault {
    /// Open a vault, creating its directories if needed
    pub fn new(config: VaultConfig) -> Result<Self> {
        let blobs = BlobStore::new(&config.uploads_dir)?;
        let keys = KeyStore::new(&config.keys_dir)?;
        let catalog = Catalog::new(&config.uploads_dir);
        let swept = blobs.sweep_staging()? + keys.sweep_staging()?;
        if swept > 0 {
            warn!(swept, "Removed staging files left by an interrupted upload");
        }
        info!(
            uploads = %config.uploads_dir.display(),
            keys = %config.keys_dir.display(),
            max_upload_size = config.max_upload_size,
            "Opened vault"
        );
        Ok(Self {
            config,
            catalog,
            blobs,
            keys,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Validate an upload before any bytes are read
    ///
    /// Returns the sanitized name the file will be stored under.
    pub fn check_upload(&self, original_name: &str, declared_len: Option<u64>) -> Result<String> {
        let name = sanitize_name(original_name)?;
        let extension = extension_of(&name).unwrap_or_default();
        if !self.config.is_extension_allowed(&extension) {
            return Err(CoreError::ExtensionNotAllowed {
                extension,
                allowed: self.config.allowed_extensions_display(),
            });
        }
        if let Some(len) = declared_len {
            if len > self.config.max_upload_size {
                return Err(CoreError::FileTooLarge {
                    max: self.config.max_upload_size,
                });
            }
        }
        Ok(name)
    }

    /// Encrypt and store a file read from `reader`
    pub fn upload<R: Read>(&self, reader: R, original_name: &str) -> Result<FileId> {
        let name = self.check_upload(original_name, None)?;
        let max = self.config.max_upload_size;

        let mut plaintext = Zeroizing::new(Vec::new());
        reader
            .take(max.saturating_add(1))
            .read_to_end(&mut *plaintext)?;
        if plaintext.len() as u64 > max {
            return Err(CoreError::FileTooLarge { max });
        }

        let id = FileId::generate();
        let mut stage = UploadStage::Received;
        debug!(%id, %stage, len = plaintext.len(), "Upload received");

        match self.seal_and_store(&id, &name, &plaintext, &mut stage) {
            Ok(size) => {
                info!(%id, name = %name, size, "Stored encrypted file");
                Ok(id)
            }
            Err(e) => {
                warn!(%id, %stage, error = %e, "Upload aborted");
                Err(e)
            }
        }
    }

    /// Encrypt and store an in-memory file
    pub fn upload_bytes(&self, data: &[u8], original_name: &str) -> Result<FileId> {
        self.upload(data, original_name)
    }

    fn seal_and_store(
        &self,
        id: &FileId,
        name: &str,
        plaintext: &[u8],
        stage: &mut UploadStage,
    ) -> Result<u64> {
        let key = self.keys.generate();
        *stage = UploadStage::KeyGenerated;
        debug!(%id, %stage, fingerprint = %key.fingerprint());

        let envelope = envelope::encrypt(&key, plaintext)?;
        *stage = UploadStage::Encrypted;
        debug!(%id, %stage, len = envelope.len());

        // A staged blob is removed when dropped, so an early return below
        // leaves nothing in the uploads directory.
        let staged = self.blobs.stage(&envelope)?;
        self.keys.persist(id, &key)?;

        let storage_name = compose_storage_name(id, name);
        let size = staged.len();
        if let Err(e) = self.blobs.commit(staged, &storage_name) {
            self.rollback_key(id);
            return Err(e);
        }

        *stage = UploadStage::Persisted;
        debug!(%id, %stage, storage_name = %storage_name);
        Ok(size)
    }

    fn rollback_key(&self, id: &FileId) {
        match self.keys.delete(id) {
            Ok(_) => warn!(%id, "Rolled back key record after failed commit"),
            Err(e) => error!(%id, error = %e, "Failed to roll back key record"),
        }
    }

    /// Decrypt a stored file
    pub fn retrieve(&self, id: &FileId) -> Result<RetrievedFile> {
        let entry = self.locate(id)?;

        let key = match self.keys.load(id) {
            Ok(key) => key,
            Err(CoreError::KeyNotFound(_)) => {
                warn!(%id, "Ciphertext present but key record missing");
                return Err(CoreError::KeyMissing(*id));
            }
            Err(e) => return Err(e),
        };

        let blob = Zeroizing::new(self.read_blob(&entry)?);
        let data = open_envelope(id, &key, &blob)?;
        debug!(%id, len = data.len(), "Decrypted file");

        Ok(RetrievedFile {
            id: *id,
            name: entry.name,
            data,
        })
    }

    /// Return the stored envelope untouched
    pub fn retrieve_ciphertext(&self, id: &FileId) -> Result<RetrievedFile> {
        let entry = self.locate(id)?;
        let blob = self.read_blob(&entry)?;
        Ok(RetrievedFile {
            id: *id,
            name: entry.storage_name,
            data: Zeroizing::new(blob),
        })
    }

    /// Decrypt a stored file and compare it with a candidate plaintext
    pub fn verify(&self, id: &FileId, original: &[u8]) -> Result<bool> {
        let file = self.retrieve(id)?;
        Ok(file.data.as_slice() == original)
    }

    /// Remove a file's blob and key; absent parts are not an error
    pub fn delete(&self, id: &FileId) -> Result<()> {
        let blob_removed = match self.catalog.find(id)? {
            Some(entry) => self.blobs.remove(&entry.storage_name)?,
            None => false,
        };
        let key_removed = self.keys.delete(id)?;
        info!(
            %id,
            stage = %UploadStage::Deleted,
            blob_removed,
            key_removed,
            "Deleted file"
        );
        Ok(())
    }

    /// Render the downloadable key file for `id`
    pub fn export_key(&self, id: &FileId) -> Result<String> {
        let record = self.keys.read_record(id)?;
        Ok(render_key_artifact(id, &record))
    }

    /// All stored files, newest first
    pub fn list_entries(&self) -> Result<Vec<CatalogEntry>> {
        self.catalog.list_entries()
    }

    /// File and key counts
    pub fn stats(&self) -> Result<VaultStats> {
        Ok(VaultStats {
            files_count: self.catalog.count()?,
            keys_count: self.keys.count()?,
        })
    }

    fn locate(&self, id: &FileId) -> Result<CatalogEntry> {
        self.catalog.find(id)?.ok_or(CoreError::NotFound(*id))
    }

    fn read_blob(&self, entry: &CatalogEntry) -> Result<Vec<u8>> {
        match self.blobs.read(&entry.storage_name) {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CoreError::NotFound(entry.id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn open_envelope(id: &FileId, key: &SymmetricKey, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    envelope::decrypt(key, blob).map_err(|e| match e {
        CryptoError::Malformed { len, .. } => {
            warn!(%id, len, "Stored envelope is truncated");
            CoreError::CorruptEnvelope(*id)
        }
        CryptoError::AuthenticationFailed => {
            warn!(%id, "Envelope failed authentication");
            CoreError::DecryptionFailed(*id)
        }
        other => other.into(),
    })
}
