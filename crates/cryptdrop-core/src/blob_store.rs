//! Ciphertext blob storage
//!
//! Blobs are written to a staging file in the uploads directory and renamed
//! into place on commit, so a reader never observes a half-written envelope.
//! Staging files carry no `.enc` suffix and are invisible to the catalog; a
//! staged blob that is dropped without being committed is removed. Staging
//! files orphaned by a crash are swept when the store is reopened.

use crate::Result;
use cryptdrop_crypto::Envelope;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub(crate) const STAGING_PREFIX: &str = ".staging-";
const STAGING_SUFFIX: &str = ".part";

/// Directory of committed `.enc` blobs
#[derive(Clone, Debug)]
pub struct BlobStore {
    dir: PathBuf,
}

/// An envelope written to disk but not yet visible under its storage name
#[derive(Debug)]
pub struct StagedBlob {
    file: NamedTempFile,
    len: u64,
}

impl StagedBlob {
    /// Bytes written
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing was written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current on-disk location of the staging file
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl BlobStore {
    /// Open (and create if needed) a blob directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the blobs
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path for a storage name
    pub fn path(&self, storage_name: &str) -> PathBuf {
        self.dir.join(storage_name)
    }

    /// Write an envelope to a staging file and sync it
    pub fn stage(&self, envelope: &Envelope) -> Result<StagedBlob> {
        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.dir)?;
        file.write_all(envelope.as_bytes())?;
        file.flush()?;
        file.as_file().sync_all()?;
        Ok(StagedBlob {
            file,
            len: envelope.len() as u64,
        })
    }

    /// Atomically publish a staged blob under its storage name
    pub fn commit(&self, staged: StagedBlob, storage_name: &str) -> Result<PathBuf> {
        let path = self.path(storage_name);
        staged.file.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    /// Read a whole blob
    pub fn read(&self, storage_name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path(storage_name))
    }

    /// Delete staging files left behind by an interrupted upload
    pub fn sweep_staging(&self) -> Result<usize> {
        Ok(sweep_staging_files(&self.dir)?)
    }

    /// Remove a blob; returns whether it existed
    pub fn remove(&self, storage_name: &str) -> Result<bool> {
        match fs::remove_file(self.path(storage_name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Remove every regular file in `dir` whose name carries the staging prefix
pub(crate) fn sweep_staging_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let staging = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(STAGING_PREFIX));
        if !staging || !entry.file_type()?.is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
