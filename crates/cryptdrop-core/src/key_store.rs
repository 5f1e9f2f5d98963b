//! Key records
//!
//! One text file per file identifier, `<keys_dir>/<id>.key`, holding the
//! standard base64 encoding of the key and nothing else.

use crate::{
    CoreError, Result,
    blob_store::{STAGING_PREFIX, sweep_staging_files},
    id::FileId,
};
use cryptdrop_crypto::SymmetricKey;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// Suffix of a key record file
pub const KEY_SUFFIX: &str = ".key";

const ARTIFACT_KEY_LABEL: &str = "Key (base64):";

/// Filesystem-backed key records
#[derive(Clone, Debug)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Open (and create if needed) a key directory
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a fresh key for a new upload
    pub fn generate(&self) -> SymmetricKey {
        SymmetricKey::generate()
    }

    fn record_path(&self, id: &FileId) -> PathBuf {
        self.dir.join(format!("{}{}", id, KEY_SUFFIX))
    }

    /// Write the key record for `id`, replacing any existing one
    pub fn persist(&self, id: &FileId, key: &SymmetricKey) -> Result<()> {
        let encoded = Zeroizing::new(key.to_base64());
        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.dir)?;
        file.write_all(encoded.as_bytes())?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(self.record_path(id)).map_err(|e| e.error)?;
        debug!(%id, fingerprint = %key.fingerprint(), "Persisted key record");
        Ok(())
    }

    /// Load and decode the key for `id`
    pub fn load(&self, id: &FileId) -> Result<SymmetricKey> {
        let record = self.read_record(id)?;
        SymmetricKey::from_base64(&record).map_err(|e| CoreError::KeyCorrupt {
            id: *id,
            reason: e.to_string(),
        })
    }

    /// Raw stored record text
    pub fn read_record(&self, id: &FileId) -> Result<Zeroizing<String>> {
        match fs::read_to_string(self.record_path(id)) {
            Ok(text) => Ok(Zeroizing::new(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CoreError::KeyNotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a record exists for `id`
    pub fn contains(&self, id: &FileId) -> bool {
        self.record_path(id).is_file()
    }

    /// Remove the record for `id`; returns whether it existed
    pub fn delete(&self, id: &FileId) -> Result<bool> {
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete half-written records left behind by a crash
    pub fn sweep_staging(&self) -> Result<usize> {
        Ok(sweep_staging_files(&self.dir)?)
    }

    /// Number of key records
    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(KEY_SUFFIX))
            {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Human-readable key file offered for download next to the ciphertext
pub fn render_key_artifact(id: &FileId, record: &str) -> String {
    format!(
        "=== ENCRYPTION KEY FILE ===\n\
         File ID: {id}\n\
         {ARTIFACT_KEY_LABEL} {record}\n\
         \n\
         === INSTRUCTIONS ===\n\
         1. Download the encrypted file (.enc extension)\n\
         2. Save this key file\n\
         3. Use the decryption tool:\n   \
         cryptdrop-decrypt [encrypted_file.enc] [key_file.key]\n\
         \n\
         === SECURITY WARNING ===\n\
         Keep this key secure! Anyone with this key can decrypt your file.\n",
        record = record.trim(),
    )
}

/// Find the base64 key inside a bare record or a rendered key artifact
///
/// Looks for the `Key (base64):` label first, then for a line that looks
/// like padded base64.
pub fn extract_key_text(content: &str) -> Option<&str> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    for &line in &lines {
        if let Some((_, key)) = line.split_once(ARTIFACT_KEY_LABEL) {
            let key = key.trim();
            if !key.is_empty() {
                return Some(key);
            }
        } else if line.len() > 40 && line.contains('=') && is_base64_line(line) {
            return Some(line);
        }
    }

    lines
        .into_iter()
        .find(|line| line.len() > 20 && is_base64_line(line))
}

fn is_base64_line(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}
