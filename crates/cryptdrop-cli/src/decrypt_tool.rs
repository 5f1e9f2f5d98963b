//! Offline decryption of downloaded files
//!
//! Works from the two artifacts the gateway hands out: the `.enc` envelope
//! and the key file (either a bare key record or the rendered key artifact).

use cryptdrop_core::extract_key_text;
use cryptdrop_crypto::{CryptoError, Envelope, EnvelopeCipher, SymmetricKey, hashing};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

/// Hex characters shown for the nonce and tag
const HEX_PREFIX_LEN: usize = 16;

/// Extension used for collision names when the output has none
const FALLBACK_EXTENSION: &str = "decrypted";

/// Errors from the decryption tool
#[derive(Error, Debug)]
pub enum DecryptToolError {
    #[error("encrypted file not found: {}", .0.display())]
    EncryptedFileNotFound(PathBuf),

    #[error("key file not found: {}", .0.display())]
    KeyFileNotFound(PathBuf),

    #[error("could not find an encryption key in {}", .0.display())]
    NoKeyInFile(PathBuf),

    #[error("invalid key: {0}")]
    InvalidKey(CryptoError),

    #[error("file too small ({len} bytes); not an AES-GCM envelope")]
    TooSmall { len: usize },

    #[error("decryption failed: wrong key or corrupted file")]
    DecryptionFailed,

    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias using `DecryptToolError`
pub type Result<T> = std::result::Result<T, DecryptToolError>;

/// Envelope layout as read from disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeReport {
    pub file_size: usize,
    pub nonce_prefix: String,
    pub tag_prefix: String,
    pub ciphertext_len: usize,
}

impl EnvelopeReport {
    fn of(envelope: &Envelope) -> Self {
        Self {
            file_size: envelope.len(),
            nonce_prefix: hex_prefix(envelope.nonce()),
            tag_prefix: hex_prefix(envelope.tag()),
            ciphertext_len: envelope.ciphertext().len(),
        }
    }
}

/// A successfully opened envelope
pub struct Decrypted {
    pub report: EnvelopeReport,
    pub plaintext: Zeroizing<Vec<u8>>,
    /// SHA-256 of the plaintext, lowercase hex
    pub sha256: String,
}

fn hex_prefix(bytes: &[u8]) -> String {
    let mut hex = hex::encode(bytes);
    hex.truncate(HEX_PREFIX_LEN);
    hex
}

/// Load a key from a bare record or a key artifact
pub fn load_key(path: &Path) -> Result<SymmetricKey> {
    let content = match fs::read_to_string(path) {
        Ok(content) => Zeroizing::new(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DecryptToolError::KeyFileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let text = extract_key_text(&content)
        .ok_or_else(|| DecryptToolError::NoKeyInFile(path.to_path_buf()))?;
    SymmetricKey::from_base64(text).map_err(DecryptToolError::InvalidKey)
}

/// Read and open an envelope file
pub fn decrypt_file(path: &Path, key: &SymmetricKey) -> Result<Decrypted> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DecryptToolError::EncryptedFileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let envelope = Envelope::from_bytes(bytes).map_err(|e| match e {
        CryptoError::Malformed { len, .. } => DecryptToolError::TooSmall { len },
        other => DecryptToolError::Crypto(other),
    })?;
    let report = EnvelopeReport::of(&envelope);

    let cipher = EnvelopeCipher::new(key).map_err(DecryptToolError::InvalidKey)?;
    let plaintext = cipher.open(envelope.as_bytes()).map_err(|e| match e {
        CryptoError::AuthenticationFailed => DecryptToolError::DecryptionFailed,
        other => DecryptToolError::Crypto(other),
    })?;
    let sha256 = hashing::sha256_hex(&plaintext);

    Ok(Decrypted {
        report,
        plaintext,
        sha256,
    })
}

/// Output name for an input file name: `.enc` stripped, else `_decrypted` appended
pub fn output_name(input_name: &str) -> String {
    match input_name.strip_suffix(".enc") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}_decrypted", input_name),
    }
}

/// Name for the n-th collision: `name_n.ext`
fn numbered_name(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}_{}.{}", stem, n, ext)
        }
        _ => format!("{}_{}.{}", name, n, FALLBACK_EXTENSION),
    }
}

/// Write plaintext into `dir` without overwriting anything
pub fn save_decrypted(dir: &Path, input_name: &str, data: &[u8]) -> Result<PathBuf> {
    let base = output_name(input_name);
    let mut candidate = base.clone();
    let mut n = 0;
    loop {
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(data)?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n += 1;
                candidate = numbered_name(&base, n);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Human-readable byte count
pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} bytes", bytes)
    } else if b < MIB {
        format!("{:.2} KB", b / KIB)
    } else {
        format!("{:.2} MB", b / MIB)
    }
}

/// Ask for a path on `output` and read one line from `input`
///
/// A blank answer or end of input yields `None`.
pub fn prompt_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<PathBuf>> {
    write!(output, "Enter path to {label}: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim().trim_matches(|c| c == '"' || c == '\'');
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(answer)))
    }
}
