//! SHA-256 content digests
//!
//! Used for integrity reports and key fingerprints. Digests are never used
//! as keys.

use crate::Result;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// Compute the SHA-256 digest of a byte slice
pub fn sha256(data: &[u8]) -> [u8; DIGEST_SIZE] {
    Sha256::digest(data).into()
}

/// Compute the SHA-256 digest of a byte slice as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash a reader in 4 KiB blocks without buffering it whole
pub fn sha256_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut block = [0u8; 4096];
    loop {
        let n = reader.read(&mut block)?;
        if n == 0 {
            break;
        }
        hasher.update(&block[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file on disk
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let file = std::fs::File::open(path)?;
    sha256_reader(std::io::BufReader::new(file))
}
