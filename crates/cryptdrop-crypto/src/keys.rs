//! Per-file symmetric key material
//!
//! Every uploaded file gets its own freshly generated 256-bit key. Keys are
//! drawn from the operating system CSPRNG and wiped from memory on drop.

use crate::{CryptoError, Result};
use base64::Engine;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A 256-bit key used to seal exactly one file
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut key);
        Self { key }
    }

    /// Create a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Encode as standard base64 (the on-disk key record format)
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.key)
    }

    /// Decode from standard base64, ignoring surrounding whitespace
    pub fn from_base64(s: &str) -> Result<Self> {
        let mut bytes = base64::engine::general_purpose::STANDARD.decode(s.trim())?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Short SHA-256 fingerprint, safe to print or log
    pub fn fingerprint(&self) -> String {
        let digest = crate::hashing::sha256(&self.key);
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey({})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let key1 = SymmetricKey::generate();
        let key2 = SymmetricKey::generate();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_base64_roundtrip() {
        let key = SymmetricKey::generate();
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);
        assert!(!encoded.ends_with('\n'));

        let decoded = SymmetricKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn test_from_base64_trims_whitespace() {
        let key = SymmetricKey::generate();
        let padded = format!("  {}\n", key.to_base64());
        let decoded = SymmetricKey::from_base64(&padded).unwrap();
        assert_eq!(key.as_bytes(), decoded.as_bytes());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = base64::engine::general_purpose::STANDARD.encode([7u8; 16]);
        assert!(matches!(
            SymmetricKey::from_base64(&short),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(SymmetricKey::from_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            SymmetricKey::from_base64("not base64 at all!"),
            Err(CryptoError::Base64Decode(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = SymmetricKey::from_bytes(&[0xAB; KEY_SIZE]).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(&key.to_base64()));
        assert_eq!(debug, format!("SymmetricKey({})", key.fingerprint()));
    }
}
