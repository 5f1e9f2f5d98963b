//! Authenticated encryption envelope for stored files
//!
//! An envelope is a single self-describing blob:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────────────────┐
//! │ nonce (16 B) │  tag (16 B)  │ ciphertext (len of file) │
//! └──────────────┴──────────────┴──────────────────────────┘
//! ```
//!
//! There is no version byte and no length prefix; the ciphertext length is
//! implied by the blob size. The cipher is AES-256-GCM with a 128-bit nonce,
//! so envelopes are byte compatible with any GCM implementation that accepts
//! 16-byte nonces.

use crate::{CryptoError, Result, keys::SymmetricKey};
use aes_gcm::{
    AesGcm, KeyInit, Nonce, Tag,
    aead::{AeadInPlace, consts::U16},
    aes::Aes256,
};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Size of the per-envelope nonce in bytes (128 bits)
pub const NONCE_SIZE: usize = 16;

/// Size of the GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Fixed header size; anything shorter is malformed
pub const HEADER_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// AES-256-GCM parameterised with a 16-byte nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// A sealed file: `nonce || tag || ciphertext`
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Vec<u8>,
}

impl Envelope {
    /// Wrap stored bytes, rejecting anything shorter than the header
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        check_len(bytes.len())?;
        Ok(Self { bytes })
    }

    /// The 16-byte nonce
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[..NONCE_SIZE]
    }

    /// The 16-byte authentication tag
    pub fn tag(&self) -> &[u8] {
        &self.bytes[NONCE_SIZE..HEADER_SIZE]
    }

    /// The ciphertext body (same length as the plaintext)
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// Total envelope length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the envelope carries an empty plaintext
    pub fn is_empty(&self) -> bool {
        self.bytes.len() == HEADER_SIZE
    }

    /// Get the raw envelope bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the envelope, returning the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Envelope {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("nonce", &hex::encode(self.nonce()))
            .field("ciphertext_len", &self.ciphertext().len())
            .finish()
    }
}

fn check_len(len: usize) -> Result<()> {
    if len < HEADER_SIZE {
        return Err(CryptoError::Malformed {
            len,
            min: HEADER_SIZE,
        });
    }
    Ok(())
}

/// Envelope codec bound to a single key
pub struct EnvelopeCipher {
    cipher: Aes256Gcm16,
}

impl EnvelopeCipher {
    /// Create a codec for the given key
    pub fn new(key: &SymmetricKey) -> Result<Self> {
        let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Seal a plaintext under a fresh random nonce
    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut nonce);
        self.seal_with_nonce(&nonce, plaintext)
    }

    // Callers outside this module must never choose the nonce.
    fn seal_with_nonce(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Envelope> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + plaintext.len());
        bytes.extend_from_slice(nonce);
        bytes.extend_from_slice(&[0u8; TAG_SIZE]);
        bytes.extend_from_slice(plaintext);

        let tag = self
            .cipher
            .encrypt_in_place_detached(
                Nonce::<U16>::from_slice(nonce),
                &[],
                &mut bytes[HEADER_SIZE..],
            )
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        bytes[NONCE_SIZE..HEADER_SIZE].copy_from_slice(&tag);

        Ok(Envelope { bytes })
    }

    /// Verify and open an envelope
    ///
    /// Inputs shorter than [`HEADER_SIZE`] are rejected as
    /// [`CryptoError::Malformed`] before the cipher runs. Any tag mismatch is
    /// reported as [`CryptoError::AuthenticationFailed`]; a wrong key and a
    /// damaged ciphertext are indistinguishable.
    pub fn open(&self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        check_len(envelope.len())?;

        let (nonce, rest) = envelope.split_at(NONCE_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        self.cipher
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(nonce),
                &[],
                buffer.as_mut_slice(),
                Tag::<U16>::from_slice(tag),
            )
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(buffer)
    }
}

/// Seal a plaintext with a generated nonce (convenience function)
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Envelope> {
    EnvelopeCipher::new(key)?.seal(plaintext)
}

/// Verify and open an envelope (convenience function)
pub fn decrypt(key: &SymmetricKey, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    EnvelopeCipher::new(key)?.open(envelope)
}
