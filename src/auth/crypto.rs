//! AES-256-GCM sealing for stored records
//!
//! Blob layout: `[12-byte nonce][ciphertext + 16-byte tag]`. A fresh random
//! nonce is drawn for every call, so the same plaintext never produces the
//! same blob twice under one key.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::StoreError;

/// Nonce size for AES-256-GCM (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Key size for AES-256-GCM (256 bits)
pub const KEY_SIZE: usize = 32;

/// Per-store symmetric key, wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Draws a fresh random key from the OS RNG
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&key);
        Self(bytes)
    }

    /// Builds a key from raw bytes; `None` unless exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_SIZE {
            return None;
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Some(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// Authenticated cipher bound to one key
pub struct Cipher {
    cipher: Aes256Gcm,
}

impl Cipher {
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Seals `plaintext` and prepends the nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, StoreError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| StoreError::Encrypt("AES-GCM seal failed".into()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Splits off the nonce and opens the remainder
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, StoreError> {
        if blob.len() < NONCE_SIZE {
            return Err(StoreError::ShortCiphertext { len: blob.len() });
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| StoreError::Decrypt("authentication tag mismatch".into()))
    }
}
