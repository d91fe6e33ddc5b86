//! AES-256-GCM authenticated decryption (and the matching encryption).
//!
//! The 16-byte tag is appended to the ciphertext, which is the `aes-gcm`
//! crate's own convention, and no associated data is bound. Tag comparison is
//! constant-time inside the crate; on mismatch no plaintext is released.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use thiserror::Error;

use super::envelope::NONCE_LEN;
use super::kdf::DerivedKey;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The tag did not verify: wrong key, or the nonce, ciphertext, or tag
    /// was altered.
    #[error("authentication tag mismatch")]
    Authentication,

    /// AES-GCM encryption failed (plaintext exceeds the GCM length limit).
    #[error("aead encryption failed")]
    Encryption,
}

/// Decrypt `ciphertext_with_tag` under `key` and `nonce`.
///
/// # Errors
///
/// Returns [`CipherError::Authentication`] if the tag does not verify.
pub fn decrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext_with_tag: &[u8],
) -> Result<Vec<u8>, CipherError> {
    build_cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext_with_tag)
        .map_err(|_| CipherError::Authentication)
}

/// Encrypt `plaintext` under `key` and `nonce`, returning ciphertext with the
/// tag appended.
///
/// The caller is responsible for never reusing a nonce under the same key.
///
/// # Errors
///
/// Returns [`CipherError::Encryption`] on an internal AEAD error.
pub fn encrypt(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    build_cipher(key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CipherError::Encryption)
}

fn build_cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}
