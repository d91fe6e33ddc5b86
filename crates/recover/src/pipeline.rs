//! Decryption pipeline: encoded blob + passphrase → plaintext text.
//!
//! ```text
//! Start → Decoded → KeyDerived → Decrypted → TextDecoded → Done
//!    \________\__________\___________\____________→ Failed(kind)
//! ```
//!
//! Every call is independent and synchronous. The envelope and derived key are
//! call-local and dropped before returning, so concurrent calls need no locking.
//! No stage ever hands back a partial buffer.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use common::RecoveryError;
use tracing::debug;
use zeroize::Zeroize;

use crate::crypto::{
    cipher::{self, CipherError},
    envelope::{Envelope, EnvelopeError},
    kdf::{self, KdfError},
    ITERATIONS, KEY_LEN, NONCE_LEN, SALT_LEN,
};

impl From<EnvelopeError> for RecoveryError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Decode(_) => RecoveryError::Decode(e.to_string()),
            EnvelopeError::TooShort(_) => RecoveryError::Format(e.to_string()),
        }
    }
}

impl From<KdfError> for RecoveryError {
    fn from(e: KdfError) -> Self {
        RecoveryError::Parameter(e.to_string())
    }
}

impl From<CipherError> for RecoveryError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::Authentication => RecoveryError::Authentication,
            // Only reachable on the seal path.
            CipherError::Encryption => RecoveryError::Parameter(e.to_string()),
        }
    }
}

/// Recover the plaintext text sealed in `encoded` under `passphrase`.
///
/// # Errors
///
/// - [`RecoveryError::Decode`] if `encoded` is not base64.
/// - [`RecoveryError::Format`] if the envelope is too short.
/// - [`RecoveryError::Authentication`] if the passphrase is wrong or the data
///   was altered.
/// - [`RecoveryError::TextDecode`] if the plaintext is not UTF-8.
pub fn recover(encoded: &str, passphrase: &str) -> Result<String, RecoveryError> {
    let envelope = Envelope::decode(encoded)?;
    debug!(
        ciphertext_len = envelope.ciphertext.len(),
        "envelope decoded"
    );

    let key = kdf::derive(passphrase, &envelope.salt, ITERATIONS, KEY_LEN)?;
    debug!(iterations = ITERATIONS, "key derived");

    let plaintext = cipher::decrypt(&key, &envelope.nonce, &envelope.ciphertext)?;
    drop(key);
    debug!(plaintext_len = plaintext.len(), "envelope decrypted");

    String::from_utf8(plaintext).map_err(|e| {
        let valid_up_to = e.utf8_error().valid_up_to();
        e.into_bytes().zeroize();
        RecoveryError::TextDecode(format!(
            "plaintext is not valid UTF-8 (invalid sequence at byte {valid_up_to})"
        ))
    })
}

/// Seal `plaintext` under `passphrase` into a blob [`recover`] accepts.
///
/// A fresh random salt and nonce are drawn from the OS CSPRNG on every call.
///
/// # Errors
///
/// Returns [`RecoveryError::Parameter`] if the AEAD layer rejects the input.
pub fn seal(plaintext: &str, passphrase: &str) -> Result<String, RecoveryError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);
    seal_with(plaintext, passphrase, salt, nonce)
}

/// Seal with caller-chosen salt and nonce.
fn seal_with(
    plaintext: &str,
    passphrase: &str,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
) -> Result<String, RecoveryError> {
    let key = kdf::derive(passphrase, &salt, ITERATIONS, KEY_LEN)?;
    let ciphertext = cipher::encrypt(&key, &nonce, plaintext.as_bytes())?;
    Ok(Envelope {
        salt,
        nonce,
        ciphertext,
    }
    .encode())
}
