//! Base64 envelope codec.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Byte length of the PBKDF2 salt at the start of the envelope.
pub const SALT_LEN: usize = 16;

/// Byte length of the AES-GCM nonce following the salt.
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag closing the envelope.
pub const TAG_LEN: usize = 16;

/// Smallest valid envelope: salt, nonce, and a tag over an empty message.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// A decoded envelope, split at the fixed protocol offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Bytes `[0, 16)`.
    pub salt: [u8; SALT_LEN],
    /// Bytes `[16, 28)`.
    pub nonce: [u8; NONCE_LEN],
    /// Bytes `[28, end)`: ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
}

/// Errors produced while decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The input is not valid standard base64.
    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decoded bytes cannot hold a salt, nonce, and tag.
    #[error("envelope is {0} bytes; at least {MIN_ENVELOPE_LEN} required")]
    TooShort(usize),
}

impl Envelope {
    /// Decode base64 text into an [`Envelope`].
    ///
    /// ASCII whitespace anywhere in the input is ignored, so blobs wrapped at
    /// 76 columns or ending in a newline decode the same as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Decode`] for malformed base64 and
    /// [`EnvelopeError::TooShort`] if fewer than [`MIN_ENVELOPE_LEN`] bytes
    /// decode.
    pub fn decode(encoded: &str) -> Result<Self, EnvelopeError> {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD.decode(compact.as_bytes())?;
        Self::from_bytes(&bytes)
    }

    /// Split raw envelope bytes at the protocol offsets.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::TooShort`] if `bytes` is shorter than
    /// [`MIN_ENVELOPE_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(EnvelopeError::TooShort(bytes.len()));
        }
        let (salt_bytes, rest) = bytes.split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            salt,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Concatenate `salt || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Encode to padded standard base64 on a single line.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}
