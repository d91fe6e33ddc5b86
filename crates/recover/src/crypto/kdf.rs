//! PBKDF2-HMAC-SHA256 key derivation.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// PBKDF2 iteration count fixed by the envelope format.
pub const ITERATIONS: u32 = 20_000;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced by key derivation.
#[derive(Debug, Error)]
pub enum KdfError {
    /// The iteration count must be at least one.
    #[error("PBKDF2 iterations must be >= 1")]
    ZeroIterations,

    /// The requested key length does not match the cipher key size.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),
}

/// A symmetric key derived from a passphrase.
///
/// Lives only for the duration of a single decryption. The buffer is zeroed
/// on drop and never printed.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a key from `passphrase` and `salt`.
///
/// The work is proportional to `iterations`; that cost is the point of the
/// function and there is no shortcut path.
///
/// # Errors
///
/// Returns [`KdfError::ZeroIterations`] if `iterations` is zero and
/// [`KdfError::InvalidKeyLength`] if `key_len` is not [`KEY_LEN`].
pub fn derive(
    passphrase: &str,
    salt: &[u8],
    iterations: u32,
    key_len: usize,
) -> Result<DerivedKey, KdfError> {
    if iterations == 0 {
        return Err(KdfError::ZeroIterations);
    }
    if key_len != KEY_LEN {
        return Err(KdfError::InvalidKeyLength(key_len));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, iterations, &mut key[..])
        .map_err(|_| KdfError::InvalidKeyLength(key_len))?;
    Ok(DerivedKey(key))
}
