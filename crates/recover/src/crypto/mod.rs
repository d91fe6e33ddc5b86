//! Passphrase-based envelope cryptography: codec, key derivation, AEAD.
//!
//! This module is intentionally free of network, filesystem, and logging
//! dependencies. It provides the primitives composed by [`crate::pipeline`].
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[16] || nonce[12] || ciphertext[N] || tag[16] )
//! ```
//!
//! The key is PBKDF2-HMAC-SHA256(passphrase, salt, 20 000 iterations, 32 bytes)
//! and the cipher is AES-256-GCM with no associated data. The offsets and
//! parameters are fixed by the format; blobs produced elsewhere depend on them.

pub mod cipher;
pub mod envelope;
pub mod kdf;

pub use envelope::{NONCE_LEN, SALT_LEN};
pub use kdf::{ITERATIONS, KEY_LEN};
