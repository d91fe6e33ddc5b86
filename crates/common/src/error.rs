//! Common error types shared across crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level recovery error type.
///
/// Each variant names the stage that failed. Messages are safe to print: they
/// never carry the passphrase, derived key, or recovered plaintext.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// Fetching the encoded blob failed (connect, TLS, status, timeout, size).
    #[error("network error: {0}")]
    Network(String),

    /// The fetched text is not valid base64.
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoded envelope is structurally invalid (too short).
    #[error("format error: {0}")]
    Format(String),

    /// A key-derivation parameter was rejected.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// The authentication tag did not verify.
    ///
    /// A wrong passphrase and tampered data are indistinguishable here.
    #[error("authentication failed: wrong passphrase or corrupted data")]
    Authentication,

    /// Decryption succeeded but the plaintext is not valid UTF-8.
    #[error("text decode error: {0}")]
    TextDecode(String),

    /// Writing the recovered plaintext failed.
    #[error("persist error: {0}")]
    Persist(String),

    /// Configuration or secret provisioning is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Machine-readable error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Decode,
    Format,
    Parameter,
    Authentication,
    TextDecode,
    Persist,
    Config,
}

impl ErrorKind {
    /// The snake_case name used in reports and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Decode => "decode",
            ErrorKind::Format => "format",
            ErrorKind::Parameter => "parameter",
            ErrorKind::Authentication => "authentication",
            ErrorKind::TextDecode => "text_decode",
            ErrorKind::Persist => "persist",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecoveryError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecoveryError::Network(_) => ErrorKind::Network,
            RecoveryError::Decode(_) => ErrorKind::Decode,
            RecoveryError::Format(_) => ErrorKind::Format,
            RecoveryError::Parameter(_) => ErrorKind::Parameter,
            RecoveryError::Authentication => ErrorKind::Authentication,
            RecoveryError::TextDecode(_) => ErrorKind::TextDecode,
            RecoveryError::Persist(_) => ErrorKind::Persist,
            RecoveryError::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns the process exit code that should be used for this error.
    ///
    /// Every failure exits with `1`; `0` is reserved for success.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_exits_non_zero() {
        let errors = [
            RecoveryError::Network("x".into()),
            RecoveryError::Decode("x".into()),
            RecoveryError::Format("x".into()),
            RecoveryError::Parameter("x".into()),
            RecoveryError::Authentication,
            RecoveryError::TextDecode("x".into()),
            RecoveryError::Persist("x".into()),
            RecoveryError::Config("x".into()),
        ];
        for e in &errors {
            assert_eq!(e.exit_code(), 1, "{e}");
        }
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(RecoveryError::Network("x".into()).kind(), ErrorKind::Network);
        assert_eq!(RecoveryError::Authentication.kind(), ErrorKind::Authentication);
        assert_eq!(
            RecoveryError::TextDecode("x".into()).kind(),
            ErrorKind::TextDecode
        );
    }

    #[test]
    fn display_includes_message() {
        let e = RecoveryError::Format("envelope is 12 bytes".into());
        assert!(e.to_string().contains("envelope is 12 bytes"));
    }

    #[test]
    fn kind_serialises_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::TextDecode).unwrap();
        assert_eq!(json, "\"text_decode\"");
        assert_eq!(ErrorKind::TextDecode.to_string(), "text_decode");
    }
}
