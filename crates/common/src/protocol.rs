//! Outcome reports printed on stdout when a run finishes.
//!
//! Each run prints exactly one JSON line: a [`RecoveryReport`] or
//! [`SealReport`] on success, an [`ErrorReport`] on failure. Reports describe
//! what happened; they never contain secret material.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, RecoveryError};

// ---------------------------------------------------------------------------
// Recover
// ---------------------------------------------------------------------------

/// Successful outcome of a `recover` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Always `"ok"`.
    pub status: String,
    /// Path the plaintext was written to.
    pub output_path: String,
    /// Number of plaintext bytes written.
    pub bytes_written: usize,
    /// Number of lines in the recovered text.
    pub lines: usize,
}

impl RecoveryReport {
    /// Build a report for `plaintext` written to `output_path`.
    pub fn new(output_path: impl Into<String>, plaintext: &str) -> Self {
        Self {
            status: "ok".into(),
            output_path: output_path.into(),
            bytes_written: plaintext.len(),
            lines: plaintext.lines().count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Seal
// ---------------------------------------------------------------------------

/// Successful outcome of a `seal` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealReport {
    /// Always `"ok"`.
    pub status: String,
    /// The base64 envelope, ready to publish.
    pub blob: String,
}

impl SealReport {
    pub fn new(blob: impl Into<String>) -> Self {
        Self {
            status: "ok".into(),
            blob: blob.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error report
// ---------------------------------------------------------------------------

/// Standard error report printed on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Always `"error"`.
    pub status: String,
    /// Which stage failed.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl From<&RecoveryError> for ErrorReport {
    fn from(e: &RecoveryError) -> Self {
        Self {
            status: "error".into(),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_report_counts_bytes_and_lines() {
        let r = RecoveryReport::new("out.txt", "openai:sk-1\nliara:eyJ\n");
        assert_eq!(r.status, "ok");
        assert_eq!(r.bytes_written, 22);
        assert_eq!(r.lines, 2);
    }

    #[test]
    fn error_report_from_error() {
        let r = ErrorReport::from(&RecoveryError::Authentication);
        assert_eq!(r.kind, ErrorKind::Authentication);
        assert!(r.message.contains("authentication failed"));

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "authentication");
    }

    #[test]
    fn seal_report_serde() {
        let r = SealReport::new("AAAA");
        let json = serde_json::to_string(&r).unwrap();
        let decoded: SealReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, r);
    }
}
