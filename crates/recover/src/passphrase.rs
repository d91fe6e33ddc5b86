//! Passphrase provisioning from the environment or a secret file.
//!
//! The passphrase is never compiled in. Exactly one source must yield a
//! non-empty value.

use std::fs;

use common::RecoveryError;
use zeroize::Zeroizing;

use crate::config::Config;

/// A passphrase held in a buffer that is zeroed on drop.
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

/// Resolve the passphrase from the sources named in `cfg`.
///
/// `getenv` is injected so tests never touch the process environment.
///
/// # Errors
///
/// Returns [`RecoveryError::Config`] if both sources are set, if neither is,
/// or if the selected source is empty or unreadable.
pub fn resolve(
    cfg: &Config,
    getenv: impl Fn(&str) -> Option<String>,
) -> Result<Passphrase, RecoveryError> {
    let from_env = getenv(&cfg.passphrase_env)
        .map(Zeroizing::new)
        .filter(|v| !v.is_empty());

    match (from_env, cfg.passphrase_file.as_deref()) {
        (Some(_), Some(_)) => Err(RecoveryError::Config(format!(
            "specify at most one of {} and PASSPHRASE_FILE",
            cfg.passphrase_env
        ))),
        (Some(value), None) => Ok(Passphrase(value)),
        (None, Some(path)) => {
            let data = Zeroizing::new(fs::read_to_string(path).map_err(|e| {
                RecoveryError::Config(format!("failed to read passphrase file {path}: {e}"))
            })?);
            let trimmed = data.trim_end_matches(&['\r', '\n'][..]);
            if trimmed.is_empty() {
                return Err(RecoveryError::Config("passphrase file is empty".into()));
            }
            Ok(Passphrase::new(trimmed))
        }
        (None, None) => Err(RecoveryError::Config(format!(
            "no passphrase provided: set {} or PASSPHRASE_FILE",
            cfg.passphrase_env
        ))),
    }
}
