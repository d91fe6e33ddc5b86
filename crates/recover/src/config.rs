//! Configuration loading and validation for the recover utility.
//!
//! All values are read from environment variables at startup. CLI flags may
//! override the source URL and output path afterwards. The passphrase itself
//! is not part of the configuration; only the names of its sources are.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL of the base64-encoded envelope. **Required** for `recover`.
    #[serde(default)]
    pub source_url: Option<String>,

    /// Where the recovered plaintext is written.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Name of the environment variable holding the passphrase.
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,

    /// Path of a file holding the passphrase, used instead of the variable.
    #[serde(default)]
    pub passphrase_file: Option<String>,

    /// Upper bound (seconds) on the whole fetch, redirects included.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Largest accepted blob, in bytes.
    #[serde(default = "default_max_blob_bytes")]
    pub max_blob_bytes: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_output_path() -> String {
    "decrypted_keys.txt".into()
}
fn default_passphrase_env() -> String {
    "RECOVER_PASSPHRASE".into()
}
fn default_fetch_timeout() -> u64 {
    30
}
fn default_max_blob_bytes() -> usize {
    1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

/// Environment variables read into [`Config`]. Nothing else is loaded, so the
/// passphrase variable never enters the configuration map.
const KEYS: [&str; 7] = [
    "SOURCE_URL",
    "OUTPUT_PATH",
    "PASSPHRASE_ENV",
    "PASSPHRASE_FILE",
    "FETCH_TIMEOUT_SECS",
    "MAX_BLOB_BYTES",
    "LOG_LEVEL",
];

fn known_vars(getenv: impl Fn(&str) -> Option<String>) -> config::Map<String, String> {
    KEYS.iter()
        .filter_map(|key| getenv(key).map(|value| (key.to_string(), value)))
        .collect()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(known_vars(|key| std::env::var(key).ok()))
    }

    fn from_vars(vars: config::Map<String, String>) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().source(Some(vars)))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Apply CLI overrides and re-validate.
    pub fn with_overrides(mut self, url: Option<String>, output: Option<String>) -> Result<Self> {
        if url.is_some() {
            self.source_url = url;
        }
        if let Some(output) = output {
            self.output_path = output;
        }
        self.validate()?;
        Ok(self)
    }

    /// The source URL, which only the `recover` command needs.
    ///
    /// # Errors
    ///
    /// Returns an error if `SOURCE_URL` was not provided.
    pub fn source_url(&self) -> Result<&str> {
        self.source_url
            .as_deref()
            .context("SOURCE_URL is required (or pass --url)")
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.source_url {
            ensure_non_empty(url, "SOURCE_URL")?;
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                anyhow::bail!("SOURCE_URL must be an http(s) URL");
            }
        }
        ensure_non_empty(&self.output_path, "OUTPUT_PATH")?;
        ensure_non_empty(&self.passphrase_env, "PASSPHRASE_ENV")?;
        if let Some(path) = &self.passphrase_file {
            ensure_non_empty(path, "PASSPHRASE_FILE")?;
        }
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("FETCH_TIMEOUT_SECS must be > 0");
        }
        if self.max_blob_bytes == 0 {
            anyhow::bail!("MAX_BLOB_BYTES must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> Config {
        Config {
            source_url: Some("https://gist.githubusercontent.com/u/raw/keys.txt".into()),
            output_path: default_output_path(),
            passphrase_env: default_passphrase_env(),
            passphrase_file: None,
            fetch_timeout_secs: default_fetch_timeout(),
            max_blob_bytes: default_max_blob_bytes(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_output_path(), "decrypted_keys.txt");
        assert_eq!(default_passphrase_env(), "RECOVER_PASSPHRASE");
        assert_eq!(default_fetch_timeout(), 30);
        assert_eq!(default_max_blob_bytes(), 1_048_576);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_accepts_missing_url() {
        let mut cfg = test_config();
        cfg.source_url = None;
        assert!(cfg.validate().is_ok());
        assert!(cfg.source_url().is_err());
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut cfg = test_config();
        cfg.source_url = Some("file:///etc/passwd".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = test_config();
        cfg.fetch_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_output_path() {
        let mut cfg = test_config();
        cfg.output_path = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overrides_replace_env_values() {
        let mut cfg = test_config();
        cfg.source_url = None;
        let cfg = cfg
            .with_overrides(
                Some("https://example.com/blob".into()),
                Some("out/keys.txt".into()),
            )
            .unwrap();
        assert_eq!(cfg.source_url().unwrap(), "https://example.com/blob");
        assert_eq!(cfg.output_path, "out/keys.txt");
    }

    #[test]
    fn only_known_variables_are_loaded() {
        let vars = known_vars(|key| match key {
            "SOURCE_URL" => Some("https://example.com/blob".into()),
            "FETCH_TIMEOUT_SECS" => Some("10".into()),
            "RECOVER_PASSPHRASE" => Some("hunter2".into()),
            _ => None,
        });
        assert_eq!(vars.len(), 2);
        assert!(!vars.contains_key("RECOVER_PASSPHRASE"));
        assert!(!vars.values().any(|v| v == "hunter2"));
    }

    #[test]
    fn from_vars_reads_values_and_fills_defaults() {
        let vars = known_vars(|key| match key {
            "SOURCE_URL" => Some("https://example.com/blob".into()),
            "FETCH_TIMEOUT_SECS" => Some("10".into()),
            _ => None,
        });
        let cfg = Config::from_vars(vars).unwrap();
        assert_eq!(cfg.source_url().unwrap(), "https://example.com/blob");
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.output_path, "decrypted_keys.txt");
    }

    #[test]
    fn overrides_are_validated() {
        let result = test_config().with_overrides(Some("ftp://x".into()), None);
        assert!(result.is_err());
    }
}
