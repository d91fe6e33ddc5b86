//! Retrieval of the encoded blob.
//!
//! The pipeline never performs I/O itself; the [`Fetcher`] capability is
//! injected into [`crate::app::run_recovery`] so tests can substitute a mock.
//! No retries happen here: a failed fetch is reported once, as
//! [`RecoveryError::Network`].

pub mod http;

pub use http::HttpFetcher;

use std::time::Duration;

use async_trait::async_trait;
use common::RecoveryError;
use thiserror::Error;

/// Errors produced while fetching the blob.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL (or a redirect target) could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The TLS client could not be configured.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Connecting, sending, or reading the response failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The whole fetch did not finish within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// A redirect tried to leave HTTPS for plain HTTP.
    #[error("refusing redirect from https to {0}")]
    InsecureRedirect(String),

    /// More redirects than allowed were followed.
    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// The body exceeded the configured size limit.
    #[error("response body exceeds {0} bytes")]
    TooLarge(usize),

    /// The body was empty or whitespace only.
    #[error("response body is empty")]
    Empty,
}

impl From<FetchError> for RecoveryError {
    fn from(e: FetchError) -> Self {
        RecoveryError::Network(e.to_string())
    }
}

/// Capability: given a URL, return the raw response bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
