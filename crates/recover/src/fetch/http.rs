//! HTTPS fetcher built on the hyper client and rustls.
//!
//! The whole fetch (connect, redirects, body) is bounded by one timeout.
//! Certificates are verified against the bundled webpki roots.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper::{
    body::Incoming,
    header::{LOCATION, USER_AGENT},
    http::uri::Scheme,
    Request, Uri,
};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tracing::{debug, info};

use super::{FetchError, Fetcher};

/// Maximum number of redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

const USER_AGENT_VALUE: &str = concat!("recover/", env!("CARGO_PKG_VERSION"));

/// [`Fetcher`] that performs a single HTTP(S) `GET`.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a fetcher with the given overall `timeout` and body size limit.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Tls`] if the rustls client configuration cannot
    /// be built.
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(|e| FetchError::Tls(e.to_string()))?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            client,
            timeout,
            max_body_bytes,
        })
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut uri = parse_url(url)?;

        for hop in 0..=MAX_REDIRECTS {
            let req = Request::get(uri.clone())
                .header(USER_AGENT, USER_AGENT_VALUE)
                .body(Empty::<Bytes>::new())
                .map_err(|e| FetchError::Request(e.to_string()))?;

            let resp = self
                .client
                .request(req)
                .await
                .map_err(|e| FetchError::Request(e.to_string()))?;

            let status = resp.status();
            debug!(hop, status = status.as_u16(), "response received");

            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(FetchError::Status(status.as_u16()))?;
                uri = resolve_location(&uri, location)?;
                debug!(%uri, "following redirect");
                continue;
            }
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            return read_body(resp.into_body(), self.max_body_bytes).await;
        }

        Err(FetchError::TooManyRedirects(MAX_REDIRECTS))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let body = tokio::time::timeout(self.timeout, self.get(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;
        info!(bytes = body.len(), "blob fetched");
        Ok(body)
    }
}

fn parse_url(url: &str) -> Result<Uri, FetchError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| FetchError::InvalidUrl(url.to_owned()))?;
    match uri.scheme_str() {
        Some("http") | Some("https") if uri.host().is_some() => Ok(uri),
        _ => Err(FetchError::InvalidUrl(url.to_owned())),
    }
}

/// Resolve a `Location` header against the URI that produced it.
///
/// Absolute locations are used as-is. Absolute-path locations inherit the
/// scheme and authority of `base`; path-relative ones also replace the last
/// segment of its path. Dot segments are not normalised.
///
/// A redirect from `https` to any other scheme is refused.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri, FetchError> {
    let invalid = || FetchError::InvalidUrl(location.to_owned());

    let next = match location.parse::<Uri>() {
        Ok(absolute) if absolute.scheme().is_some() => absolute,
        _ => {
            let path = if location.starts_with('/') {
                location.to_owned()
            } else {
                let dir = base.path().rsplit_once('/').map_or("", |(dir, _)| dir);
                format!("{dir}/{location}")
            };
            let target: Uri = path.parse().map_err(|_| invalid())?;
            let mut parts = target.into_parts();
            parts.scheme = base.scheme().cloned();
            parts.authority = base.authority().cloned();
            Uri::from_parts(parts).map_err(|_| invalid())?
        }
    };

    if base.scheme() == Some(&Scheme::HTTPS) && next.scheme() != Some(&Scheme::HTTPS) {
        return Err(FetchError::InsecureRedirect(next.to_string()));
    }
    Ok(next)
}

async fn read_body(body: Incoming, limit: usize) -> Result<Vec<u8>, FetchError> {
    let collected = Limited::new(body, limit).collect().await.map_err(|e| {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            FetchError::TooLarge(limit)
        } else {
            FetchError::Request(e.to_string())
        }
    })?;

    let bytes = collected.to_bytes();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::Empty);
    }
    Ok(bytes.to_vec())
}
