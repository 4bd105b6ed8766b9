//! HTTP transport for signed Product Advertising API requests.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Fetches the body behind a signed URL - enables mocking for tests.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Performs a GET request and returns the raw response body.
    ///
    /// No retries are attempted.
    async fn execute(&self, url: &str) -> Result<Vec<u8>>;
}

/// wreq-backed fetcher used by the API client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a fetcher using the timeout and proxy from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_options(Duration::from_secs(config.timeout_secs), config.proxy.as_deref())
    }

    /// Creates a fetcher with an explicit timeout and optional proxy URL.
    pub fn with_options(timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)));

        if let Some(proxy_url) = proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).map_err(|e| transport_error(proxy_url, e))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| transport_error("client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for HttpClient {
    async fn execute(&self, url: &str) -> Result<Vec<u8>> {
        info!("Fetching {}", redact_signature(url));

        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml,text/xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        // The service reports failures inside the XML body, so the body is kept.
        if !status.is_success() {
            warn!("Request returned status {}", status);
        }

        let body = response.bytes().await.map_err(|e| transport_error(url, e))?;
        Ok(body.to_vec())
    }
}

// wreq includes the request URL in its messages, so the reason is redacted too.
fn transport_error(url: &str, err: impl std::fmt::Display) -> Error {
    Error::Transport { url: redact_signature(url), reason: redact_signature(&err.to_string()) }
}

/// Replaces the signature value of a signed URL for logging.
pub fn redact_signature(url: &str) -> String {
    match url.find("Signature=") {
        Some(idx) => {
            let start = idx + "Signature=".len();
            let end = url[start..]
                .find(|c: char| c == '&' || c == ')' || c.is_whitespace())
                .map_or(url.len(), |i| start + i);
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}
