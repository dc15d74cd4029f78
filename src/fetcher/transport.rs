//! HTTP transport
//!
//! One GET, one response. Retry policy belongs to the executor above; the
//! transport only reports what the server said.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::fetcher::{FetcherError, FetcherResult};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Body decoded as text
    pub body: String,
}

impl RawResponse {
    /// Convenience constructor
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs a single HTTP GET
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `GET url?query` with `headers`.
    ///
    /// Any status code is a successful exchange; only failures to get a
    /// response at all are errors.
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
    ) -> FetcherResult<RawResponse>;
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the timeouts from `config`.
    ///
    /// # Errors
    /// `ConfigurationError` if the TLS backend cannot be initialized
    pub fn new(config: &ClientConfig) -> FetcherResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                FetcherError::ConfigurationError(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(String, String)],
    ) -> FetcherResult<RawResponse> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetcherError::NetworkError(format!("request to {url} timed out: {e}"))
            } else {
                FetcherError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("failed to read body: {e}")))?;

        debug!(status, bytes = body.len(), "GET {} completed", url);
        Ok(RawResponse { status, body })
    }
}
