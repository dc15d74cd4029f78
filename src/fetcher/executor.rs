//! Resilient request executor
//!
//! Wraps a [`Transport`] with:
//! - authentication and client identification headers
//! - default `return_format` / `json_schema` parameters
//! - exponential backoff retry on HTTP 429 only
//! - body decoding into a [`Page`]

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cancel::{sleep_or_cancel, CancelToken};
use crate::config::{ClientConfig, WireFormat};
use crate::fetcher::decode::decode_page;
use crate::fetcher::page::Page;
use crate::fetcher::retry::RetryState;
use crate::fetcher::transport::{RawResponse, Transport};
use crate::fetcher::{FetcherError, FetcherResult};

/// Value of the `x-client` header
pub const CLIENT_NAME: &str = "gridstatusio-rust";

/// Value of the `x-client-version` header
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const HTTP_OK: u16 = 200;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Sends requests with retry and decodes their bodies
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    api_key: String,
    format: WireFormat,
    max_retries: u32,
    base_delay: Duration,
}

impl RequestExecutor {
    /// Create an executor using `transport` and the settings in `config`
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            api_key: config.api_key().to_string(),
            format: config.format(),
            max_retries: config.max_retries(),
            base_delay: config.base_delay(),
        }
    }

    /// Configured retry budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Wire format used when the caller does not pick one
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// GET `url` and decode the body in the configured wire format.
    ///
    /// # Errors
    /// - `RateLimitExceeded` once 429 persists past the retry budget
    /// - `RequestFailed` for any other non-200 status (not retried)
    /// - `ParseError` if the body does not decode
    /// - `Cancelled` if `cancel` fires during a backoff wait
    pub async fn execute(
        &self,
        url: &str,
        params: &[(String, String)],
        cancel: Option<&CancelToken>,
    ) -> FetcherResult<Page> {
        let response = self.execute_raw(url, params, cancel).await?;
        let page = decode_page(&response.body, self.format)?;
        debug!(rows = page.meta.row_count, "Decoded {} page", self.format);
        Ok(page)
    }

    /// GET `url` with retry and return the successful response undecoded.
    pub async fn execute_raw(
        &self,
        url: &str,
        params: &[(String, String)],
        cancel: Option<&CancelToken>,
    ) -> FetcherResult<RawResponse> {
        let query = self.with_default_params(params);
        let headers = self.headers();

        debug!("GET {}", url);
        debug!("Params: {:?}", query);

        let mut retry = RetryState::new(self.max_retries, self.base_delay);

        loop {
            let response = self.transport.get(url, &query, &headers).await?;

            match response.status {
                HTTP_OK => {
                    if retry.attempt() > 0 {
                        debug!("Request succeeded after {} retries", retry.attempt());
                    }
                    return Ok(response);
                }
                HTTP_TOO_MANY_REQUESTS if retry.is_exhausted() => {
                    warn!("{}", retry.format_exhausted(url));
                    return Err(FetcherError::RateLimitExceeded {
                        retries: self.max_retries,
                    });
                }
                HTTP_TOO_MANY_REQUESTS => {
                    let delay = retry.advance();
                    warn!("{}", retry.format_retry(delay));
                    sleep_or_cancel(delay, cancel).await?;
                }
                status => {
                    return Err(FetcherError::RequestFailed {
                        status,
                        body: response.body,
                    });
                }
            }
        }
    }

    /// Caller params plus `return_format` (and `json_schema` for JSON) unless
    /// the caller already chose a format.
    fn with_default_params(&self, params: &[(String, String)]) -> Vec<(String, String)> {
        let mut query = params.to_vec();
        if !query.iter().any(|(k, _)| k == "return_format") {
            query.push(("return_format".to_string(), self.format.as_str().to_string()));
            if self.format == WireFormat::Json {
                query.push(("json_schema".to_string(), "array-of-arrays".to_string()));
            }
        }
        query
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("x-api-key".to_string(), self.api_key.clone()),
            ("x-client".to_string(), CLIENT_NAME.to_string()),
            ("x-client-version".to_string(), CLIENT_VERSION.to_string()),
        ]
    }
}
