//! Client configuration and retry constants
//!
//! Everything in this module is resolved once, when a client is constructed.
//! The fetch engine never reads the process environment itself; the only
//! place that does is [`ClientConfig::from_env`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::fetcher::{FetcherError, FetcherResult};

/// Environment variable consulted by [`ClientConfig::from_env`]
pub const API_KEY_ENV_VAR: &str = "GRIDSTATUS_API_KEY";

/// Default API host
pub const DEFAULT_HOST: &str = "https://api.gridstatus.io/v1";

/// Default number of retries after an HTTP 429 response.
/// 3 retries waits 1s + 2s + 4s before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds, doubled on every retry.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds) - overall time for the entire request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Calculate the exponential backoff delay for a zero-based retry attempt.
///
/// `base * 2^attempt`, saturating instead of overflowing for absurd attempt counts.
pub fn calculate_backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Body format requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON array-of-arrays with pagination and column metadata
    #[default]
    Json,
    /// Delimited text; carries no pagination or column metadata
    Csv,
}

impl WireFormat {
    /// Value sent as the `return_format` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = FetcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "csv" => Ok(WireFormat::Csv),
            _ => Err(FetcherError::ConfigurationError(format!(
                "request format must be 'json' or 'csv', got '{s}'"
            ))),
        }
    }
}

/// Immutable configuration shared by every request a client makes
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    host: String,
    format: WireFormat,
    max_retries: u32,
    base_delay: Duration,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with an explicit API key and default settings.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the key is empty
    pub fn new(api_key: impl Into<String>) -> FetcherResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(FetcherError::ConfigurationError(
                "API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            host: DEFAULT_HOST.to_string(),
            format: WireFormat::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            request_timeout: Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
        })
    }

    /// Build a configuration using the `GRIDSTATUS_API_KEY` environment variable.
    pub fn from_env() -> FetcherResult<Self> {
        Self::resolve(None)
    }

    /// Use `explicit` when given, otherwise fall back to the environment.
    pub fn resolve(explicit: Option<String>) -> FetcherResult<Self> {
        let api_key = explicit
            .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FetcherError::ConfigurationError(format!(
                    "No API key provided. Either pass an API key explicitly or set the {API_KEY_ENV_VAR} environment variable"
                ))
            })?;
        Self::new(api_key)
    }

    /// Override the API host (trailing slashes are dropped)
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the wire format
    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Override the number of retries after HTTP 429
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the first backoff delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Override the overall per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// API key sent in the `x-api-key` header
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// API host without trailing slash
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Wire format requested from the server
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Retries allowed after HTTP 429
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// First backoff delay
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Overall per-request timeout
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// TCP connect timeout
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("format", &self.format)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
