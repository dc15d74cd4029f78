//! Data-fetch engine
//!
//! Layers, leaves first:
//!
//! - [`transport`] - a single HTTP GET, no retries
//! - [`executor`] - 429 backoff around the transport plus body decoding
//! - [`pagination`] - walks every page of a query and merges the results
//!
//! Temporal normalization of the merged table lives in [`crate::normalize`].

pub mod decode;
pub mod executor;
pub mod page;
pub mod pagination;
pub mod retry;
pub mod transport;

pub use executor::RequestExecutor;
pub use page::{ColumnDescriptor, DatasetMetadata, Page, PageMeta};
pub use pagination::PaginationDriver;
pub use transport::{RawResponse, ReqwestTransport, Transport};

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Invalid client or request configuration, detected before any request
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// HTTP 429 persisted after every allowed retry
    #[error("rate limited: exceeded maximum number of retries ({retries})")]
    RateLimitExceeded {
        /// Retries that were attempted
        retries: u32,
    },

    /// Non-200, non-429 response
    #[error("request failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Server violated the pagination contract
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// A datetime column held a value that is not a timestamp
    #[error("malformed timestamp in column '{column}': {value}")]
    MalformedTimestamp {
        /// Column being parsed
        column: String,
        /// Offending value
        value: String,
    },

    /// Connection, timeout, or other transport failure
    #[error("network error: {0}")]
    NetworkError(String),

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),

    /// The fetch was cancelled by the caller
    #[error("fetch cancelled")]
    Cancelled,
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;
