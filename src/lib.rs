//! # GridStatus API Client
//!
//! Async client for the GridStatus energy-market data API. A dataset query
//! is split by the server into pages; this library walks every page, retries
//! rate-limited requests with exponential backoff, merges the pages in order,
//! and normalizes timestamp columns into UTC or a requested timezone.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gridstatus_client::{ClientConfig, FetchRequest, GridStatusClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GridStatusClient::new(ClientConfig::from_env()?)?;
//!
//! let request = FetchRequest::new("isone_fuel_mix")
//!     .limit(10_000)
//!     .timezone("America/New_York");
//!
//! let table = client.fetch(&request).await?;
//! println!("{} rows", table.num_rows());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - API key resolution and client settings
//! - [`request`] - Immutable description of one dataset query
//! - [`fetcher`] - Transport, 429 retry, page decoding, and pagination
//! - [`normalize`] - Timestamp parsing and timezone localization
//! - [`table`] - Column-oriented result table
//! - [`catalog`] - Dataset listing and filtering
//! - [`client`] - Facade tying it all together
//! - [`output`] - CSV writers
//! - [`cli`] - The `gridstatus` command

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Cooperative cancellation
pub mod cancel;

/// Dataset catalog
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// High-level client
pub mod client;

/// Client configuration
pub mod config;

/// Timestamp and timezone parsing
pub mod dates;

/// Data-fetch engine
pub mod fetcher;

/// Temporal normalization
pub mod normalize;

/// Result writers
pub mod output;

/// Per-page progress reporting
pub mod progress;

/// Query description
pub mod request;

/// Tabular results
pub mod table;

pub use cancel::CancelToken;
pub use catalog::DatasetDescriptor;
pub use client::GridStatusClient;
pub use config::{ClientConfig, WireFormat};
pub use fetcher::{FetcherError, FetcherResult};
pub use request::{
    AggregationFunction, FetchRequest, Filter, FilterOperator, FilterValue, PaginationMode,
    PublishTime, Resample,
};
pub use table::{CellValue, Column, ResultTable};
