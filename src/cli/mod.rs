//! Command-line interface for the `gridstatus` binary

pub mod daily_peak;
pub mod datasets;
pub mod error;
pub mod query;

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::cancel::CancelToken;
use crate::client::GridStatusClient;
use crate::config::{ClientConfig, WireFormat, DEFAULT_HOST, DEFAULT_MAX_RETRIES};

pub use daily_peak::DailyPeakArgs;
pub use datasets::DatasetsArgs;
pub use error::CliError;
pub use query::QueryArgs;

fn parse_wire_format(s: &str) -> Result<WireFormat, String> {
    s.parse::<WireFormat>().map_err(|e| e.to_string())
}

/// GridStatus API client
#[derive(Parser, Debug)]
#[command(name = "gridstatus", version, about)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// API key (falls back to GRIDSTATUS_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Wire format requested from the server (json or csv)
    #[arg(long, global = true, default_value = "json", value_parser = parse_wire_format)]
    pub format: WireFormat,

    /// Retries after HTTP 429 before giving up
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query every page of a dataset and write it as CSV
    Query(QueryArgs),

    /// List available datasets
    Datasets(DatasetsArgs),

    /// Fetch the daily peak report for an ISO
    DailyPeak(DailyPeakArgs),
}

impl Cli {
    /// Resolve the API key and build a client wired to `cancel`
    pub fn build_client(&self, cancel: CancelToken) -> Result<GridStatusClient, CliError> {
        let config = ClientConfig::resolve(self.api_key.clone())?
            .with_host(self.host.clone())
            .with_format(self.format)
            .with_max_retries(self.max_retries)
            .with_request_timeout(Duration::from_secs(self.timeout_secs));

        Ok(GridStatusClient::new(config)?.with_cancel_token(cancel))
    }
}
