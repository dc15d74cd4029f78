//! Errors surfaced by `gridstatus` subcommands

use crate::fetcher::FetcherError;
use crate::output::OutputError;

/// Failure of a CLI command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The API call (or its configuration) failed
    #[error("request failed: {0}")]
    Fetch(#[from] FetcherError),

    /// The result table could not be written
    #[error("could not write results: {0}")]
    Output(#[from] OutputError),

    /// A flag value could not be interpreted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
