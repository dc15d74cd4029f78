//! Writers for fetched [`ResultTable`](crate::table::ResultTable)s
//!
//! Only CSV is produced; the table's own cell rendering decides how values
//! look on disk.

pub mod csv;

pub use self::csv::{write_csv, CsvTableWriter};

/// Errors while writing a table
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Creating or syncing the destination failed
    #[error("IO error: {0}")]
    IoError(String),

    /// A header or row could not be encoded
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffered rows could not be flushed
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
