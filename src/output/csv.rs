//! CSV output for [`ResultTable`]
//!
//! Writes one header row followed by one record per table row. Null cells are
//! empty fields; instants are RFC 3339 with their offset.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::Writer;
use tracing::{debug, info};

use super::{OutputError, OutputResult};
use crate::table::ResultTable;

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// CSV writer over any byte sink
pub struct CsvTableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl CsvTableWriter<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed
    pub fn create<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::IoError(format!("Failed to create directory: {}", e))
                })?;
            }
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;

        Ok(Self::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file)))
    }
}

impl<W: Write> CsvTableWriter<W> {
    /// Wrap an existing sink such as stdout
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::from_writer(inner),
            rows_written: 0,
        }
    }

    /// Rows written so far, header excluded
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write the header and every row of `table`
    pub fn write_table(&mut self, table: &ResultTable) -> OutputResult<()> {
        self.writer
            .write_record(table.column_names())
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {}", e)))?;

        for index in 0..table.num_rows() {
            let Some(row) = table.row(index) else {
                break;
            };
            self.writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| OutputError::CsvError(format!("Failed to write row: {}", e)))?;
            self.rows_written += 1;
        }

        debug!("Wrote {} rows", self.rows_written);
        Ok(())
    }

    /// Flush buffered data
    pub fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {}", e)))
    }

    /// Flush and return the underlying sink
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {}", e)))
    }
}

/// Write `table` to `path` as CSV and flush it to disk
pub fn write_csv<P: AsRef<Path>>(table: &ResultTable, path: P) -> OutputResult<u64> {
    let mut writer = CsvTableWriter::create(path)?;
    writer.write_table(table)?;
    let rows = writer.rows_written();

    let buf_writer = writer.into_inner()?;
    let file = buf_writer
        .into_inner()
        .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {}", e)))?;
    file.sync_all()
        .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))?;

    info!("CSV written: {} rows", rows);
    Ok(rows)
}
