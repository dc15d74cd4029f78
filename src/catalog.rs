//! Dataset catalog
//!
//! Parses the `/datasets/` listing, filters it by a search term, and renders
//! entries as a two-column key/value table for terminal output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::fetcher::{ColumnDescriptor, FetcherError, FetcherResult};

/// Base URL for per-dataset documentation pages
pub const DATASET_INFO_URL: &str = "https://www.gridstatus.io/datasets";

/// One entry of the dataset catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Dataset id used in query URLs
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text summary
    #[serde(default)]
    pub description: Option<String>,
    /// First timestamp with data, as reported by the server
    #[serde(default)]
    pub earliest_available_time: Option<String>,
    /// Last timestamp with data, as reported by the server
    #[serde(default)]
    pub latest_available_time: Option<String>,
    /// Approximate row count, when the server reports one
    #[serde(default)]
    pub num_rows: Option<u64>,
    /// Column descriptors
    #[serde(default)]
    pub all_columns: Vec<ColumnDescriptor>,
}

impl DatasetDescriptor {
    /// Case-insensitive substring match on id, name, or description
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.id.to_lowercase().contains(&term)
            || self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }

    /// Documentation page for this dataset
    pub fn info_url(&self) -> String {
        format!("{DATASET_INFO_URL}/{}", self.id)
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();

        let mut rows = vec![
            ("Name", self.name.clone()),
            ("ID", self.id.clone()),
            ("Description", or_empty(&self.description)),
            ("Earliest available time", or_empty(&self.earliest_available_time)),
            ("Latest available time", or_empty(&self.latest_available_time)),
        ];

        if let Some(num_rows) = self.num_rows {
            rows.push(("Number of rows", num_rows.to_string()));
        }

        let columns = if self.all_columns.is_empty() {
            "No available columns information.".to_string()
        } else {
            self.all_columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        rows.push(("Available columns", columns));
        rows.push(("More Info", self.info_url()));
        rows
    }
}

impl fmt::Display for DatasetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(["Key", "Value"]);
        for (key, value) in self.rows() {
            builder.push_record([key.to_string(), value]);
        }

        let mut table = builder.build();
        table.with(Style::ascii());
        write!(f, "{table}")
    }
}

/// Keep the entries matching `term`; everything when `term` is `None`.
pub fn filter_datasets(datasets: Vec<DatasetDescriptor>, term: Option<&str>) -> Vec<DatasetDescriptor> {
    match term {
        Some(term) => datasets.into_iter().filter(|d| d.matches(term)).collect(),
        None => datasets,
    }
}

/// Parse a catalog response body.
///
/// `data` may be a list of records or, in array-of-arrays form, a header row
/// followed by value rows.
pub fn parse_catalog(body: &str) -> FetcherResult<Vec<DatasetDescriptor>> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| FetcherError::ParseError(format!("invalid catalog JSON: {e}")))?;

    let data = match root.get("data") {
        Some(Value::Array(data)) => data,
        _ => {
            return Err(FetcherError::ParseError(
                "catalog response has no 'data' array".to_string(),
            ))
        }
    };

    let records = match data.first() {
        Some(Value::Array(header)) => {
            let header = header
                .iter()
                .map(|h| {
                    h.as_str().map(str::to_string).ok_or_else(|| {
                        FetcherError::ParseError(format!("non-string catalog header {h}"))
                    })
                })
                .collect::<FetcherResult<Vec<_>>>()?;

            data[1..]
                .iter()
                .map(|row| record_from_row(&header, row))
                .collect::<FetcherResult<Vec<_>>>()?
        }
        _ => data.clone(),
    };

    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|e| FetcherError::ParseError(format!("invalid catalog entry: {e}")))
        })
        .collect()
}

fn record_from_row(header: &[String], row: &Value) -> FetcherResult<Value> {
    let Value::Array(values) = row else {
        return Err(FetcherError::ParseError(format!("catalog row is not an array: {row}")));
    };
    if values.len() != header.len() {
        return Err(FetcherError::ParseError(format!(
            "catalog row has {} values but header has {}",
            values.len(),
            header.len()
        )));
    }

    let record: Map<String, Value> = header.iter().cloned().zip(values.iter().cloned()).collect();
    Ok(Value::Object(record))
}
