//! Single-response payloads and the column metadata that rides along with them

use serde::{Deserialize, Serialize};

use crate::table::ResultTable;

/// Descriptor of one dataset column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Whether values are timestamps
    #[serde(default)]
    pub is_datetime: bool,
}

/// Column metadata for a dataset query; identical on every page of one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Every column the dataset exposes
    #[serde(default)]
    pub all_columns: Vec<ColumnDescriptor>,
}

impl DatasetMetadata {
    /// Whether the metadata marks `name` as a datetime column
    pub fn is_datetime(&self, name: &str) -> bool {
        self.all_columns
            .iter()
            .any(|c| c.name == name && c.is_datetime)
    }
}

/// Pagination state reported with a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// Server has more rows after this page
    pub has_next_page: bool,
    /// Opaque token to request the next page (cursor pagination)
    pub next_cursor: Option<String>,
    /// Rows actually decoded from this page
    pub row_count: usize,
}

/// One decoded response
#[derive(Debug, Clone)]
pub struct Page {
    /// Rows of this page
    pub table: ResultTable,
    /// Pagination fields
    pub meta: PageMeta,
    /// Column metadata, absent for CSV bodies
    pub dataset_metadata: Option<DatasetMetadata>,
}

impl Page {
    /// Build a page; `row_count` is always taken from the decoded table.
    pub fn new(
        table: ResultTable,
        has_next_page: bool,
        next_cursor: Option<String>,
        dataset_metadata: Option<DatasetMetadata>,
    ) -> Self {
        let row_count = table.num_rows();
        Self {
            table,
            meta: PageMeta {
                has_next_page,
                next_cursor,
                row_count,
            },
            dataset_metadata,
        }
    }
}
