//! Column-oriented result table.
//!
//! Cells are restricted to a small closed set of kinds so that the normalizer
//! can reason about every value it sees. Row order is whatever order rows were
//! appended in; nothing in this module ever sorts.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::fetcher::{FetcherError, FetcherResult};

/// A single scalar cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Any numeric value
    Number(f64),
    /// Text, including not-yet-parsed timestamps
    String(String),
    /// Instant in UTC
    Instant(DateTime<Utc>),
    /// Instant rendered in a named timezone
    LocalInstant(DateTime<Tz>),
}

impl CellValue {
    /// Convert a decoded JSON cell. Nested arrays/objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::String(s.clone()),
            other => CellValue::String(other.to_string()),
        }
    }

    /// Whether the cell is [`CellValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The instant this cell denotes, if it already holds one
    pub fn as_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Instant(dt) => Some(*dt),
            CellValue::LocalInstant(dt) => Some(dt.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Text cell contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric cell contents
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            // Whole numbers print without a trailing ".0"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::String(s) => f.write_str(s),
            CellValue::Instant(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            CellValue::LocalInstant(dt) => {
                f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
        }
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Cell values, one per row
    pub values: Vec<CellValue>,
}

impl Column {
    /// Create a column
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered set of equally long, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl ResultTable {
    /// Empty table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from row-major data.
    ///
    /// # Errors
    /// `ParseError` if a row width differs from the header width or a column
    /// name repeats
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<CellValue>>) -> FetcherResult<Self> {
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(FetcherError::ParseError(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }

        let num_rows = rows.len();
        let mut values: Vec<Vec<CellValue>> = names
            .iter()
            .map(|_| Vec::with_capacity(num_rows))
            .collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(FetcherError::ParseError(format!(
                    "row {index} has {} cells but header has {} columns",
                    row.len(),
                    names.len()
                )));
            }
            for (column, cell) in values.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, values))
            .collect();

        Ok(Self { columns, num_rows })
    }

    /// Build a table from columns.
    ///
    /// # Errors
    /// `ParseError` on differing column lengths or duplicate names
    pub fn from_columns(columns: Vec<Column>) -> FetcherResult<Self> {
        let num_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.values.len() != num_rows {
                return Err(FetcherError::ParseError(format!(
                    "column '{}' has {} values, expected {num_rows}",
                    column.name,
                    column.values.len()
                )));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(FetcherError::ParseError(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Concatenate tables vertically, preserving their order and in-table row order.
    ///
    /// Column order follows first appearance. A column missing from one of the
    /// tables is filled with nulls for that table's rows.
    pub fn concat(tables: Vec<ResultTable>) -> ResultTable {
        let mut names: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !names.contains(&column.name) {
                    names.push(column.name.clone());
                }
            }
        }

        let num_rows: usize = tables.iter().map(|t| t.num_rows).sum();
        let mut merged: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(num_rows)))
            .collect();

        for table in tables {
            let rows = table.num_rows;
            let mut incoming = table.columns;
            for column in merged.iter_mut() {
                match incoming.iter().position(|c| c.name == column.name) {
                    Some(pos) => column.values.append(&mut incoming[pos].values),
                    None => column
                        .values
                        .extend(std::iter::repeat(CellValue::Null).take(rows)),
                }
            }
        }

        ResultTable {
            columns: merged,
            num_rows,
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cells of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&CellValue>> {
        if index >= self.num_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub(crate) fn column_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }

    /// Replace the column named like `column` or insert it at `index`.
    pub(crate) fn upsert_column(&mut self, index: usize, column: Column) {
        debug_assert_eq!(column.values.len(), self.num_rows);
        match self.position(&column.name) {
            Some(existing) => self.columns[existing] = column,
            None => self.columns.insert(index.min(self.columns.len()), column),
        }
    }
}
