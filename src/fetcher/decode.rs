//! Response body decoding
//!
//! Stateless functions turning a response body into a [`Page`]:
//!
//! - JSON: `{"data": [[header...], [row...], ...], "meta": {...}, "dataset_metadata": {...}}`
//! - CSV: header line plus records; column kinds are inferred per column
//!
//! CSV bodies carry no pagination or column metadata. Callers that use CSV
//! only learn about further pages through the page-size heuristic in the
//! pagination driver.

use serde::Deserialize;
use serde_json::Value;

use crate::config::WireFormat;
use crate::fetcher::page::{DatasetMetadata, Page};
use crate::fetcher::{FetcherError, FetcherResult};
use crate::table::{CellValue, ResultTable};

#[derive(Debug, Deserialize)]
struct JsonBody {
    #[serde(default)]
    data: Vec<Vec<Value>>,
    #[serde(default)]
    meta: Option<JsonMeta>,
    #[serde(default)]
    dataset_metadata: Option<DatasetMetadata>,
}

#[derive(Debug, Deserialize)]
struct JsonMeta {
    #[serde(rename = "hasNextPage", default)]
    has_next_page: Option<bool>,
    #[serde(default)]
    cursor: Option<Value>,
}

/// Cursors are opaque; numbers are echoed back in their JSON text form.
fn cursor_string(cursor: Value) -> Option<String> {
    match cursor {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Decode a body in the given wire format
pub fn decode_page(body: &str, format: WireFormat) -> FetcherResult<Page> {
    match format {
        WireFormat::Json => decode_json(body),
        WireFormat::Csv => decode_csv(body),
    }
}

/// Decode an array-of-arrays JSON body. Row 0 of `data` is the header.
pub fn decode_json(body: &str) -> FetcherResult<Page> {
    let parsed: JsonBody = serde_json::from_str(body)
        .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")))?;

    let table = table_from_array_of_arrays(parsed.data)?;
    let (has_next_page, next_cursor) = match parsed.meta {
        Some(meta) => (
            meta.has_next_page.unwrap_or(false),
            meta.cursor.and_then(cursor_string),
        ),
        None => (false, None),
    };

    Ok(Page::new(
        table,
        has_next_page,
        next_cursor,
        parsed.dataset_metadata,
    ))
}

/// Build a table from `[[header...], [row...], ...]`
pub fn table_from_array_of_arrays(data: Vec<Vec<Value>>) -> FetcherResult<ResultTable> {
    let mut rows = data.into_iter();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(ResultTable::new()),
    };

    let names = header
        .into_iter()
        .map(|cell| match cell {
            Value::String(s) => Ok(s),
            other => Err(FetcherError::ParseError(format!(
                "header cell is not a string: {other}"
            ))),
        })
        .collect::<FetcherResult<Vec<String>>>()?;

    let rows = rows
        .map(|row| row.iter().map(CellValue::from_json).collect())
        .collect();

    ResultTable::from_rows(names, rows)
}

/// Decode a CSV body, inferring one kind per column
pub fn decode_csv(body: &str) -> FetcherResult<Page> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());

    let names: Vec<String> = reader
        .headers()
        .map_err(|e| FetcherError::ParseError(format!("invalid CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for (index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| FetcherError::ParseError(format!("invalid CSV row {index}: {e}")))?;
        if record.len() != names.len() {
            return Err(FetcherError::ParseError(format!(
                "CSV row {index} has {} fields but header has {}",
                record.len(),
                names.len()
            )));
        }
        for (column, field) in raw_columns.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| crate::table::Column::new(name, infer_column(raw)))
        .collect();

    Ok(Page::new(ResultTable::from_columns(columns)?, false, None, None))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsvKind {
    Bool,
    Number,
    Text,
}

/// Pick the narrowest kind every non-empty field satisfies
fn infer_column(raw: Vec<String>) -> Vec<CellValue> {
    let non_empty = || raw.iter().filter(|f| !f.is_empty());

    let kind = if non_empty().all(|f| parse_bool(f).is_some()) && non_empty().next().is_some() {
        CsvKind::Bool
    } else if non_empty().all(|f| f.trim().parse::<f64>().is_ok()) {
        CsvKind::Number
    } else {
        CsvKind::Text
    };

    raw.into_iter()
        .map(|field| {
            if field.is_empty() {
                return CellValue::Null;
            }
            match kind {
                CsvKind::Bool => parse_bool(&field).map(CellValue::Bool).unwrap_or(CellValue::Null),
                CsvKind::Number => field
                    .trim()
                    .parse::<f64>()
                    .map(CellValue::Number)
                    .unwrap_or(CellValue::Null),
                CsvKind::Text => CellValue::String(field),
            }
        })
        .collect()
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
