//! Temporal normalization of merged query results
//!
//! Datetime columns are identified from dataset metadata (plus a fixed set of
//! columns that are always timestamps), parsed into UTC instants, and, when a
//! timezone is requested, localized:
//!
//! - `<base>_utc` columns keep their UTC values and gain a sibling
//!   `<base>_local` column placed right after them
//! - other datetime columns are converted in place and keep their name
//!
//! Running the normalizer on its own output changes nothing.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::dates::{instant_from_millis, parse_instant};
use crate::fetcher::{DatasetMetadata, FetcherError, FetcherResult};
use crate::table::{CellValue, Column, ResultTable};

/// Columns treated as timestamps even when metadata omits them (e.g. after resampling)
pub const ALWAYS_DATETIME_COLUMNS: [&str; 2] = ["interval_start_utc", "interval_end_utc"];

/// Suffix marking a UTC column
pub const UTC_SUFFIX: &str = "_utc";

/// Suffix given to localized copies of UTC columns
pub const LOCAL_SUFFIX: &str = "_local";

/// Whether `name` is a datetime column for this dataset
pub fn is_datetime_column(name: &str, metadata: &DatasetMetadata) -> bool {
    ALWAYS_DATETIME_COLUMNS.contains(&name) || metadata.is_datetime(name)
}

/// Name of the localized sibling of a UTC column
pub fn local_column_name(utc_name: &str) -> String {
    let base = utc_name.strip_suffix(UTC_SUFFIX).unwrap_or(utc_name);
    format!("{base}{LOCAL_SUFFIX}")
}

/// Parse datetime columns and apply the requested timezone.
///
/// # Errors
/// `MalformedTimestamp` if any value of a datetime column is not a timestamp;
/// no partially normalized table is returned in that case
pub fn normalize(
    mut table: ResultTable,
    metadata: &DatasetMetadata,
    timezone: Option<Tz>,
) -> FetcherResult<ResultTable> {
    let datetime_columns: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| is_datetime_column(name, metadata))
        .map(str::to_string)
        .collect();

    let target = timezone.filter(|tz| !is_utc(tz));

    for name in &datetime_columns {
        let Some(index) = table.position(name) else {
            continue;
        };

        let instants = parse_column(&table.columns()[index])?;

        match target {
            None => {
                table.column_mut(index).values = instants.iter().map(to_utc_cell).collect();
            }
            Some(tz) if name.ends_with(UTC_SUFFIX) => {
                table.column_mut(index).values = instants.iter().map(to_utc_cell).collect();
                let local = Column::new(
                    local_column_name(name),
                    instants.iter().map(|ts| to_local_cell(ts, tz)).collect(),
                );
                debug!("Adding localized column {} from {}", local.name, name);
                table.upsert_column(index + 1, local);
            }
            Some(tz) => {
                debug!("Converting column {} to {}", name, tz.name());
                table.column_mut(index).values =
                    instants.iter().map(|ts| to_local_cell(ts, tz)).collect();
            }
        }
    }

    Ok(table)
}

fn is_utc(tz: &Tz) -> bool {
    matches!(tz.name(), "UTC" | "Etc/UTC" | "Etc/Universal" | "Universal" | "Zulu" | "Etc/Zulu")
}

/// Parse every value of `column`; nulls stay missing.
fn parse_column(column: &Column) -> FetcherResult<Vec<Option<DateTime<Utc>>>> {
    column
        .values
        .iter()
        .map(|cell| {
            let parsed = match cell {
                CellValue::Null => return Ok(None),
                CellValue::Instant(ts) => Some(*ts),
                CellValue::LocalInstant(ts) => Some(ts.with_timezone(&Utc)),
                CellValue::String(s) => parse_instant(s, None),
                CellValue::Number(n) => instant_from_millis(*n),
                CellValue::Bool(_) => None,
            };
            parsed.map(Some).ok_or_else(|| FetcherError::MalformedTimestamp {
                column: column.name.clone(),
                value: cell.to_string(),
            })
        })
        .collect()
}

fn to_utc_cell(ts: &Option<DateTime<Utc>>) -> CellValue {
    ts.map(CellValue::Instant).unwrap_or(CellValue::Null)
}

fn to_local_cell(ts: &Option<DateTime<Utc>>, tz: Tz) -> CellValue {
    ts.map(|ts| CellValue::LocalInstant(ts.with_timezone(&tz)))
        .unwrap_or(CellValue::Null)
}
