//! `query` command: fetch every page of a dataset and write it as CSV

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Args;
use tracing::info;

use super::CliError;
use crate::client::GridStatusClient;
use crate::dates::{parse_instant, parse_timezone};
use crate::output::{write_csv, CsvTableWriter};
use crate::request::{
    AggregationFunction, FetchRequest, Filter, FilterOperator, FilterValue, PaginationMode,
    PublishTime, Resample,
};

fn parse_pagination(s: &str) -> Result<PaginationMode, String> {
    match s.to_lowercase().as_str() {
        "cursor" => Ok(PaginationMode::Cursor),
        "page" => Ok(PaginationMode::PageNumber),
        _ => Err(format!("Invalid pagination mode: {s}. Valid options: cursor, page")),
    }
}

/// Arguments for `gridstatus query`
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Dataset id (e.g. isone_fuel_mix)
    pub dataset: String,

    /// Start of the time range (RFC 3339, YYYY-MM-DD HH:MM:SS, or YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// End of the time range
    #[arg(long)]
    pub end: Option<String>,

    /// Columns to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Column to filter on
    #[arg(long, requires = "filter_value")]
    pub filter_column: Option<String>,

    /// Filter value; several comma separated values require `--filter-operator in`
    #[arg(long, value_delimiter = ',', requires = "filter_column")]
    pub filter_value: Option<Vec<String>>,

    /// Filter operator: =, !=, >, <, >=, <=, in
    #[arg(long, default_value = "=")]
    pub filter_operator: FilterOperator,

    /// Publish time: latest, latest_report, or a timestamp
    #[arg(long)]
    pub publish_time: Option<String>,

    /// Resample frequency (e.g. "1 hour")
    #[arg(long)]
    pub resample: Option<String>,

    /// Columns to group by when resampling, comma separated
    #[arg(long, value_delimiter = ',', requires = "resample")]
    pub resample_by: Option<Vec<String>>,

    /// Aggregation applied when resampling
    #[arg(long, default_value = "mean")]
    pub resample_function: AggregationFunction,

    /// Stop once at least this many rows have been fetched
    #[arg(long)]
    pub limit: Option<u64>,

    /// Rows per page requested from the server
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: Option<u64>,

    /// Timezone for naive start/end values and localized output columns
    #[arg(long)]
    pub timezone: Option<String>,

    /// Deprecated alias of --timezone
    #[arg(long, hide = true)]
    pub tz: Option<String>,

    /// Pagination mode: cursor or page
    #[arg(long, default_value = "cursor", value_parser = parse_pagination)]
    pub pagination: PaginationMode,

    /// Delay between pages in milliseconds
    #[arg(long, default_value_t = 0)]
    pub page_delay_ms: u64,

    /// Output CSV file (stdout when omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl QueryArgs {
    /// Build the request described by these arguments
    pub fn to_request(&self) -> Result<FetchRequest, CliError> {
        let zone = self
            .timezone
            .as_deref()
            .or(self.tz.as_deref())
            .map(parse_timezone)
            .transpose()
            .map_err(CliError::InvalidArgument)?;

        let mut request = FetchRequest::new(&self.dataset)
            .pagination(self.pagination)
            .page_delay(Duration::from_millis(self.page_delay_ms));

        if let Some(start) = &self.start {
            request = request.start(parse_time_arg("start", start, zone)?);
        }
        if let Some(end) = &self.end {
            request = request.end(parse_time_arg("end", end, zone)?);
        }
        if let Some(columns) = &self.columns {
            request = request.columns(columns.iter().cloned());
        }
        if let (Some(column), Some(values)) = (&self.filter_column, &self.filter_value) {
            let value = match values.as_slice() {
                [single] if self.filter_operator != FilterOperator::In => {
                    FilterValue::Single(single.clone())
                }
                _ => FilterValue::List(values.clone()),
            };
            request = request.filter(Filter::new(column, self.filter_operator, value));
        }
        if let Some(publish_time) = &self.publish_time {
            request = request.publish_time(parse_publish_time(publish_time, zone)?);
        }
        if let Some(frequency) = &self.resample {
            let mut resample = Resample::new(frequency).function(self.resample_function);
            if let Some(by) = &self.resample_by {
                resample = resample.by(by.iter().cloned());
            }
            request = request.resample(resample);
        }
        if let Some(limit) = self.limit {
            request = request.limit(limit);
        }
        if let Some(page_size) = self.page_size {
            request = request.page_size(page_size);
        }
        if let Some(timezone) = &self.timezone {
            request = request.timezone(timezone);
        }
        if let Some(tz) = &self.tz {
            request = request.tz(tz);
        }

        Ok(request)
    }

    /// Execute the query and write the table
    pub async fn execute(&self, client: &GridStatusClient) -> Result<(), CliError> {
        let request = self.to_request()?;
        let table = client.fetch(&request).await?;

        match &self.output {
            Some(path) => {
                let rows = write_csv(&table, path)?;
                info!("Wrote {} rows to {}", rows, path.display());
            }
            None => {
                let mut writer = CsvTableWriter::new(io::stdout().lock());
                writer.write_table(&table)?;
                writer.flush()?;
            }
        }

        Ok(())
    }
}

fn parse_time_arg(name: &str, value: &str, zone: Option<Tz>) -> Result<DateTime<Utc>, CliError> {
    parse_instant(value, zone)
        .ok_or_else(|| CliError::InvalidArgument(format!("Invalid {name} time: '{value}'")))
}

fn parse_publish_time(value: &str, zone: Option<Tz>) -> Result<PublishTime, CliError> {
    match value {
        "latest" => Ok(PublishTime::Latest),
        "latest_report" => Ok(PublishTime::LatestReport),
        other => parse_time_arg("publish", other, zone).map(PublishTime::At),
    }
}
