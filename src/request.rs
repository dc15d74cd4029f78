//! Dataset query description
//!
//! A [`FetchRequest`] is built once by the caller and never mutated by the
//! fetch engine. It knows how to render itself into query parameters for any
//! given page position.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::dates::parse_timezone;
use crate::fetcher::{FetcherError, FetcherResult};

/// Comparison applied by a server-side filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOperator {
    /// `=`
    #[default]
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// `in` (value is a list)
    In,
}

impl FilterOperator {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
            FilterOperator::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" => Ok(FilterOperator::Eq),
            "!=" => Ok(FilterOperator::NotEq),
            ">" => Ok(FilterOperator::Gt),
            "<" => Ok(FilterOperator::Lt),
            ">=" => Ok(FilterOperator::GtEq),
            "<=" => Ok(FilterOperator::LtEq),
            "in" => Ok(FilterOperator::In),
            _ => Err(format!(
                "Invalid filter operator: {s}. Valid options: =, !=, >, <, >=, <=, in"
            )),
        }
    }
}

/// Value a filter compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Single scalar
    Single(String),
    /// Several values, only valid with [`FilterOperator::In`]
    List(Vec<String>),
}

/// Server-side row filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Column to filter on
    pub column: String,
    /// Comparison
    pub operator: FilterOperator,
    /// Right-hand side
    pub value: FilterValue,
}

impl Filter {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::Eq,
            value: FilterValue::Single(value.into()),
        }
    }

    /// `column <op> value`
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// `column in (values...)`
    pub fn is_in<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            operator: FilterOperator::In,
            value: FilterValue::List(values.into_iter().map(Into::into).collect()),
        }
    }

    fn wire_value(&self) -> String {
        match &self.value {
            FilterValue::Single(v) => v.clone(),
            FilterValue::List(values) => values.join(","),
        }
    }
}

/// Which published revision of the data to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishTime {
    /// No filtering on publish time
    #[default]
    None,
    /// Latest revision for every timestamp
    Latest,
    /// Only rows from the most recently published report
    LatestReport,
    /// Rows published at exactly this instant
    At(DateTime<Utc>),
}

impl PublishTime {
    fn wire_value(&self) -> Option<String> {
        match self {
            PublishTime::None => None,
            PublishTime::Latest => Some("latest".to_string()),
            PublishTime::LatestReport => Some("latest_report".to_string()),
            PublishTime::At(ts) => Some(format_instant(ts)),
        }
    }
}

/// Aggregation used when resampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationFunction {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Sum
    Sum,
    /// Minimum
    Min,
    /// Maximum
    Max,
    /// Standard deviation
    Stddev,
    /// Row count
    Count,
    /// Variance
    Variance,
}

impl AggregationFunction {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFunction::Mean => "mean",
            AggregationFunction::Sum => "sum",
            AggregationFunction::Min => "min",
            AggregationFunction::Max => "max",
            AggregationFunction::Stddev => "stddev",
            AggregationFunction::Count => "count",
            AggregationFunction::Variance => "variance",
        }
    }
}

impl FromStr for AggregationFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(AggregationFunction::Mean),
            "sum" => Ok(AggregationFunction::Sum),
            "min" => Ok(AggregationFunction::Min),
            "max" => Ok(AggregationFunction::Max),
            "stddev" => Ok(AggregationFunction::Stddev),
            "count" => Ok(AggregationFunction::Count),
            "variance" => Ok(AggregationFunction::Variance),
            _ => Err(format!(
                "Invalid resample function: {s}. Valid options: mean, sum, min, max, stddev, count, variance"
            )),
        }
    }
}

/// Server-side downsampling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resample {
    /// Target frequency, e.g. "1 hour" or "7 days"
    pub frequency: String,
    /// Columns to group by; the time index when empty
    pub by: Vec<String>,
    /// Aggregation applied per bucket
    pub function: AggregationFunction,
}

impl Resample {
    /// Resample to `frequency` using the mean
    pub fn new(frequency: impl Into<String>) -> Self {
        Self {
            frequency: frequency.into(),
            by: Vec::new(),
            function: AggregationFunction::default(),
        }
    }

    /// Group by these columns
    pub fn by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Use this aggregation
    pub fn function(mut self, function: AggregationFunction) -> Self {
        self.function = function;
        self
    }
}

/// How the driver walks pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Echo back the server's opaque cursor
    #[default]
    Cursor,
    /// Send an incrementing page number
    PageNumber,
}

/// Position of the page being requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePosition<'a> {
    /// 1-based page number, always sent
    pub page: u64,
    /// Cursor to send; `Some("")` on the first page in cursor mode
    pub cursor: Option<&'a str>,
}

/// Immutable description of one dataset query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    dataset: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    columns: Option<Vec<String>>,
    filter: Option<Filter>,
    publish_time: PublishTime,
    resample: Option<Resample>,
    limit: Option<u64>,
    page_size: Option<u64>,
    timezone: Option<String>,
    legacy_tz: Option<String>,
    pagination: PaginationMode,
    page_delay: Duration,
}

impl FetchRequest {
    /// Query every row of `dataset` with default settings
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            start: None,
            end: None,
            columns: None,
            filter: None,
            publish_time: PublishTime::None,
            resample: None,
            limit: None,
            page_size: None,
            timezone: None,
            legacy_tz: None,
            pagination: PaginationMode::default(),
            page_delay: Duration::ZERO,
        }
    }

    /// Inclusive start of the time range
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// End of the time range
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Only return these columns
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Server-side filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Publish-time selection
    pub fn publish_time(mut self, publish_time: PublishTime) -> Self {
        self.publish_time = publish_time;
        self
    }

    /// Server-side resampling
    pub fn resample(mut self, resample: Resample) -> Self {
        self.resample = Some(resample);
        self
    }

    /// Stop once at least this many rows have arrived
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rows per page requested from the server
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Return localized columns in this IANA timezone
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Deprecated alias for [`FetchRequest::timezone`], applied client-side only
    pub fn tz(mut self, tz: impl Into<String>) -> Self {
        self.legacy_tz = Some(tz.into());
        self
    }

    /// Pagination strategy
    pub fn pagination(mut self, mode: PaginationMode) -> Self {
        self.pagination = mode;
        self
    }

    /// Pause between page requests
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Dataset identifier
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Row limit
    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Rows per page
    pub fn rows_per_page(&self) -> Option<u64> {
        self.page_size
    }

    /// Pagination strategy
    pub fn pagination_mode(&self) -> PaginationMode {
        self.pagination
    }

    /// Pause between page requests
    pub fn inter_page_delay(&self) -> Duration {
        self.page_delay
    }

    /// Check the request and resolve the timezone used for normalization.
    ///
    /// Runs before any network call.
    ///
    /// # Errors
    /// `ConfigurationError` when both `tz` and `timezone` are set, a timezone
    /// is unknown, the page size is zero, or a list filter value is used with
    /// an operator other than `in`
    pub fn validate(&self) -> FetcherResult<Option<Tz>> {
        if self.dataset.trim().is_empty() {
            return Err(FetcherError::ConfigurationError(
                "dataset must not be empty".to_string(),
            ));
        }

        if self.legacy_tz.is_some() {
            warn!("The 'tz' parameter is deprecated. Please use 'timezone' instead.");
            if self.timezone.is_some() {
                return Err(FetcherError::ConfigurationError(
                    "'tz' and 'timezone' parameters cannot both be set".to_string(),
                ));
            }
        }

        if self.page_size == Some(0) {
            return Err(FetcherError::ConfigurationError(
                "page_size must be at least 1".to_string(),
            ));
        }

        if let Some(filter) = &self.filter {
            if matches!(filter.value, FilterValue::List(_)) && filter.operator != FilterOperator::In {
                return Err(FetcherError::ConfigurationError(format!(
                    "a list of filter values requires the 'in' operator, got '{}'",
                    filter.operator
                )));
            }
        }

        self.timezone
            .as_deref()
            .or(self.legacy_tz.as_deref())
            .map(|name| parse_timezone(name).map_err(FetcherError::ConfigurationError))
            .transpose()
    }

    /// Render query parameters for the page at `position`.
    ///
    /// Absent settings are omitted rather than sent empty.
    pub fn to_query_params(&self, position: &PagePosition<'_>) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = Vec::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(start) = &self.start {
            push("start_time", format_instant(start));
        }
        if let Some(end) = &self.end {
            push("end_time", format_instant(end));
        }
        if let Some(limit) = self.limit {
            push("limit", limit.to_string());
        }
        push("page", position.page.to_string());
        if let Some(page_size) = self.page_size {
            push("page_size", page_size.to_string());
        }
        if let Some(resample) = &self.resample {
            push("resample_frequency", resample.frequency.clone());
            if !resample.by.is_empty() {
                push("resample_by", resample.by.join(","));
            }
            push("resample_function", resample.function.as_str().to_string());
        }
        if let Some(publish_time) = self.publish_time.wire_value() {
            push("publish_time", publish_time);
        }
        if let Some(timezone) = &self.timezone {
            push("timezone", timezone.clone());
        }
        if let Some(cursor) = position.cursor {
            push("cursor", cursor.to_string());
        }
        if let Some(filter) = &self.filter {
            push("filter_column", filter.column.clone());
            push("filter_value", filter.wire_value());
            push("filter_operator", filter.operator.as_str().to_string());
        }
        if let Some(columns) = &self.columns {
            push("columns", columns.join(","));
        }

        params
    }
}

fn format_instant(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
