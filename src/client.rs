//! High-level API client
//!
//! [`GridStatusClient`] ties a [`ClientConfig`] to a [`RequestExecutor`] and
//! exposes the three API surfaces: paginated dataset queries, the dataset
//! catalog, and the daily peak report.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::catalog::{filter_datasets, parse_catalog, DatasetDescriptor};
use crate::config::ClientConfig;
use crate::fetcher::{
    FetcherError, FetcherResult, PaginationDriver, RequestExecutor, ReqwestTransport, Transport,
};
use crate::request::FetchRequest;
use crate::table::ResultTable;

/// Client for the GridStatus API
pub struct GridStatusClient {
    config: ClientConfig,
    executor: RequestExecutor,
    cancel: Option<CancelToken>,
}

impl GridStatusClient {
    /// Create a client backed by a reqwest HTTP transport.
    ///
    /// # Errors
    /// `ConfigurationError` if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> FetcherResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client using a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let executor = RequestExecutor::new(transport, &config);
        Self {
            config,
            executor,
            cancel: None,
        }
    }

    /// Create a client from `GRIDSTATUS_API_KEY` and the default settings
    pub fn from_env() -> FetcherResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Abort in-flight operations when `token` is cancelled
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Settings this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch every page of a dataset query as one normalized table
    pub async fn fetch(&self, request: &FetchRequest) -> FetcherResult<ResultTable> {
        let mut driver = PaginationDriver::new(&self.executor, self.config.host());
        if let Some(token) = &self.cancel {
            driver = driver.with_cancel(token);
        }
        driver.fetch(request).await
    }

    /// List the dataset catalog, optionally keeping only entries matching `filter`
    pub async fn list_datasets(&self, filter: Option<&str>) -> FetcherResult<Vec<DatasetDescriptor>> {
        let url = format!("{}/datasets/", self.config.host());
        let params = json_params();

        let response = self
            .executor
            .execute_raw(&url, &params, self.cancel.as_ref())
            .await?;
        let datasets = parse_catalog(&response.body)?;
        debug!("Catalog lists {} datasets", datasets.len());

        let matched = filter_datasets(datasets, filter);
        if let Some(term) = filter {
            info!("{} datasets match '{}'", matched.len(), term);
        }
        Ok(matched)
    }

    /// Fetch the daily peak report for `iso`; `date` defaults to today (UTC).
    ///
    /// The report body is returned as raw JSON.
    pub async fn get_daily_peak_report(
        &self,
        iso: &str,
        date: Option<NaiveDate>,
    ) -> FetcherResult<Value> {
        if iso.trim().is_empty() {
            return Err(FetcherError::ConfigurationError(
                "iso must not be empty".to_string(),
            ));
        }

        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let url = format!("{}/reports/daily_peak/{}", self.config.host(), iso);
        let mut params = json_params();
        params.push(("date".to_string(), date.format("%Y-%m-%d").to_string()));

        let response = self
            .executor
            .execute_raw(&url, &params, self.cancel.as_ref())
            .await?;

        serde_json::from_str(&response.body)
            .map_err(|e| FetcherError::ParseError(format!("invalid report JSON: {e}")))
    }
}

/// JSON body regardless of the configured wire format
fn json_params() -> Vec<(String, String)> {
    vec![
        ("return_format".to_string(), "json".to_string()),
        ("json_schema".to_string(), "array-of-arrays".to_string()),
    ]
}
