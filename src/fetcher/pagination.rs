//! Pagination driver
//!
//! Walks every page of a dataset query, strictly one page at a time:
//! - Cursor mode: sends `cursor=""` first, then echoes each page's cursor
//! - Page-number mode: sends `page=1, 2, ...` and no cursor
//!
//! Stops when a page reports no further pages or the row limit is reached.
//! The server applies `limit` itself; the local guard only trips once the
//! rows fetched before the latest page already meet it, so a fetch spans at
//! most `ceil(limit / page_size) + 1` pages. Rows are never truncated.
//!
//! Safety checks:
//! - A cursor that fails to advance is a protocol error, not a loop
//! - Any failure discards every page fetched so far

use tokio::time::Instant;
use tracing::{debug, info};

use crate::cancel::{sleep_or_cancel, CancelToken};
use crate::config::WireFormat;
use crate::fetcher::executor::RequestExecutor;
use crate::fetcher::page::{DatasetMetadata, Page, PageMeta};
use crate::fetcher::{FetcherError, FetcherResult};
use crate::normalize::normalize;
use crate::progress::{format_count, PageProgress};
use crate::request::{FetchRequest, PagePosition, PaginationMode};
use crate::table::ResultTable;

/// Drives a [`FetchRequest`] across all of its pages
pub struct PaginationDriver<'a> {
    executor: &'a RequestExecutor,
    host: &'a str,
    cancel: Option<&'a CancelToken>,
}

impl<'a> PaginationDriver<'a> {
    /// Create a driver that queries `{host}/datasets/{dataset}/query`
    pub fn new(executor: &'a RequestExecutor, host: &'a str) -> Self {
        Self {
            executor,
            host,
            cancel: None,
        }
    }

    /// Check `token` before every page and while sleeping
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fetch, merge, and normalize every page of `request`.
    ///
    /// # Errors
    /// Any configuration, request, protocol, or timestamp error aborts the
    /// whole fetch; no partial table is returned
    pub async fn fetch(&self, request: &FetchRequest) -> FetcherResult<ResultTable> {
        let timezone = request.validate()?;
        let url = format!("{}/datasets/{}/query", self.host, request.dataset());
        let format = self.executor.format();

        let mode = match (format, request.pagination_mode()) {
            (WireFormat::Csv, PaginationMode::Cursor) => {
                debug!("CSV responses carry no cursor; using page-number pagination");
                PaginationMode::PageNumber
            }
            (_, mode) => mode,
        };

        let mut cursor = String::new();
        let mut page_number: u64 = 1;
        let mut pages: Vec<ResultTable> = Vec::new();
        let mut metadata: Option<DatasetMetadata> = None;
        let mut progress = PageProgress::new(request.row_limit());

        loop {
            if let Some(token) = self.cancel {
                token.check()?;
            }

            let position = PagePosition {
                page: page_number,
                cursor: (mode == PaginationMode::Cursor).then_some(cursor.as_str()),
            };
            let params = request.to_query_params(&position);

            info!("Fetching page {}...", page_number);
            let started = Instant::now();
            let Page {
                table,
                meta,
                dataset_metadata,
            } = self.executor.execute(&url, &params, self.cancel).await?;
            let elapsed = started.elapsed();

            let limit_met = progress.limit_reached();
            progress.record_page(meta.row_count as u64, elapsed);
            info!("{}", progress.format_page_done(elapsed));
            if let Some(message) = progress.format_limit() {
                info!("{}", message);
            }

            // Metadata is identical on every page; the latest one wins.
            if dataset_metadata.is_some() {
                metadata = dataset_metadata;
            }
            pages.push(table);

            let has_next_page = match format {
                WireFormat::Json => meta.has_next_page,
                WireFormat::Csv => csv_has_next_page(&meta, request.rows_per_page()),
            };

            if limit_met {
                debug!("Row limit reached after {} pages", progress.pages());
                break;
            }
            if !has_next_page {
                debug!("Server reported last page after {} pages", progress.pages());
                break;
            }

            if mode == PaginationMode::Cursor {
                cursor = next_cursor(&cursor, meta.next_cursor)?;
            }
            page_number += 1;

            let delay = request.inter_page_delay();
            if !delay.is_zero() {
                debug!("Sleeping {:?} before next page", delay);
                sleep_or_cancel(delay, self.cancel).await?;
            }
        }

        let table = ResultTable::concat(pages);
        info!(
            "Total number of rows: {}",
            format_count(table.num_rows() as u64)
        );

        normalize(table, &metadata.unwrap_or_default(), timezone)
    }
}

/// Validate the cursor handed back by the server
fn next_cursor(current: &str, next: Option<String>) -> FetcherResult<String> {
    let next = next.filter(|c| !c.is_empty()).ok_or_else(|| {
        FetcherError::ProtocolError(
            "server reported another page but returned no cursor".to_string(),
        )
    })?;

    if next == current {
        return Err(FetcherError::ProtocolError(format!(
            "pagination cursor did not advance (still '{next}')"
        )));
    }

    Ok(next)
}

/// CSV bodies have no pagination metadata: a full page implies another may follow.
fn csv_has_next_page(meta: &PageMeta, page_size: Option<u64>) -> bool {
    match page_size {
        Some(size) => meta.row_count > 0 && meta.row_count as u64 == size,
        None => false,
    }
}
