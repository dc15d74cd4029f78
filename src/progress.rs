//! Page-level progress reporting for multi-page fetches.
//!
//! Messages are advisory only; errors are always surfaced through return
//! values, never through these logs.

use std::time::Duration;

/// Running totals across the pages of one fetch
#[derive(Debug, Clone)]
pub struct PageProgress {
    pages: u64,
    total_rows: u64,
    total_time: Duration,
    limit: Option<u64>,
}

impl PageProgress {
    /// Start tracking a fetch with an optional row limit
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            pages: 0,
            total_rows: 0,
            total_time: Duration::ZERO,
            limit,
        }
    }

    /// Record a completed page
    pub fn record_page(&mut self, rows: u64, elapsed: Duration) {
        self.pages += 1;
        self.total_rows += rows;
        self.total_time += elapsed;
    }

    /// Pages recorded so far
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Rows recorded so far
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Whether the row limit, if any, has been reached
    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.total_rows >= limit)
    }

    /// Mean time per page
    pub fn avg_per_page(&self) -> Duration {
        if self.pages == 0 {
            return Duration::ZERO;
        }
        self.total_time.div_f64(self.pages as f64)
    }

    /// "Done in 0.42 seconds. Total time: 1.3s. Avg per page: 0.65s"
    pub fn format_page_done(&self, elapsed: Duration) -> String {
        if self.pages <= 1 {
            format!("Done in {:.2} seconds.", elapsed.as_secs_f64())
        } else {
            format!(
                "Done in {:.2} seconds. Total time: {:.2}s. Avg per page: {:.2}s",
                elapsed.as_secs_f64(),
                self.total_time.as_secs_f64(),
                self.avg_per_page().as_secs_f64()
            )
        }
    }

    /// "Total rows: 1,500/10,000 (15.00% of limit)"; `None` without a limit
    pub fn format_limit(&self) -> Option<String> {
        let limit = self.limit?;
        let pct = if limit == 0 {
            100.0
        } else {
            self.total_rows as f64 / limit as f64 * 100.0
        };
        Some(format!(
            "Total rows: {}/{} ({pct:.2}% of limit)",
            format_count(self.total_rows),
            format_count(limit)
        ))
    }
}

/// Format an integer with thousands separators
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
