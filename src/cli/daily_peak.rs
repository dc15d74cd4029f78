//! `daily-peak` command: print the daily peak report for an ISO

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::client::GridStatusClient;

fn parse_market_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Arguments for `gridstatus daily-peak`
#[derive(Args, Debug)]
pub struct DailyPeakArgs {
    /// ISO name (CAISO, ERCOT, ISONE, MISO, NYISO, PJM, SPP)
    pub iso: String,

    /// Market date, YYYY-MM-DD (defaults to today, UTC)
    #[arg(long, value_parser = parse_market_date)]
    pub date: Option<NaiveDate>,
}

impl DailyPeakArgs {
    /// Execute the daily-peak command
    pub async fn execute(&self, client: &GridStatusClient) -> Result<()> {
        let report = client.get_daily_peak_report(&self.iso, self.date).await?;
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
        Ok(())
    }
}
