//! Integration tests for logging and tracing

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridstatus_client::progress::{format_count, PageProgress};
use std::time::Duration;

#[test]
fn test_tracing_subscriber_initialization() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridstatus_client=debug")),
        )
        .with_test_writer()
        .try_init();

    // Another test may have installed a subscriber first; either way one is now global.
    assert!(installed.is_ok() || tracing::dispatcher::has_been_set());
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_tracing_json_format() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("gridstatus_client=info"))
        .with_test_writer()
        .try_init();

    info!(dataset = "ercot_load", page = 1, "Fetching page 1...");
    warn!("API rate limit hit. Retrying again in 1 seconds. Retry 1 of 3.");
}

#[test]
fn test_env_filter_parsing() {
    for directive in ["info", "gridstatus_client=debug", "warn,gridstatus_client=trace"] {
        assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
    }
}

#[test]
fn test_progress_messages() {
    let mut progress = PageProgress::new(Some(10_000));
    progress.record_page(1_500, Duration::from_millis(250));

    assert_eq!(
        progress.format_limit().unwrap(),
        "Total rows: 1,500/10,000 (15.00% of limit)"
    );
    assert_eq!(format_count(2_500_000), "2,500,000");
}
