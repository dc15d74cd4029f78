//! Integration tests for HTTP 429 retry behavior

use std::time::Duration;

use gridstatus_client::fetcher::RawResponse;
use gridstatus_client::{CancelToken, FetchRequest, FetcherError};
use tokio::time::Instant;

use crate::support::{client, client_with, config, json_page, rate_limited, ScriptedTransport};

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_sum_to_exponential_series() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(),
        rate_limited(),
        rate_limited(),
        json_page(0, 5, false, None),
    ]);

    let client = client_with(config().with_max_retries(3), &transport);
    let started = Instant::now();
    let table = client.fetch(&FetchRequest::new("ercot_load")).await.unwrap();
    let elapsed = started.elapsed();

    // 1s + 2s + 4s
    assert!(elapsed >= Duration::from_secs(7), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(8), "elapsed {elapsed:?}");
    assert_eq!(table.num_rows(), 5);
    assert_eq!(transport.request_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_after_max_plus_one_requests() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(),
        rate_limited(),
        rate_limited(),
        json_page(0, 5, false, None),
    ]);

    let client = client_with(config().with_max_retries(2), &transport);
    let err = client.fetch(&FetchRequest::new("ercot_load")).await.unwrap_err();

    assert!(matches!(err, FetcherError::RateLimitExceeded { retries: 2 }));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_zero_retries_fails_on_first_429() {
    let transport = ScriptedTransport::new(vec![rate_limited(), json_page(0, 5, false, None)]);

    let client = client_with(config().with_max_retries(0), &transport);
    let err = client.fetch(&FetchRequest::new("ercot_load")).await.unwrap_err();

    assert!(matches!(err, FetcherError::RateLimitExceeded { retries: 0 }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![
        RawResponse::new(503, "unavailable"),
        json_page(0, 5, false, None),
    ]);

    let err = client(&transport)
        .fetch(&FetchRequest::new("ercot_load"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::RequestFailed { status: 503, .. }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_each_page_gets_fresh_retry_budget() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(),
        json_page(0, 5, true, Some("c1")),
        rate_limited(),
        json_page(5, 5, false, None),
    ]);

    let client = client_with(config().with_max_retries(1), &transport);
    let started = Instant::now();
    let table = client.fetch(&FetchRequest::new("ercot_load")).await.unwrap();

    assert_eq!(table.num_rows(), 10);
    assert_eq!(transport.request_count(), 4);
    // Both pages wait the first backoff step only
    assert!(started.elapsed() < Duration::from_secs(3));

    let requests = transport.requests();
    assert_eq!(requests[0].query, requests[1].query);
    assert_eq!(requests[2].query, requests[3].query);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let transport = ScriptedTransport::new(vec![rate_limited(), json_page(0, 5, false, None)]);
    let token = CancelToken::new();

    tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        }
    });

    let client = client(&transport).with_cancel_token(token);
    let err = client.fetch(&FetchRequest::new("ercot_load")).await.unwrap_err();

    assert!(matches!(err, FetcherError::Cancelled));
    assert_eq!(transport.request_count(), 1);
}
