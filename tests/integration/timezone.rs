//! Integration tests for timestamp normalization across a DST transition

use gridstatus_client::fetcher::RawResponse;
use gridstatus_client::{CellValue, FetchRequest, FetcherError};
use serde_json::json;

use crate::support::{client, ScriptedTransport};

/// Hourly rows across the America/New_York fall-back on 2024-11-03
fn dst_page() -> RawResponse {
    RawResponse::new(
        200,
        json!({
            "data": [
                ["interval_start_utc", "publish_time", "load"],
                ["2024-11-03T04:00:00+00:00", "2024-11-03 03:55:00+00:00", 100],
                ["2024-11-03T05:00:00+00:00", "2024-11-03 04:55:00+00:00", 101],
                ["2024-11-03T06:00:00+00:00", null, 102]
            ],
            "meta": {"hasNextPage": false, "cursor": null},
            "dataset_metadata": {
                "all_columns": [
                    {"name": "interval_start_utc", "is_datetime": true},
                    {"name": "publish_time", "is_datetime": true},
                    {"name": "load", "is_datetime": false}
                ]
            }
        })
        .to_string(),
    )
}

fn rendered(table: &gridstatus_client::ResultTable, column: &str) -> Vec<String> {
    table
        .column(column)
        .unwrap()
        .values
        .iter()
        .map(|v| v.to_string())
        .collect()
}

#[tokio::test]
async fn test_new_york_localization_across_fall_back() {
    let transport = ScriptedTransport::new(vec![dst_page()]);

    let request = FetchRequest::new("nyiso_load").timezone("America/New_York");
    let table = client(&transport).fetch(&request).await.unwrap();

    assert_eq!(
        table.column_names(),
        vec!["interval_start_utc", "interval_start_local", "publish_time", "load"]
    );
    assert_eq!(
        rendered(&table, "interval_start_utc"),
        vec![
            "2024-11-03T04:00:00+00:00",
            "2024-11-03T05:00:00+00:00",
            "2024-11-03T06:00:00+00:00"
        ]
    );
    assert_eq!(
        rendered(&table, "interval_start_local"),
        vec![
            "2024-11-03T00:00:00-04:00",
            "2024-11-03T01:00:00-04:00",
            "2024-11-03T01:00:00-05:00"
        ]
    );

    // Non-UTC datetime columns are converted in place
    let publish = &table.column("publish_time").unwrap().values;
    assert_eq!(publish[0].to_string(), "2024-11-02T23:55:00-04:00");
    assert_eq!(publish[2], CellValue::Null);

    assert_eq!(
        transport.requests()[0].param("timezone"),
        Some("America/New_York")
    );
}

#[tokio::test]
async fn test_without_timezone_columns_stay_utc() {
    let transport = ScriptedTransport::new(vec![dst_page()]);

    let table = client(&transport)
        .fetch(&FetchRequest::new("nyiso_load"))
        .await
        .unwrap();

    assert!(table.column("interval_start_local").is_none());
    assert_eq!(
        rendered(&table, "publish_time")[0],
        "2024-11-03T03:55:00+00:00"
    );
}

#[tokio::test]
async fn test_legacy_tz_localizes_but_is_not_sent() {
    let transport = ScriptedTransport::new(vec![dst_page()]);

    let request = FetchRequest::new("nyiso_load").tz("America/New_York");
    let table = client(&transport).fetch(&request).await.unwrap();

    assert!(table.column("interval_start_local").is_some());
    let sent = &transport.requests()[0];
    assert!(sent.param("tz").is_none());
    assert!(sent.param("timezone").is_none());
}

#[tokio::test]
async fn test_malformed_timestamp_fails_fetch() {
    let transport = ScriptedTransport::new(vec![RawResponse::new(
        200,
        json!({
            "data": [["interval_start_utc"], ["not-a-time"]],
            "meta": {"hasNextPage": false}
        })
        .to_string(),
    )]);

    let err = client(&transport)
        .fetch(&FetchRequest::new("nyiso_load"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::MalformedTimestamp { .. }));
}
