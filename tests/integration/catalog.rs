//! Integration tests for the dataset catalog and the daily peak report

use chrono::{NaiveDate, Utc};
use gridstatus_client::fetcher::RawResponse;
use gridstatus_client::{FetcherError, WireFormat};
use serde_json::json;

use crate::support::{client, client_with, config, rate_limited, ScriptedTransport, TEST_HOST};

fn catalog_body() -> RawResponse {
    RawResponse::new(
        200,
        json!({
            "data": [
                ["id", "name", "description", "earliest_available_time", "latest_available_time", "num_rows", "all_columns"],
                ["caiso_lmp_real_time_5_min", "CAISO LMP Real Time 5 Min", "Prices", "2020-01-01", "2024-01-01", 10, [{"name": "lmp", "is_datetime": false}]],
                ["ercot_load", "ERCOT Load", null, null, null, null, []],
                ["isone_fuel_mix", "ISO NE Fuel Mix", "Generation by fuel (includes LMP-adjacent data)", null, null, null, []]
            ],
            "meta": {"hasNextPage": false}
        })
        .to_string(),
    )
}

#[tokio::test]
async fn test_list_all_datasets() {
    let transport = ScriptedTransport::new(vec![catalog_body()]);
    let datasets = client(&transport).list_datasets(None).await.unwrap();

    assert_eq!(datasets.len(), 3);
    assert_eq!(datasets[1].id, "ercot_load");
    assert_eq!(datasets[0].all_columns[0].name, "lmp");

    let sent = &transport.requests()[0];
    assert_eq!(sent.url, format!("{TEST_HOST}/datasets/"));
    assert_eq!(sent.param("return_format"), Some("json"));
}

#[tokio::test]
async fn test_filter_matches_id_name_and_description() {
    let transport = ScriptedTransport::new(vec![catalog_body()]);
    let datasets = client(&transport).list_datasets(Some("lmp")).await.unwrap();

    let ids: Vec<_> = datasets.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["caiso_lmp_real_time_5_min", "isone_fuel_mix"]);
}

#[tokio::test]
async fn test_catalog_is_json_even_in_csv_mode() {
    let transport = ScriptedTransport::new(vec![catalog_body()]);
    let client = client_with(config().with_format(WireFormat::Csv), &transport);

    assert_eq!(client.list_datasets(None).await.unwrap().len(), 3);
    assert_eq!(transport.requests()[0].param("return_format"), Some("json"));
}

#[tokio::test]
async fn test_daily_peak_report() {
    let report = json!({"ISO": "ERCOT", "market_date": "2024-07-04", "peak_load": {"value": 80000}});
    let transport = ScriptedTransport::new(vec![RawResponse::new(200, report.to_string())]);

    let date = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
    let value = client(&transport)
        .get_daily_peak_report("ERCOT", Some(date))
        .await
        .unwrap();

    assert_eq!(value, report);
    let sent = &transport.requests()[0];
    assert_eq!(sent.url, format!("{TEST_HOST}/reports/daily_peak/ERCOT"));
    assert_eq!(sent.param("date"), Some("2024-07-04"));
}

#[tokio::test]
async fn test_daily_peak_defaults_to_today() {
    let transport = ScriptedTransport::new(vec![RawResponse::new(200, "{}")]);
    client(&transport)
        .get_daily_peak_report("PJM", None)
        .await
        .unwrap();

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(transport.requests()[0].param("date"), Some(today.as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_daily_peak_retries_on_429() {
    let transport = ScriptedTransport::new(vec![rate_limited(), RawResponse::new(200, "{}")]);
    let value = client(&transport)
        .get_daily_peak_report("PJM", None)
        .await
        .unwrap();

    assert_eq!(value, json!({}));
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_daily_peak_forbidden() {
    let transport = ScriptedTransport::new(vec![RawResponse::new(403, "paid plan required")]);
    let err = client(&transport)
        .get_daily_peak_report("PJM", None)
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::RequestFailed { status: 403, .. }));
}
