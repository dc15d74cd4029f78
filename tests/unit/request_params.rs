//! Unit tests for query parameter rendering

use chrono::{TimeZone, Utc};
use gridstatus_client::request::PagePosition;
use gridstatus_client::{AggregationFunction, FetchRequest, PublishTime, Resample};

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[test]
fn test_cursor_only_in_cursor_position() {
    let request = FetchRequest::new("ercot_load");

    let first = request.to_query_params(&PagePosition { page: 1, cursor: Some("") });
    assert_eq!(param(&first, "cursor"), Some(""));
    assert_eq!(param(&first, "page"), Some("1"));

    let numbered = request.to_query_params(&PagePosition { page: 4, cursor: None });
    assert!(param(&numbered, "cursor").is_none());
    assert_eq!(param(&numbered, "page"), Some("4"));
}

#[test]
fn test_time_range_and_publish_time() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let request = FetchRequest::new("ercot_load")
        .start(start)
        .end(end)
        .publish_time(PublishTime::At(start))
        .resample(Resample::new("1 day").function(AggregationFunction::Sum));

    let params = request.to_query_params(&PagePosition { page: 1, cursor: Some("") });
    assert_eq!(param(&params, "start_time"), Some("2024-01-01T00:00:00Z"));
    assert_eq!(param(&params, "end_time"), Some("2024-01-02T00:00:00Z"));
    assert_eq!(param(&params, "publish_time"), Some("2024-01-01T00:00:00Z"));
    assert_eq!(param(&params, "resample_function"), Some("sum"));
    assert!(param(&params, "resample_by").is_none());
}

#[test]
fn test_request_is_not_mutated_by_rendering() {
    let request = FetchRequest::new("ercot_load").limit(10);
    let before = request.clone();
    let _ = request.to_query_params(&PagePosition { page: 2, cursor: Some("abc") });
    assert_eq!(request, before);
}
