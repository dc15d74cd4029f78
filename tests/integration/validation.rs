//! Integration tests for request validation and request shape

use gridstatus_client::fetcher::executor::CLIENT_NAME;
use gridstatus_client::{
    ClientConfig, FetchRequest, FetcherError, Filter, FilterOperator, FilterValue, PublishTime,
    Resample,
};

use crate::support::{client, json_page, ScriptedTransport, TEST_KEY};

async fn expect_config_error(request: FetchRequest) {
    let transport = ScriptedTransport::new(vec![json_page(0, 1, false, None)]);
    let err = client(&transport).fetch(&request).await.unwrap_err();

    assert!(
        matches!(err, FetcherError::ConfigurationError(_)),
        "unexpected error {err:?}"
    );
    assert_eq!(transport.request_count(), 0, "no request may be sent");
}

#[tokio::test]
async fn test_tz_and_timezone_conflict() {
    expect_config_error(
        FetchRequest::new("ercot_load")
            .tz("America/Chicago")
            .timezone("America/Chicago"),
    )
    .await;
}

#[tokio::test]
async fn test_unknown_timezone() {
    expect_config_error(FetchRequest::new("ercot_load").timezone("Mars/Olympus")).await;
}

#[tokio::test]
async fn test_list_value_requires_in_operator() {
    let filter = Filter::new(
        "location",
        FilterOperator::Eq,
        FilterValue::List(vec!["A".into(), "B".into()]),
    );
    expect_config_error(FetchRequest::new("caiso_lmp").filter(filter)).await;
}

#[tokio::test]
async fn test_zero_page_size() {
    expect_config_error(FetchRequest::new("ercot_load").page_size(0)).await;
}

#[tokio::test]
async fn test_empty_dataset() {
    expect_config_error(FetchRequest::new("")).await;
}

#[test]
fn test_missing_api_key() {
    assert!(matches!(
        ClientConfig::new("  "),
        Err(FetcherError::ConfigurationError(_))
    ));
}

#[tokio::test]
async fn test_headers_and_default_params() {
    let transport = ScriptedTransport::new(vec![json_page(0, 1, false, None)]);
    client(&transport)
        .fetch(&FetchRequest::new("ercot_load"))
        .await
        .unwrap();

    let sent = &transport.requests()[0];
    assert_eq!(sent.header("x-api-key"), Some(TEST_KEY));
    assert_eq!(sent.header("x-client"), Some(CLIENT_NAME));
    assert_eq!(sent.header("x-client-version"), Some(env!("CARGO_PKG_VERSION")));
    assert_eq!(sent.param("return_format"), Some("json"));
    assert_eq!(sent.param("json_schema"), Some("array-of-arrays"));
}

#[tokio::test]
async fn test_full_parameter_set() {
    let transport = ScriptedTransport::new(vec![json_page(0, 1, false, None)]);
    let request = FetchRequest::new("caiso_lmp")
        .columns(["interval_start_utc", "lmp"])
        .filter(Filter::is_in("location", ["TH_NP15", "TH_SP15"]))
        .publish_time(PublishTime::Latest)
        .resample(Resample::new("1 hour").by(["location"]));

    client(&transport).fetch(&request).await.unwrap();

    let sent = &transport.requests()[0];
    assert_eq!(sent.param("columns"), Some("interval_start_utc,lmp"));
    assert_eq!(sent.param("filter_column"), Some("location"));
    assert_eq!(sent.param("filter_value"), Some("TH_NP15,TH_SP15"));
    assert_eq!(sent.param("filter_operator"), Some("in"));
    assert_eq!(sent.param("publish_time"), Some("latest"));
    assert_eq!(sent.param("resample_frequency"), Some("1 hour"));
    assert_eq!(sent.param("resample_by"), Some("location"));
    assert_eq!(sent.param("resample_function"), Some("mean"));
    assert!(sent.param("start_time").is_none());
    assert!(sent.param("limit").is_none());
}
