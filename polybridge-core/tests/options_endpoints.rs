//! The two flattened options-timeseries endpoints are single-request
//! passthroughs, independent of the chunked pipeline.

use httpmock::prelude::*;
use serde_json::json;

use polybridge_core::{
    AboveOptionsQuery, OutputFormat, PolybridgeClient, UpOrDownOptionsQuery,
};

fn client_for(server: &MockServer) -> PolybridgeClient {
    PolybridgeClient::builder("test-key")
        .base_url(server.base_url())
        .build()
        .unwrap()
}

#[test]
fn up_or_down_is_a_single_passthrough_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api_v1_up_or_down_options_timeseries")
            .json_body(json!({
                "asset": "BTC",
                "start_ts": "2024-01-01T00:00:00Z",
                "end_ts": "2024-01-02T00:00:00Z",
                "horizon": "daily",
                "window_days": [7, 30],
            }));
        then.status(200).json_body(json!({
            "rows": [
                {"ts": "2024-01-01T00:00:00Z", "p_next": 0.51, "iv_next": 0.6},
                {"ts": "2024-01-01T00:05:00Z", "p_next": 0.52, "iv_next": 0.61},
            ],
            "meta": {"asset": "BTC"},
        }));
    });

    let mut query =
        UpOrDownOptionsQuery::new("BTC", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
    query.window_days = Some(vec![7, 30]);

    let response = client_for(&server)
        .fetch_up_or_down_options_timeseries(&query)
        .unwrap();

    mock.assert();
    assert_eq!(response.rows.len(), 2);
    assert_eq!(response.rows[0]["p_next"], 0.51);
    assert_eq!(response.meta.unwrap()["asset"], "BTC");
}

#[test]
fn above_carries_the_requested_format() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api_v1_above_options_timeseries")
            .json_body(json!({
                "asset": "ETH",
                "start_ts": "2024-01-01T00:00:00Z",
                "end_ts": "2024-01-02T00:00:00Z",
                "format": "wide",
                "horizon": "daily",
            }));
        then.status(200).json_body(json!({
            "rows": [{"ts": "2024-01-01T00:00:00Z", "strike_2400": 0.7, "strike_2600": 0.3}],
            "meta": {"format": "wide"},
        }));
    });

    let mut query = AboveOptionsQuery::new("ETH", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
    query.format = OutputFormat::Wide;

    let response = client_for(&server)
        .fetch_above_options_timeseries(&query)
        .unwrap();

    mock.assert();
    assert_eq!(response.rows.len(), 1);
}

#[test]
fn missing_rows_and_meta_decode_as_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api_v1_above_options_timeseries");
        then.status(200).json_body(json!({}));
    });

    let query = AboveOptionsQuery::new("ETH", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
    let response = client_for(&server)
        .fetch_above_options_timeseries(&query)
        .unwrap();

    assert!(response.rows.is_empty());
    assert!(response.meta.is_none());
}
