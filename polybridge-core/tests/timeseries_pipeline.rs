//! End-to-end tests for the catalog → chunk → merge → frame pipeline,
//! against a mock HTTP server.

use httpmock::prelude::*;
use serde_json::json;

use polybridge_core::{Horizon, PolybridgeClient, TimeseriesQuery};

const START: &str = "2024-01-01T00:00:00Z";
const END: &str = "2024-01-01T06:00:00Z";

fn client_for(server: &MockServer) -> PolybridgeClient {
    PolybridgeClient::builder("test-key")
        .base_url(server.base_url())
        .build()
        .unwrap()
}

fn pinned_query(horizons: Vec<Horizon>) -> TimeseriesQuery {
    let mut query = TimeseriesQuery::new("BTC", horizons);
    query.start_ts = Some(START.into());
    query.end_ts = Some(END.into());
    query
}

#[test]
fn empty_catalog_short_circuits_with_no_bulk_calls() {
    let server = MockServer::start();
    let catalog = server.mock(|when, then| {
        when.method(POST).path("/api_v1_market_catalog");
        then.status(200).json_body(json!({"markets": []}));
    });
    let merged = server.mock(|when, then| {
        when.method(POST).path("/api_v1_merged");
        then.status(200).json_body(json!({}));
    });

    let result = client_for(&server)
        .fetch_timeseries(&pinned_query(vec![Horizon::Daily]))
        .unwrap();

    catalog.assert();
    assert_eq!(merged.hits(), 0);
    assert!(result.catalog.is_empty());
    assert!(result.responses.is_empty());
    assert!(result.dataframes.is_empty());
}

#[test]
fn catalog_request_carries_the_filter_and_pinned_range() {
    let server = MockServer::start();
    let catalog = server.mock(|when, then| {
        when.method(POST)
            .path("/api_v1_market_catalog")
            .header("x-api-key", "test-key")
            .json_body(json!({
                "assets": ["BTC"],
                "horizons": ["daily"],
                "market_types": ["up-or-down"],
                "start_ts": START,
                "end_ts": END,
            }));
        then.status(200).json_body(json!({"markets": []}));
    });

    let mut query = pinned_query(vec![Horizon::Daily]);
    query.market_types = vec!["up-or-down".into()];
    client_for(&server).fetch_timeseries(&query).unwrap();

    catalog.assert();
}

#[test]
fn markets_are_sorted_deduped_and_chunked() {
    let server = MockServer::start();

    // Catalog returns 12 daily markets, unsorted, one duplicated.
    let mut markets: Vec<serde_json::Value> = (0..12)
        .rev()
        .map(|i| json!({"horizon": "daily", "market_id": format!("m-{i:02}")}))
        .collect();
    markets.push(json!({"horizon": "daily", "market_id": "m-03"}));

    let catalog = server.mock(|when, then| {
        when.method(POST).path("/api_v1_market_catalog");
        then.status(200).json_body(json!({"markets": markets}));
    });

    let first_ids: Vec<String> = (0..10).map(|i| format!("m-{i:02}")).collect();
    let second_ids: Vec<String> = (10..12).map(|i| format!("m-{i:02}")).collect();

    let first = server.mock(|when, then| {
        when.method(POST).path("/api_v1_merged").json_body(json!({
            "markets": first_ids,
            "interval": "5m",
            "start_ts": START,
            "end_ts": END,
            "blocks": ["probabilities", "prices"],
            "prices": {"instrument_type": "spot", "include_open_interest": true},
        }));
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts", "p"], "rows": [{"ts": 1, "p": 0.4}]},
            "meta": {"chunk": 0},
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path("/api_v1_merged").json_body(json!({
            "markets": second_ids,
            "interval": "5m",
            "start_ts": START,
            "end_ts": END,
            "blocks": ["probabilities", "prices"],
            "prices": {"instrument_type": "spot", "include_open_interest": true},
        }));
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts", "p"], "rows": [{"ts": 2, "p": 0.5}]},
            "meta": {"chunk": 1},
        }));
    });

    let result = client_for(&server)
        .fetch_timeseries(&pinned_query(vec![Horizon::Daily]))
        .unwrap();

    catalog.assert();
    first.assert();
    second.assert();

    // Rows merged in chunk order, meta from the first chunk.
    let merged = &result.responses[&polybridge_core::Interval::M5];
    let rows = &merged.probabilities.as_ref().unwrap().rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["ts"], 1);
    assert_eq!(rows[1]["ts"], 2);
    assert_eq!(merged.meta.as_ref().unwrap()["chunk"], 0);

    // Single interval group: frames keyed by block name alone.
    let frame = &result.dataframes["probabilities"];
    assert_eq!(frame.height(), 2);
    assert!(!result.dataframes.contains_key("probabilities_5m"));
}

#[test]
fn multiple_interval_groups_suffix_the_frame_keys() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api_v1_market_catalog");
        then.status(200).json_body(json!({"markets": [
            {"horizon": "daily", "market_id": "d-1"},
            {"horizon": "weekly", "market_id": "w-1"},
        ]}));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api_v1_merged")
            .json_body_partial(r#"{"interval": "5m"}"#);
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts"], "rows": [{"ts": 1}]},
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/api_v1_merged")
            .json_body_partial(r#"{"interval": "30m"}"#);
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts"], "rows": [{"ts": 2}, {"ts": 3}]},
        }));
    });

    let result = client_for(&server)
        .fetch_timeseries(&pinned_query(vec![Horizon::Daily, Horizon::Weekly]))
        .unwrap();

    assert_eq!(result.dataframes["probabilities_5m"].height(), 1);
    assert_eq!(result.dataframes["probabilities_30m"].height(), 2);
    assert!(!result.dataframes.contains_key("probabilities"));
}

#[test]
fn options_metrics_flag_never_reaches_the_wire_for_mapped_horizons() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api_v1_market_catalog");
        then.status(200).json_body(json!({"markets": [
            {"horizon": "daily", "market_id": "d-1"},
        ]}));
    });
    // Only a request WITHOUT options_metrics in `blocks` is answered; if
    // the gate ever let the block through, the fetch would 404 and fail.
    let merged = server.mock(|when, then| {
        when.method(POST).path("/api_v1_merged").json_body(json!({
            "markets": ["d-1"],
            "interval": "5m",
            "start_ts": START,
            "end_ts": END,
            "blocks": ["probabilities", "prices"],
            "prices": {"instrument_type": "spot", "include_open_interest": true},
        }));
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts"], "rows": []},
        }));
    });

    let mut query = pinned_query(vec![Horizon::Daily]);
    query.include_options_metrics = true;
    let result = client_for(&server).fetch_timeseries(&query).unwrap();

    merged.assert();
    // Present-but-empty block still gets a (empty) dataframe.
    assert_eq!(result.dataframes["probabilities"].height(), 0);
}

#[test]
fn present_block_with_empty_rows_keeps_its_frame_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api_v1_market_catalog");
        then.status(200).json_body(json!({"markets": [
            {"horizon": "monthly", "market_id": "m-1"},
        ]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api_v1_merged");
        then.status(200).json_body(json!({
            "probabilities": {"columns": ["ts", "p"], "rows": []},
            "prices": {"columns": ["ts", "px"], "rows": [{"ts": 1, "px": 42.0}]},
        }));
    });

    let result = client_for(&server)
        .fetch_timeseries(&pinned_query(vec![Horizon::Monthly]))
        .unwrap();

    assert_eq!(result.dataframes["probabilities"].height(), 0);
    assert_eq!(result.dataframes["prices"].height(), 1);
    assert!(!result.dataframes.contains_key("options_metrics"));
}
