//! Flattened options-timeseries endpoints.
//!
//! These two endpoints bypass the catalog/chunk/merge pipeline entirely:
//! one request in, one already-flattened response out.

use serde::{Deserialize, Serialize};

use crate::horizon::Horizon;

/// Request for the up-or-down options timeseries endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UpOrDownOptionsQuery {
    pub asset: String,
    pub start_ts: String,
    pub end_ts: String,
    /// Only `daily` is currently supported by the service.
    pub horizon: Horizon,
    /// Rolling window days for the metrics; the service defaults to `[7, 30]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<Vec<u32>>,
}

impl UpOrDownOptionsQuery {
    pub fn new(
        asset: impl Into<String>,
        start_ts: impl Into<String>,
        end_ts: impl Into<String>,
    ) -> Self {
        Self {
            asset: asset.into(),
            start_ts: start_ts.into(),
            end_ts: end_ts.into(),
            horizon: Horizon::Daily,
            window_days: None,
        }
    }
}

/// Row layout of the above endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per timestamp+horizon+strike.
    #[default]
    Long,
    /// One row per timestamp, with sorted strike columns.
    Wide,
}

/// Request for the above options timeseries endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AboveOptionsQuery {
    pub asset: String,
    pub start_ts: String,
    pub end_ts: String,
    pub format: OutputFormat,
    /// Only `daily` is currently supported by the service.
    pub horizon: Horizon,
}

impl AboveOptionsQuery {
    pub fn new(
        asset: impl Into<String>,
        start_ts: impl Into<String>,
        end_ts: impl Into<String>,
    ) -> Self {
        Self {
            asset: asset.into(),
            start_ts: start_ts.into(),
            end_ts: end_ts.into(),
            format: OutputFormat::Long,
            horizon: Horizon::Daily,
        }
    }
}

/// Decoded response of either flattened endpoint, returned unprocessed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsTimeseries {
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_or_down_body_omits_absent_window_days() {
        let query = UpOrDownOptionsQuery::new("BTC", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["horizon"], "daily");
        assert!(body.get("window_days").is_none());

        let mut query = query;
        query.window_days = Some(vec![7, 30]);
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["window_days"], serde_json::json!([7, 30]));
    }

    #[test]
    fn above_body_carries_the_format() {
        let mut query = AboveOptionsQuery::new("ETH", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
        query.format = OutputFormat::Wide;
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["format"], "wide");
        assert_eq!(body["asset"], "ETH");
    }
}
