//! Market catalog types and interval grouping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::horizon::{Horizon, Interval};

/// Filter for the catalog endpoint. Empty/absent fields are omitted from
/// the request body entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub horizons: Vec<Horizon>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub market_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<String>,
}

/// One market in the catalog.
///
/// The service may attach fields beyond the two we rely on; those are kept
/// opaque in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of the catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub markets: Vec<CatalogEntry>,
}

/// Group catalog entries by the sampling interval their horizon maps to.
///
/// Entries missing a horizon or market id, or carrying a horizon outside
/// the fixed mapping, are skipped silently. Pure bookkeeping; no I/O.
pub fn group_by_interval(entries: &[CatalogEntry]) -> BTreeMap<Interval, Vec<String>> {
    let mut groups: BTreeMap<Interval, Vec<String>> = BTreeMap::new();
    for entry in entries {
        let (Some(horizon), Some(market_id)) = (entry.horizon.as_deref(), entry.market_id.as_deref())
        else {
            continue;
        };
        if horizon.is_empty() || market_id.is_empty() {
            continue;
        }
        let Some(horizon) = Horizon::from_wire(horizon) else {
            continue;
        };
        groups
            .entry(horizon.interval())
            .or_default()
            .push(market_id.to_string());
    }
    groups
}
