//! The Polybridge client and the timeseries orchestration pipeline.
//!
//! `fetch_timeseries` is the main entry point: it resolves the market
//! catalog for an asset, groups markets by sampling interval, issues the
//! bulk requests in fixed-size chunks, folds the chunk responses together,
//! and turns each block into a dataframe.

use chrono::{DateTime, Utc};
use polars::frame::DataFrame;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::catalog::{group_by_interval, CatalogEntry, CatalogFilter, CatalogResponse};
use crate::error::PolybridgeError;
use crate::horizon::{Horizon, Interval};
use crate::merged::{chunked, Block, InstrumentType, MergedRequest, MergedResponse, PriceOptions};
use crate::options::{AboveOptionsQuery, OptionsTimeseries, UpOrDownOptionsQuery};
use crate::timeutil::{ensure_datetime, to_iso};
use crate::transport::Transport;
use crate::frames;

/// Production base URL; override with [`ClientBuilder::base_url`].
pub const DEFAULT_BASE_URL: &str =
    "https://us-central1-polymarket-analytics-api.cloudfunctions.net";

/// Per-request timeout applied when no custom HTTP client is supplied.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ENDPOINT_CATALOG: &str = "api_v1_market_catalog";
const ENDPOINT_MERGED: &str = "api_v1_merged";
const ENDPOINT_UP_OR_DOWN: &str = "api_v1_up_or_down_options_timeseries";
const ENDPOINT_ABOVE: &str = "api_v1_above_options_timeseries";

/// Parameters for [`PolybridgeClient::fetch_timeseries`].
///
/// Construct with [`TimeseriesQuery::new`] and adjust fields as needed;
/// the defaults mirror what the service considers a standard query.
#[derive(Debug, Clone)]
pub struct TimeseriesQuery {
    /// Asset symbol, e.g. "BTC".
    pub asset: String,
    /// Horizons to fetch; must be non-empty.
    pub horizons: Vec<Horizon>,
    /// Optional market-type filter, e.g. `["up-or-down", "above"]`.
    pub market_types: Vec<String>,
    /// Start of the range; defaults to `hours` before the end.
    pub start_ts: Option<String>,
    /// End of the range; defaults to now.
    pub end_ts: Option<String>,
    /// Range width used when `start_ts`/`end_ts` are absent.
    pub hours: f64,
    pub include_probabilities: bool,
    pub include_prices: bool,
    pub include_open_interest: bool,
    pub include_options_metrics: bool,
    pub prices_instrument: InstrumentType,
    /// Markets per bulk request.
    pub chunk_size: usize,
}

impl TimeseriesQuery {
    pub fn new(asset: impl Into<String>, horizons: Vec<Horizon>) -> Self {
        Self {
            asset: asset.into(),
            horizons,
            market_types: Vec::new(),
            start_ts: None,
            end_ts: None,
            hours: 6.0,
            include_probabilities: true,
            include_prices: true,
            include_open_interest: true,
            include_options_metrics: false,
            prices_instrument: InstrumentType::Spot,
            chunk_size: 10,
        }
    }
}

/// Everything a timeseries fetch produced: the raw catalog, the merged
/// per-interval responses, and the per-block dataframes.
///
/// Dataframe keys are block names when a single interval group was
/// queried, else `"{block}_{interval}"`.
#[derive(Debug, Clone, Default)]
pub struct TimeseriesResult {
    pub catalog: Vec<CatalogEntry>,
    pub responses: BTreeMap<Interval, MergedResponse>,
    pub dataframes: BTreeMap<String, DataFrame>,
}

/// Builder for [`PolybridgeClient`].
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Option<reqwest::blocking::Client>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supply a pre-configured HTTP client (connection pool reuse across
    /// Polybridge clients). `timeout` is ignored in that case; configure it
    /// on the supplied client instead.
    pub fn http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<PolybridgeClient, PolybridgeError> {
        let transport = Transport::new(self.api_key, self.base_url, self.timeout, self.http)?;
        Ok(PolybridgeClient { transport })
    }
}

/// Blocking client for the Polybridge analytics API.
///
/// One HTTP connection pool is created at construction and reused for the
/// client's lifetime. All calls are synchronous; nothing is cached or
/// retried.
pub struct PolybridgeClient {
    transport: Transport,
}

impl PolybridgeClient {
    /// Build a client with the production base URL and default timeout.
    ///
    /// Fails if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PolybridgeError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Fetch the market catalog matching a filter. One network call.
    pub fn fetch_market_catalog(
        &self,
        filter: &CatalogFilter,
    ) -> Result<CatalogResponse, PolybridgeError> {
        self.transport.post(ENDPOINT_CATALOG, filter)
    }

    /// Fetch timeseries data for an asset across one or more horizons.
    ///
    /// Resolves the catalog, groups markets by interval, requests bulk data
    /// in chunks of `query.chunk_size` ids, merges the chunk responses per
    /// interval, and builds one dataframe per block. An empty catalog is
    /// not an error: it yields an all-empty result without further network
    /// calls. Any request failure aborts the whole fetch.
    pub fn fetch_timeseries(
        &self,
        query: &TimeseriesQuery,
    ) -> Result<TimeseriesResult, PolybridgeError> {
        if query.horizons.is_empty() {
            return Err(PolybridgeError::Validation(
                "at least one horizon must be provided".into(),
            ));
        }
        if query.chunk_size == 0 {
            return Err(PolybridgeError::Validation(
                "chunk_size must be at least 1".into(),
            ));
        }

        let end_dt = ensure_datetime(query.end_ts.as_deref(), Utc::now())?;
        let start_dt = ensure_datetime(
            query.start_ts.as_deref(),
            end_dt - chrono::Duration::milliseconds((query.hours * 3_600_000.0) as i64),
        )?;

        let filter = CatalogFilter {
            assets: vec![query.asset.clone()],
            horizons: query.horizons.clone(),
            market_types: query.market_types.clone(),
            // Forwarded only when the caller pinned the range explicitly.
            start_ts: query.start_ts.as_ref().map(|_| to_iso(start_dt)),
            end_ts: query.end_ts.as_ref().map(|_| to_iso(end_dt)),
        };
        let catalog = self.fetch_market_catalog(&filter)?.markets;
        if catalog.is_empty() {
            debug!(asset = %query.asset, "catalog empty, nothing to fetch");
            return Ok(TimeseriesResult::default());
        }

        let groups = group_by_interval(&catalog);
        let single_group = groups.len() == 1;
        debug!(
            asset = %query.asset,
            markets = catalog.len(),
            intervals = groups.len(),
            "catalog resolved"
        );

        let mut responses: BTreeMap<Interval, MergedResponse> = BTreeMap::new();
        let mut dataframes: BTreeMap<String, DataFrame> = BTreeMap::new();

        for (interval, ids) in groups {
            let mut unique = ids;
            unique.sort();
            unique.dedup();
            if unique.is_empty() {
                continue;
            }

            let (blocks, prices) = requested_blocks(query, interval);
            let mut aggregated = MergedResponse::default();

            for chunk in chunked(&unique, query.chunk_size) {
                let request = MergedRequest {
                    markets: chunk,
                    interval,
                    start_ts: to_iso(start_dt),
                    end_ts: to_iso(end_dt),
                    blocks: blocks.clone(),
                    prices,
                };
                let response: MergedResponse = self.transport.post(ENDPOINT_MERGED, &request)?;
                aggregated.merge_from(response);
            }

            for (block, frame) in frames::response_frames(&aggregated)? {
                let key = if single_group {
                    block.to_string()
                } else {
                    format!("{block}_{interval}")
                };
                dataframes.insert(key, frame);
            }
            responses.insert(interval, aggregated);
        }

        Ok(TimeseriesResult {
            catalog,
            responses,
            dataframes,
        })
    }

    /// Fetch the flattened up-or-down options timeseries (probabilities for
    /// the "next" and "next+1" markets, options metrics, spot prices).
    /// Single request; the response is returned undecorated.
    pub fn fetch_up_or_down_options_timeseries(
        &self,
        query: &UpOrDownOptionsQuery,
    ) -> Result<OptionsTimeseries, PolybridgeError> {
        self.transport.post(ENDPOINT_UP_OR_DOWN, query)
    }

    /// Fetch the flattened above options timeseries (above probabilities
    /// with strikes across relative horizons, spot prices). Single request;
    /// the response is returned undecorated.
    pub fn fetch_above_options_timeseries(
        &self,
        query: &AboveOptionsQuery,
    ) -> Result<OptionsTimeseries, PolybridgeError> {
        self.transport.post(ENDPOINT_ABOVE, query)
    }
}

/// Blocks (and price options) to request for one interval.
fn requested_blocks(
    query: &TimeseriesQuery,
    interval: Interval,
) -> (Vec<Block>, Option<PriceOptions>) {
    let mut blocks = Vec::new();
    let mut prices = None;

    if query.include_probabilities {
        blocks.push(Block::Probabilities);
    }
    if query.include_prices {
        blocks.push(Block::Prices);
        prices = Some(PriceOptions {
            instrument_type: query.prices_instrument,
            include_open_interest: query.include_open_interest,
        });
    }
    // The service only serves options metrics at 1d bars. No horizon in the
    // fixed map produces 1d, so catalog-driven fetches never request this
    // block; the gate is kept to match the service contract as shipped.
    if query.include_options_metrics && interval == Interval::D1 {
        blocks.push(Block::OptionsMetrics);
    }

    (blocks, prices)
}
