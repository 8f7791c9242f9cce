//! Polybridge — client for a prediction-market analytics API.
//!
//! The library wraps the service's `/v1` endpoints so callers can ask for
//! assets, horizons, and market types without dealing with individual
//! market identifiers, interval mappings, or request batching:
//! - Catalog lookup (`fetch_market_catalog`)
//! - Orchestrated timeseries fetch with chunked bulk requests, response
//!   merging, and polars dataframe assembly (`fetch_timeseries`)
//! - Two flattened options-timeseries passthroughs
//!
//! ```no_run
//! use polybridge_core::{Horizon, PolybridgeClient, TimeseriesQuery};
//!
//! # fn main() -> Result<(), polybridge_core::PolybridgeError> {
//! let client = PolybridgeClient::new("your-api-key")?;
//! let result = client.fetch_timeseries(&TimeseriesQuery::new(
//!     "BTC",
//!     vec![Horizon::Daily, Horizon::Weekly],
//! ))?;
//! if let Some(probabilities) = result.dataframes.get("probabilities_5m") {
//!     println!("{probabilities}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod error;
pub mod frames;
pub mod horizon;
pub mod merged;
pub mod options;
pub mod timeutil;

mod transport;

pub use catalog::{CatalogEntry, CatalogFilter, CatalogResponse};
pub use client::{
    ClientBuilder, PolybridgeClient, TimeseriesQuery, TimeseriesResult, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT,
};
pub use error::PolybridgeError;
pub use horizon::{Horizon, Interval};
pub use merged::{Block, BlockTable, InstrumentType, MergedRequest, MergedResponse, PriceOptions};
pub use options::{AboveOptionsQuery, OptionsTimeseries, OutputFormat, UpOrDownOptionsQuery};
