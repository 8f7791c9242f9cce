//! Polybridge CLI — catalog and timeseries fetch commands.
//!
//! Commands:
//! - `catalog` — list markets matching an asset/horizon/market-type filter
//! - `fetch` — run the full timeseries pipeline and print the dataframes
//! - `up-or-down` — flattened up-or-down options timeseries
//! - `above` — flattened above options timeseries
//!
//! The API key comes from `--api-key` or the `POLYBRIDGE_API_KEY`
//! environment variable.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;

use polybridge_core::{
    AboveOptionsQuery, CatalogFilter, Horizon, InstrumentType, OptionsTimeseries, OutputFormat,
    PolybridgeClient, TimeseriesQuery, UpOrDownOptionsQuery,
};

#[derive(Parser)]
#[command(name = "polybridge", about = "Polybridge prediction-market analytics client")]
struct Cli {
    /// API key. Falls back to the POLYBRIDGE_API_KEY environment variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = 60)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List markets matching the given filters.
    Catalog {
        /// Asset symbols (e.g., BTC ETH).
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Horizons: daily, weekly, monthly, yearly.
        #[arg(long = "horizon")]
        horizons: Vec<String>,

        /// Market types (e.g., up-or-down, above).
        #[arg(long = "market-type")]
        market_types: Vec<String>,

        /// Start timestamp (ISO 8601).
        #[arg(long)]
        start: Option<String>,

        /// End timestamp (ISO 8601).
        #[arg(long)]
        end: Option<String>,
    },
    /// Fetch timeseries data and print one dataframe per block.
    Fetch {
        /// Asset symbol (e.g., BTC).
        asset: String,

        /// Horizons: daily, weekly, monthly, yearly. At least one.
        #[arg(long = "horizon", required = true)]
        horizons: Vec<String>,

        /// Market types (e.g., up-or-down, above).
        #[arg(long = "market-type")]
        market_types: Vec<String>,

        /// Start timestamp (ISO 8601). Defaults to `--hours` before the end.
        #[arg(long)]
        start: Option<String>,

        /// End timestamp (ISO 8601). Defaults to now.
        #[arg(long)]
        end: Option<String>,

        /// Hours of data when no explicit range is given.
        #[arg(long, default_value_t = 6.0)]
        hours: f64,

        /// Markets per bulk request.
        #[arg(long, default_value_t = 10)]
        chunk_size: usize,

        /// Skip the probabilities block.
        #[arg(long, default_value_t = false)]
        no_probabilities: bool,

        /// Skip the prices block.
        #[arg(long, default_value_t = false)]
        no_prices: bool,

        /// Skip open interest within the prices block.
        #[arg(long, default_value_t = false)]
        no_open_interest: bool,

        /// Request options metrics (IV, RV, ...).
        #[arg(long, default_value_t = false)]
        options_metrics: bool,

        /// Price instrument: spot or perp.
        #[arg(long, default_value = "spot")]
        instrument: String,
    },
    /// Flattened up-or-down options timeseries.
    UpOrDown {
        /// Asset symbol (e.g., BTC).
        asset: String,

        /// Start timestamp (ISO 8601).
        #[arg(long)]
        start: String,

        /// End timestamp (ISO 8601).
        #[arg(long)]
        end: String,

        /// Rolling window days for metrics (service default: 7 30).
        #[arg(long = "window-days")]
        window_days: Vec<u32>,
    },
    /// Flattened above options timeseries.
    Above {
        /// Asset symbol (e.g., BTC).
        asset: String,

        /// Start timestamp (ISO 8601).
        #[arg(long)]
        start: String,

        /// End timestamp (ISO 8601).
        #[arg(long)]
        end: String,

        /// Output format: long or wide.
        #[arg(long, default_value = "long")]
        format: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli)?;

    match cli.command {
        Commands::Catalog {
            assets,
            horizons,
            market_types,
            start,
            end,
        } => run_catalog(&client, assets, horizons, market_types, start, end),
        Commands::Fetch {
            asset,
            horizons,
            market_types,
            start,
            end,
            hours,
            chunk_size,
            no_probabilities,
            no_prices,
            no_open_interest,
            options_metrics,
            instrument,
        } => {
            let mut query = TimeseriesQuery::new(asset, parse_horizons(&horizons)?);
            query.market_types = market_types;
            query.start_ts = start;
            query.end_ts = end;
            query.hours = hours;
            query.chunk_size = chunk_size;
            query.include_probabilities = !no_probabilities;
            query.include_prices = !no_prices;
            query.include_open_interest = !no_open_interest;
            query.include_options_metrics = options_metrics;
            query.prices_instrument = parse_instrument(&instrument)?;
            run_fetch(&client, &query)
        }
        Commands::UpOrDown {
            asset,
            start,
            end,
            window_days,
        } => {
            let mut query = UpOrDownOptionsQuery::new(asset, start, end);
            if !window_days.is_empty() {
                query.window_days = Some(window_days);
            }
            let response = client.fetch_up_or_down_options_timeseries(&query)?;
            print_flat(&response)
        }
        Commands::Above {
            asset,
            start,
            end,
            format,
        } => {
            let mut query = AboveOptionsQuery::new(asset, start, end);
            query.format = parse_format(&format)?;
            let response = client.fetch_above_options_timeseries(&query)?;
            print_flat(&response)
        }
    }
}

fn build_client(cli: &Cli) -> Result<PolybridgeClient> {
    let api_key = match &cli.api_key {
        Some(key) => key.clone(),
        None => std::env::var("POLYBRIDGE_API_KEY")
            .context("no API key: pass --api-key or set POLYBRIDGE_API_KEY")?,
    };

    let mut builder =
        PolybridgeClient::builder(api_key).timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url.clone());
    }
    Ok(builder.build()?)
}

fn parse_horizons(raw: &[String]) -> Result<Vec<Horizon>> {
    raw.iter()
        .map(|h| {
            Horizon::from_wire(h)
                .ok_or_else(|| anyhow::anyhow!("unknown horizon '{h}'. Valid: daily, weekly, monthly, yearly"))
        })
        .collect()
}

fn parse_instrument(raw: &str) -> Result<InstrumentType> {
    match raw {
        "spot" => Ok(InstrumentType::Spot),
        "perp" => Ok(InstrumentType::Perp),
        other => bail!("unknown instrument '{other}'. Valid: spot, perp"),
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    match raw {
        "long" => Ok(OutputFormat::Long),
        "wide" => Ok(OutputFormat::Wide),
        other => bail!("unknown format '{other}'. Valid: long, wide"),
    }
}

fn run_catalog(
    client: &PolybridgeClient,
    assets: Vec<String>,
    horizons: Vec<String>,
    market_types: Vec<String>,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let filter = CatalogFilter {
        assets,
        horizons: parse_horizons(&horizons)?,
        market_types,
        start_ts: start,
        end_ts: end,
    };
    let response = client.fetch_market_catalog(&filter)?;

    println!("Markets: {}", response.markets.len());
    println!("{}", serde_json::to_string_pretty(&response.markets)?);
    Ok(())
}

fn run_fetch(client: &PolybridgeClient, query: &TimeseriesQuery) -> Result<()> {
    let result = client.fetch_timeseries(query)?;

    println!("Catalog markets: {}", result.catalog.len());
    if result.dataframes.is_empty() {
        println!("No data for the given filters.");
        return Ok(());
    }
    for (key, frame) in &result.dataframes {
        println!();
        println!("=== {key} ({} rows) ===", frame.height());
        println!("{frame}");
    }
    Ok(())
}

fn print_flat(response: &OptionsTimeseries) -> Result<()> {
    println!("Rows: {}", response.rows.len());
    println!("{}", serde_json::to_string_pretty(&response.rows)?);
    if let Some(meta) = &response.meta {
        println!("meta: {}", serde_json::to_string_pretty(meta)?);
    }
    Ok(())
}
