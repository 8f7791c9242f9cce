//! Bulk-data endpoint types and the chunk-merge machinery.
//!
//! One bulk request carries a batch of market ids plus the interval, time
//! range, and the list of requested blocks. Responses for one interval are
//! folded together block by block with [`MergedResponse::merge_from`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::horizon::Interval;

/// Named category of returned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Probabilities,
    Prices,
    OptionsMetrics,
}

impl Block {
    /// The blocks a merged response can carry, in merge order.
    pub const ALL: [Block; 3] = [Block::Probabilities, Block::Prices, Block::OptionsMetrics];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Probabilities => "probabilities",
            Self::Prices => "prices",
            Self::OptionsMetrics => "options_metrics",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price instrument to quote in the prices block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    #[default]
    Spot,
    Perp,
}

/// Nested options for the prices block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceOptions {
    pub instrument_type: InstrumentType,
    pub include_open_interest: bool,
}

/// Body of one bulk-data request for a single batch of market ids.
#[derive(Debug, Clone, Serialize)]
pub struct MergedRequest {
    pub markets: Vec<String>,
    pub interval: Interval,
    pub start_ts: String,
    pub end_ts: String,
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<PriceOptions>,
}

/// One block of a bulk response: a row list sharing a column schema.
///
/// Row shape is service-defined, so rows stay as raw JSON objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

/// Decoded bulk response; doubles as the per-interval accumulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BlockTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<BlockTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_metrics: Option<BlockTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl MergedResponse {
    pub fn block(&self, block: Block) -> Option<&BlockTable> {
        match block {
            Block::Probabilities => self.probabilities.as_ref(),
            Block::Prices => self.prices.as_ref(),
            Block::OptionsMetrics => self.options_metrics.as_ref(),
        }
    }

    fn slot_mut(&mut self, block: Block) -> &mut Option<BlockTable> {
        match block {
            Block::Probabilities => &mut self.probabilities,
            Block::Prices => &mut self.prices,
            Block::OptionsMetrics => &mut self.options_metrics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_none()
            && self.prices.is_none()
            && self.options_metrics.is_none()
            && self.meta.is_none()
    }

    /// Fold one chunk response into this accumulator.
    ///
    /// An empty accumulator becomes the source outright. Otherwise each
    /// block present in the source either lands as-is (columns and rows) or
    /// has its rows appended after the existing ones, preserving chunk
    /// arrival order. `meta` is adopted from the first chunk that has one.
    pub fn merge_from(&mut self, mut source: MergedResponse) {
        if self.is_empty() {
            *self = source;
            return;
        }

        for block in Block::ALL {
            if let Some(incoming) = source.slot_mut(block).take() {
                match self.slot_mut(block) {
                    Some(existing) => existing.rows.extend(incoming.rows),
                    slot @ None => *slot = Some(incoming),
                }
            }
        }

        if self.meta.is_none() {
            self.meta = source.meta.take();
        }
    }
}

/// Split ids into contiguous batches of at most `size`; the last batch may
/// be smaller. An empty input yields no batches.
pub fn chunked<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}
