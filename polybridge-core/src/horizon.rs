//! Market horizons and their sampling intervals.
//!
//! Every catalog entry carries a coarse horizon (daily/weekly/monthly/yearly).
//! Bulk data is queried at a sampling interval derived from that horizon via
//! a fixed 1:1 mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse time-range category for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Horizon {
    /// Parse the wire string used by the catalog endpoint.
    ///
    /// Returns `None` for unrecognized horizons; callers skip those entries.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The sampling interval used when querying bulk data for this horizon.
    ///
    /// This mapping is fixed; the remote service expects exactly these pairs.
    pub fn interval(self) -> Interval {
        match self {
            Self::Daily => Interval::M5,
            Self::Weekly => Interval::M30,
            Self::Monthly => Interval::H1,
            Self::Yearly => Interval::H4,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling granularity for bulk data requests.
///
/// `D1` is accepted by the bulk endpoint but is not produced by any horizon
/// in the fixed mapping; it exists only for the options-metrics gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M5 => "5m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_interval_mapping_is_fixed() {
        assert_eq!(Horizon::Daily.interval(), Interval::M5);
        assert_eq!(Horizon::Weekly.interval(), Interval::M30);
        assert_eq!(Horizon::Monthly.interval(), Interval::H1);
        assert_eq!(Horizon::Yearly.interval(), Interval::H4);
    }

    #[test]
    fn no_horizon_maps_to_the_daily_bar_interval() {
        for horizon in [
            Horizon::Daily,
            Horizon::Weekly,
            Horizon::Monthly,
            Horizon::Yearly,
        ] {
            assert_ne!(horizon.interval(), Interval::D1);
        }
    }

    #[test]
    fn from_wire_rejects_unknown_horizons() {
        assert_eq!(Horizon::from_wire("daily"), Some(Horizon::Daily));
        assert_eq!(Horizon::from_wire("hourly"), None);
        assert_eq!(Horizon::from_wire(""), None);
        assert_eq!(Horizon::from_wire("Daily"), None);
    }

    #[test]
    fn wire_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&Interval::M30).unwrap();
        assert_eq!(json, "\"30m\"");
        let back: Interval = serde_json::from_str("\"4h\"").unwrap();
        assert_eq!(back, Interval::H4);

        let json = serde_json::to_string(&Horizon::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
    }
}
