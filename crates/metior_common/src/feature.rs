//! The cost feature axis: energy, area, and cycle count.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three cost dimensions tracked throughout the toolchain.
///
/// Every component exposes per-feature cost tables, and the estimator
/// evaluates one feature at a time. Energy aggregates by summing, cycle
/// by critical path, and area is structural (operation-invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Dynamic energy, reported in picojoules.
    Energy,
    /// Silicon area, reported in square micrometers.
    Area,
    /// Latency, reported in clock cycles.
    Cycle,
}

impl Feature {
    /// All features, in the canonical reporting order.
    pub const ALL: [Feature; 3] = [Feature::Energy, Feature::Area, Feature::Cycle];

    /// The lowercase name used in cost tables and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Energy => "energy",
            Feature::Area => "area",
            Feature::Cycle => "cycle",
        }
    }

    /// The display unit for reported values.
    pub fn unit(&self) -> &'static str {
        match self {
            Feature::Energy => "pJ",
            Feature::Area => "um^2",
            Feature::Cycle => "cycles",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing feature names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFeatureError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseFeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid feature: '{}'", self.input)
    }
}

impl std::error::Error for ParseFeatureError {}

impl FromStr for Feature {
    type Err = ParseFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energy" => Ok(Feature::Energy),
            "area" => Ok(Feature::Area),
            "cycle" | "cycles" => Ok(Feature::Cycle),
            _ => Err(ParseFeatureError {
                input: s.to_string(),
            }),
        }
    }
}
