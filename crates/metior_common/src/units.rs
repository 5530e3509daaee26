//! Data-size units and bit conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A data-size unit convertible to bits.
///
/// Conversion assumes 1KB = 1024 bytes, not 1000 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataUnit {
    /// A single bit.
    Bit,
    /// One byte (8 bits).
    Byte,
    /// One kibibyte (8 * 1024 bits).
    #[serde(alias = "KB")]
    Kilobyte,
}

impl DataUnit {
    /// Converts a size in this unit to bits.
    pub fn to_bits(&self, size: u64) -> u64 {
        match self {
            DataUnit::Bit => size,
            DataUnit::Byte => size * 8,
            DataUnit::Kilobyte => size * 8 * 1024,
        }
    }
}

impl fmt::Display for DataUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataUnit::Bit => f.write_str("bit"),
            DataUnit::Byte => f.write_str("byte"),
            DataUnit::Kilobyte => f.write_str("KB"),
        }
    }
}

/// Error type for parsing data-unit names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUnitError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown unit '{}' (supported: bit, byte, KB)",
            self.input
        )
    }
}

impl std::error::Error for ParseUnitError {}

impl FromStr for DataUnit {
    type Err = ParseUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bit" | "bits" => Ok(DataUnit::Bit),
            "byte" | "bytes" => Ok(DataUnit::Byte),
            "KB" | "kb" => Ok(DataUnit::Kilobyte),
            _ => Err(ParseUnitError {
                input: s.to_string(),
            }),
        }
    }
}
