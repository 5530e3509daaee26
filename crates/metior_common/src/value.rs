//! Argument values and bindings passed through cost evaluation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single argument value: either a resolved number or raw text.
///
/// Text values originate from operation notation (`sram.read(width=64)`)
/// and are interpreted as constant expressions by the script layer.
/// Number values originate from instance arguments and parameter sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// A numeric value.
    Number(f64),
    /// An uninterpreted textual value.
    Text(String),
}

impl ArgValue {
    /// Returns the numeric value if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            ArgValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral values print without a trailing ".0" so that textual
            // substitution into operation arguments stays readable.
            ArgValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            ArgValue::Number(n) => write!(f, "{n}"),
            ArgValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<u64> for ArgValue {
    fn from(n: u64) -> Self {
        ArgValue::Number(n as f64)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Text(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Text(s)
    }
}

/// An ordered mapping of argument names to values.
///
/// Insertion order is preserved for deterministic reporting, but memoization
/// keys are order-independent (see [`canonical_args`]).
pub type ArgBindings = IndexMap<String, ArgValue>;

/// Produces an order-independent cache key for a set of argument bindings.
///
/// Two logically identical binding sets must hit the same memoization entry
/// regardless of insertion order, so the key is the sorted `name=value`
/// pairs joined with commas.
pub fn canonical_args(args: &ArgBindings) -> String {
    let mut pairs: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort_unstable();
    pairs.join(",")
}
