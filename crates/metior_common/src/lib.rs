//! Shared foundational types for the Metior cost-modeling toolchain.
//!
//! This crate provides the cost feature axis, argument value bindings,
//! data-size units, `object.method(args)` notation parsing, and the common
//! evaluation error taxonomy used across the workspace.

#![warn(missing_docs)]

pub mod error;
pub mod feature;
pub mod notation;
pub mod units;
pub mod value;

pub use error::{EvalError, EvalResult};
pub use feature::{Feature, ParseFeatureError};
pub use notation::{parse_method_notation, MethodCall};
pub use units::{DataUnit, ParseUnitError};
pub use value::{canonical_args, ArgBindings, ArgValue};
