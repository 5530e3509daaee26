//! Parsing of `object.method(arg1=v1, arg2=v2)` call notation.
//!
//! Operation definitions and operation lists reference component methods
//! with this notation. The parser is deliberately small: it splits on the
//! first `.`, an optional `(...)` argument list, and `name=value` pairs
//! separated by commas. Values are kept as raw text; interpretation happens
//! downstream in the script layer.

use crate::error::{EvalError, EvalResult};
use indexmap::IndexMap;

/// A parsed `object.method(args)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// The target object name, if the notation contained a `.` prefix.
    pub target: Option<String>,
    /// The method name.
    pub method: String,
    /// Ordered `name -> raw value` argument pairs.
    pub args: IndexMap<String, String>,
}

impl MethodCall {
    /// Returns the target name, or a [`EvalError::MalformedOperation`] in
    /// contexts that require one.
    pub fn require_target(&self) -> EvalResult<&str> {
        self.target.as_deref().ok_or_else(|| {
            EvalError::malformed_operation(format!(
                "'{}' has no target component (expected 'object.method(...)')",
                self.method
            ))
        })
    }
}

/// Parses method-call notation into its target, method, and arguments.
///
/// Absence of `.` implies no target object; absence of `(` implies a
/// zero-argument call. Argument pairs split on the first `=`, and both
/// names and values are whitespace-trimmed.
///
/// # Errors
///
/// Returns [`EvalError::MalformedOperation`] on an empty method name, an
/// unterminated argument list, or an argument without `=`.
pub fn parse_method_notation(notation: &str) -> EvalResult<MethodCall> {
    let s = notation.trim();
    if s.is_empty() {
        return Err(EvalError::malformed_operation("empty operation string"));
    }

    let (target, rest) = match s.split_once('.') {
        Some((obj, rest)) => (Some(obj.trim().to_string()), rest),
        None => (None, s),
    };

    let (method, args) = match rest.split_once('(') {
        Some((name, arg_str)) => {
            let inner = arg_str
                .strip_suffix(')')
                .ok_or_else(|| {
                    EvalError::malformed_operation(format!("unterminated argument list in '{s}'"))
                })?
                .trim();
            (name.trim(), parse_arg_pairs(inner, s)?)
        }
        None => (rest.trim(), IndexMap::new()),
    };

    if method.is_empty() {
        return Err(EvalError::malformed_operation(format!(
            "missing method name in '{s}'"
        )));
    }

    Ok(MethodCall {
        target,
        method: method.to_string(),
        args,
    })
}

fn parse_arg_pairs(inner: &str, whole: &str) -> EvalResult<IndexMap<String, String>> {
    let mut args = IndexMap::new();
    if inner.is_empty() {
        return Ok(args);
    }
    for pair in inner.split(',') {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            EvalError::malformed_operation(format!("argument '{pair}' in '{whole}' is not 'name=value'"))
        })?;
        args.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(args)
}
