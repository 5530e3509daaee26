//! Deny-list sandbox scan applied before script compilation.
//!
//! The expression grammar already excludes I/O, process control, and
//! introspection, but the deny list runs first and rejects source that even
//! mentions such capabilities. This guards the construction boundary: cost
//! scripts arrive from an external lookup service and are never trusted.

use metior_common::{EvalError, EvalResult};

/// Substrings that cause a script to be rejected at construction time.
const DENIED: &[&str] = &[
    "import", "open", "exec", "eval", "compile", "__", "std::", "unsafe", "fn ", "use ",
    "include", "env", "file", "self", "process", "system", "spawn",
];

/// Scans a source fragment for denied keywords.
///
/// # Errors
///
/// Returns [`EvalError::UnsafeScript`] naming the first denied keyword found.
pub fn check_clean(source: &str) -> EvalResult<()> {
    for keyword in DENIED {
        if source.contains(keyword) {
            return Err(EvalError::UnsafeScript {
                reason: format!("contains denied keyword '{}'", keyword.trim_end()),
            });
        }
    }
    Ok(())
}
