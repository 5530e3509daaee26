//! Estimation reports and reference-table rendering.
//!
//! Rendering here produces plain strings: per-component breakdowns, the
//! architecture total, and CSV for the cost matrix. Writing files, tables,
//! or plots from these strings is the concern of external callers.

use crate::matrix::CostMatrix;
use indexmap::IndexMap;
use metior_arch::Architecture;
use metior_common::{EvalResult, Feature};
use serde::Serialize;

/// The result of evaluating one feature over an operation list.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    /// The evaluated feature.
    pub feature: Feature,
    /// The component × operation cost matrix.
    pub matrix: CostMatrix,
    /// Per-component totals across all operations.
    pub component_totals: IndexMap<String, f64>,
    /// The architecture total.
    pub total: f64,
}

impl EstimateReport {
    /// Renders the per-component breakdown and total as text.
    pub fn render_text(&self) -> String {
        let unit = self.feature.unit();
        let mut out = String::new();
        out.push_str(&format!("===== {} Estimation =====\n", capitalize(self.feature.as_str())));
        for (component, value) in &self.component_totals {
            out.push_str(&format!("\tComponent: {component}\n\tValue: {value} {unit}\n"));
        }
        out.push_str(&format!("{}\n", "=".repeat(20)));
        out.push_str(&format!(
            "Total {} Estimation: {} {}\n",
            capitalize(self.feature.as_str()),
            round5(self.total),
            unit
        ));
        out
    }

    /// Renders the cost matrix as CSV.
    pub fn matrix_csv(&self) -> String {
        self.matrix.to_csv_string()
    }
}

/// Renders every component's per-operation reference costs for a feature.
///
/// The reference table evaluates each component's known operations at
/// defaults (no runtime arguments, no operation list involved).
pub fn render_reference_table(architecture: &Architecture, feature: Feature) -> EvalResult<String> {
    let unit = feature.unit();
    let mut out = String::new();
    out.push_str(&format!(
        "===== {} Reference Table =====\n\n",
        capitalize(feature.as_str())
    ));
    out.push_str(&format!(
        "{}, v.{}\n\n",
        architecture.name(),
        architecture.version()
    ));
    for component in architecture.components().values() {
        out.push_str("===== Component =====\n");
        out.push_str(&format!("Component Name: {}\n", component.name()));
        out.push_str(&format!("Component Class: {}\n", component.class_name()));
        for (operation, value) in component.feature_reference_table(feature)? {
            out.push_str(&format!("\tOperation: {operation}\n"));
            out.push_str(&format!("\t{}: {value} {unit}\n", capitalize(feature.as_str())));
            out.push_str("\t----------\n");
        }
    }
    Ok(out)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn round5(value: f64) -> f64 {
    (value * 1e5).round() / 1e5
}
