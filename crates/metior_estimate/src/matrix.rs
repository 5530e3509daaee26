//! The component × operation cost matrix.

use serde::Serialize;
use std::collections::HashMap;

/// A dense matrix of per-component, per-operation cost values.
///
/// Rows are component names plus a synthetic [`total`](Self::TOTAL_ROW)
/// row; columns are operation indices. Cells are addressed by row name, and
/// aggregate queries (`column_component_sum`, `column_component_max`)
/// deliberately exclude the total row.
#[derive(Debug, Clone, Serialize)]
pub struct CostMatrix {
    row_names: Vec<String>,
    columns: usize,
    data: Vec<Vec<f64>>,
    #[serde(skip)]
    row_index: HashMap<String, usize>,
}

impl CostMatrix {
    /// The name of the synthetic total row.
    pub const TOTAL_ROW: &'static str = "total";

    /// Creates a zero-filled matrix for the given components and column count.
    pub fn new(component_names: &[String], columns: usize) -> Self {
        let mut row_names: Vec<String> = component_names.to_vec();
        row_names.push(Self::TOTAL_ROW.to_string());
        let row_index = row_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let data = vec![vec![0.0; columns]; row_names.len()];
        Self {
            row_names,
            columns,
            data,
            row_index,
        }
    }

    /// The number of operation columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// All row names, the total row last.
    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    /// The component row names (total row excluded).
    pub fn component_names(&self) -> &[String] {
        &self.row_names[..self.row_names.len() - 1]
    }

    /// Reads one cell.
    ///
    /// # Panics
    ///
    /// Panics if the row name or column is out of range; rows and columns
    /// are fixed at construction, so this indicates a caller bug.
    pub fn get(&self, row: &str, col: usize) -> f64 {
        self.data[self.row_index[row]][col]
    }

    /// Writes one cell.
    pub fn set(&mut self, row: &str, col: usize, value: f64) {
        let r = self.row_index[row];
        self.data[r][col] = value;
    }

    /// Adds to one cell.
    pub fn add(&mut self, row: &str, col: usize, delta: f64) {
        let r = self.row_index[row];
        self.data[r][col] += delta;
    }

    /// Sum of the component rows in one column.
    pub fn column_component_sum(&self, col: usize) -> f64 {
        self.component_rows().map(|(_, row)| row[col]).sum()
    }

    /// Maximum over the component rows in one column.
    pub fn column_component_max(&self, col: usize) -> f64 {
        self.component_rows()
            .map(|(_, row)| row[col])
            .fold(0.0, f64::max)
    }

    /// Sum across one row.
    pub fn row_sum(&self, row: &str) -> f64 {
        self.data[self.row_index[row]].iter().sum()
    }

    /// The first column's value in one row, or zero with no columns.
    pub fn row_first(&self, row: &str) -> f64 {
        self.data[self.row_index[row]].first().copied().unwrap_or(0.0)
    }

    fn component_rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.row_names[..self.row_names.len() - 1]
            .iter()
            .map(move |name| (name.as_str(), self.data[self.row_index[name]].as_slice()))
    }

    /// Renders the matrix as CSV, one row per component plus the total row.
    ///
    /// The header labels columns `op_0..op_{n-1}`. Rendering to files or
    /// plots is the caller's concern.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::from("component");
        for col in 0..self.columns {
            out.push_str(&format!(",op_{col}"));
        }
        out.push('\n');
        for (name, row) in self.row_names.iter().zip(&self.data) {
            out.push_str(name);
            for value in row {
                out.push_str(&format!(",{value}"));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn construction_zero_filled() {
        let m = CostMatrix::new(&names(&["a", "b"]), 3);
        assert_eq!(m.columns(), 3);
        assert_eq!(m.row_names(), &["a", "b", "total"]);
        assert_eq!(m.get("a", 2), 0.0);
        assert_eq!(m.get("total", 0), 0.0);
    }

    #[test]
    fn set_add_get() {
        let mut m = CostMatrix::new(&names(&["a"]), 1);
        m.set("a", 0, 2.5);
        m.add("a", 0, 1.5);
        assert_eq!(m.get("a", 0), 4.0);
    }

    #[test]
    fn aggregates_exclude_total_row() {
        let mut m = CostMatrix::new(&names(&["a", "b"]), 1);
        m.set("a", 0, 3.0);
        m.set("b", 0, 5.0);
        m.set("total", 0, 1000.0);
        assert_eq!(m.column_component_sum(0), 8.0);
        assert_eq!(m.column_component_max(0), 5.0);
    }

    #[test]
    fn row_aggregates() {
        let mut m = CostMatrix::new(&names(&["a"]), 3);
        m.set("a", 0, 1.0);
        m.set("a", 1, 2.0);
        m.set("a", 2, 4.0);
        assert_eq!(m.row_sum("a"), 7.0);
        assert_eq!(m.row_first("a"), 1.0);
    }

    #[test]
    fn row_first_empty_matrix() {
        let m = CostMatrix::new(&names(&["a"]), 0);
        assert_eq!(m.row_first("a"), 0.0);
        assert_eq!(m.row_sum("a"), 0.0);
    }

    #[test]
    fn csv_rendering() {
        let mut m = CostMatrix::new(&names(&["sram"]), 2);
        m.set("sram", 0, 10.0);
        m.set("total", 1, 3.5);
        let csv = m.to_csv_string();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "component,op_0,op_1");
        assert_eq!(lines[1], "sram,10,0");
        assert_eq!(lines[2], "total,0,3.5");
    }
}
