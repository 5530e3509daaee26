//! Configuration types deserialized from `metior.toml`.

use metior_common::{DataUnit, Feature};
use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `metior.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Component library settings.
    #[serde(default)]
    pub library: LibrarySettings,
    /// Estimator settings.
    #[serde(default)]
    pub estimator: EstimatorSettings,
    /// Named storage regions the compiler should model.
    #[serde(default)]
    pub memory: BTreeMap<String, MemoryRegion>,
}

/// Core project metadata required in every `metior.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Settings for the primitive and compound component libraries.
#[derive(Debug, Deserialize)]
pub struct LibrarySettings {
    /// The primitive component library table to read.
    #[serde(default = "default_table")]
    pub table: String,
    /// Compound component class names, in instantiation order.
    ///
    /// Templates must be instantiated before any template that references
    /// them; loaders fall back to lexical order when this is empty.
    #[serde(default)]
    pub component_order: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            table: default_table(),
            component_order: Vec::new(),
        }
    }
}

fn default_table() -> String {
    "PrimitiveComponents".to_string()
}

/// Settings for feature estimation runs.
#[derive(Debug, Deserialize)]
pub struct EstimatorSettings {
    /// The features to evaluate, in reporting order.
    #[serde(default = "all_features")]
    pub features: Vec<Feature>,
    /// Directory for rendered estimation artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            features: all_features(),
            output_dir: default_output_dir(),
        }
    }
}

fn all_features() -> Vec<Feature> {
    Feature::ALL.to_vec()
}

fn default_output_dir() -> String {
    "estimation_output".to_string()
}

/// One named storage region.
#[derive(Debug, Deserialize)]
pub struct MemoryRegion {
    /// The region capacity, in `unit`s.
    pub size: u64,
    /// The unit `size` is expressed in.
    #[serde(default = "default_unit")]
    pub unit: DataUnit,
    /// The row width in bits.
    #[serde(default = "default_width")]
    pub width_bits: u64,
}

fn default_unit() -> DataUnit {
    DataUnit::Kilobyte
}

fn default_width() -> u64 {
    64
}
