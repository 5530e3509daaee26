//! Project configuration for the Metior toolchain.
//!
//! Loads and validates `metior.toml`, which names the primitive component
//! library table, the compound component instantiation order, the features
//! to estimate, and the storage regions the compiler should model.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{EstimatorSettings, LibrarySettings, MemoryRegion, ProjectConfig, ProjectMeta};
