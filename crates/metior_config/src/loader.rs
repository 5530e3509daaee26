//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Loads and validates a `metior.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("metior.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `metior.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.estimator.features.is_empty() {
        return Err(ConfigError::ValidationError(
            "estimator.features must not be empty".to_string(),
        ));
    }
    for (name, region) in &config.memory {
        if region.size == 0 {
            return Err(ConfigError::ValidationError(format!(
                "memory region '{name}' has zero size"
            )));
        }
        if region.width_bits == 0 {
            return Err(ConfigError::ValidationError(format!(
                "memory region '{name}' has zero width"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[project]
name = "npu_model"
version = "0.3.0"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "npu_model");
        assert_eq!(config.project.version, "0.3.0");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "npu_model"
version = "0.3.0"
description = "TH-2 NPU cost model"

[library]
table = "NpuPrimitives"
component_order = ["pe", "pe_cluster"]

[estimator]
features = ["energy", "area", "cycle"]
output_dir = "out"

[memory.his_sram]
size = 64

[memory.model_sram]
size = 256
unit = "kilobyte"
width_bits = 64
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.library.table, "NpuPrimitives");
        assert_eq!(config.library.component_order, vec!["pe", "pe_cluster"]);
        assert_eq!(config.estimator.output_dir, "out");
        assert_eq!(config.memory.len(), 2);
        assert_eq!(config.memory["model_sram"].size, 256);
    }

    #[test]
    fn missing_name_errors() {
        let toml = r#"
[project]
name = ""
version = "0.1.0"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn empty_features_rejected() {
        let toml = r#"
[project]
name = "npu_model"
version = "0.1.0"

[estimator]
features = []
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_size_region_rejected() {
        let toml = r#"
[project]
name = "npu_model"
version = "0.1.0"

[memory.bad]
size = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
