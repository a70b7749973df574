//! Configuration file loading and validation.

use std::path::Path;

use uefast_common::AssetId;

use crate::error::ConfigError;
use crate::types::ProjectConfig;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "uefast.toml";

/// Loads and validates `<project_dir>/uefast.toml`.
///
/// A project without a configuration file gets [`ProjectConfig::default`].
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Ok(ProjectConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates an explicitly named configuration file, which must exist.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable.
///
/// Called by the loaders, and again by callers after applying command-line
/// overrides.
pub fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    let scan = &config.scan;
    if scan.content_dir.is_empty() {
        return Err(ConfigError::ValidationError(
            "scan.content_dir must not be empty".to_string(),
        ));
    }
    if !scan.mount_point.starts_with('/') || scan.mount_point.len() < 2 {
        return Err(ConfigError::ValidationError(format!(
            "scan.mount_point '{}' must be an absolute mount such as /Game",
            scan.mount_point
        )));
    }
    if scan.extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "scan.extensions must list at least one extension".to_string(),
        ));
    }
    for pattern in scan.include.iter().chain(&scan.exclude) {
        glob::Pattern::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!("invalid glob pattern '{pattern}': {e}"))
        })?;
    }
    for root in &config.startup.roots {
        AssetId::parse(root).map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    }
    if config.cost.bytes_per_ms == 0 {
        return Err(ConfigError::ValidationError(
            "cost.bytes_per_ms must be at least 1".to_string(),
        ));
    }
    if config.plan.parallelism == 0 {
        return Err(ConfigError::ValidationError(
            "plan.parallelism must be at least 1".to_string(),
        ));
    }
    Ok(())
}
