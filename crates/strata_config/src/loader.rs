//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::{resolve_config, ResolvedConfig};
use crate::types::StrataConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE: &str = "strata.toml";

/// Loads, validates and resolves `strata.toml` from a project directory.
///
/// A missing file is not an error: the project simply runs with defaults.
pub fn load_config(project_dir: &Path) -> Result<ResolvedConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return resolve_config(StrataConfig::default());
    }
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses, validates and resolves a `strata.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ResolvedConfig, ConfigError> {
    let config: StrataConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    resolve_config(config)
}
