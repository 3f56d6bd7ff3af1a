//! Parsing and validation of `strata.toml` engine configuration files.
//!
//! This crate reads the configuration file into a strongly-typed [`StrataConfig`]
//! and resolves it into the immutable [`ResolvedConfig`] consumed by the engine.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_config, ResolvedConfig, ResolvedPreflight, ResolvedScan};
pub use types::*;
