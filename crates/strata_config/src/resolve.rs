//! Resolution of parsed configuration into the form the engine consumes.
//!
//! Lists become sets, extensions are normalized to bare lowercase suffixes, and
//! alias keys are normalized to kebab-case so lookups are case-insensitive.

use std::collections::{BTreeMap, BTreeSet};

use strata_common::kebab_case;

use crate::error::ConfigError;
use crate::types::{PreflightConfig, ScanConfig, StrataConfig};

/// Fully resolved, validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Resolved scan settings.
    pub scan: ResolvedScan,
    /// Resolved preflight settings.
    pub preflight: ResolvedPreflight,
    /// Class tokens always queued for compilation.
    pub safelist: BTreeSet<String>,
    /// Class tokens never queued for compilation.
    pub blocklist: BTreeSet<String>,
    /// Whether variant groups are expanded before extraction.
    pub transform_groups: bool,
    /// Whether layer output is sorted deterministically.
    pub sort_utilities: bool,
    /// Whether layer output is vendor-prefixed.
    pub prefixer: bool,
}

/// Resolved scan settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScan {
    /// Whether a full project scan is performed.
    pub enabled: bool,
    /// Whether the first generation request triggers the scan.
    pub run_on_startup: bool,
    /// Discovery roots.
    pub dirs: Vec<String>,
    /// Include patterns for the host's discovery.
    pub include: Vec<String>,
    /// Excluded identifier fragments.
    pub exclude: Vec<String>,
    /// Text source extensions, lowercase and without a leading dot.
    pub file_extensions: BTreeSet<String>,
    /// Style source extensions, lowercase and without a leading dot.
    pub style_extensions: BTreeSet<String>,
}

/// Resolved preflight settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPreflight {
    /// Whether preflight rules are generated.
    pub enabled: bool,
    /// Whether every known tag is covered regardless of usage.
    pub include_all: bool,
    /// Include base reset rules.
    pub include_base: bool,
    /// Include global rules.
    pub include_global: bool,
    /// Include plugin rules.
    pub include_plugin: bool,
    /// Tags always covered.
    pub safelist: BTreeSet<String>,
    /// Tags never covered.
    pub blocklist: BTreeSet<String>,
    /// Kebab-cased component name to HTML tag.
    pub alias: BTreeMap<String, String>,
}

impl ResolvedPreflight {
    /// Looks up the tag a component name renders as, ignoring case style.
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.alias.get(&kebab_case(name)).map(String::as_str)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        build(StrataConfig::default())
    }
}

/// Resolves and validates a parsed configuration.
pub fn resolve_config(config: StrataConfig) -> Result<ResolvedConfig, ConfigError> {
    let resolved = build(config);
    validate(&resolved)?;
    Ok(resolved)
}

fn build(config: StrataConfig) -> ResolvedConfig {
    ResolvedConfig {
        scan: build_scan(config.scan),
        preflight: build_preflight(config.preflight),
        safelist: config.safelist.into_iter().collect(),
        blocklist: config.blocklist.into_iter().collect(),
        transform_groups: config.transform_groups,
        sort_utilities: config.sort_utilities,
        prefixer: config.prefixer,
    }
}

fn build_scan(scan: ScanConfig) -> ResolvedScan {
    ResolvedScan {
        enabled: scan.enabled,
        run_on_startup: scan.run_on_startup,
        dirs: scan.dirs,
        include: scan.include,
        exclude: scan.exclude,
        file_extensions: normalize_extensions(scan.file_extensions),
        style_extensions: normalize_extensions(scan.style_extensions),
    }
}

fn build_preflight(preflight: PreflightConfig) -> ResolvedPreflight {
    ResolvedPreflight {
        enabled: preflight.enabled,
        include_all: preflight.include_all,
        include_base: preflight.include_base,
        include_global: preflight.include_global,
        include_plugin: preflight.include_plugin,
        safelist: preflight.safelist.iter().map(|t| kebab_case(t)).collect(),
        blocklist: preflight.blocklist.iter().map(|t| kebab_case(t)).collect(),
        alias: preflight
            .alias
            .into_iter()
            .map(|(name, tag)| (kebab_case(&name), tag.trim().to_lowercase()))
            .collect(),
    }
}

fn normalize_extensions(exts: Vec<String>) -> BTreeSet<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Checks cross-field consistency of a resolved configuration.
fn validate(config: &ResolvedConfig) -> Result<(), ConfigError> {
    if let Some(token) = config.safelist.intersection(&config.blocklist).next() {
        return Err(ConfigError::Conflict {
            token: token.clone(),
            section: "classes",
        });
    }
    let preflight = &config.preflight;
    if let Some(tag) = preflight.safelist.intersection(&preflight.blocklist).next() {
        return Err(ConfigError::Conflict {
            token: tag.clone(),
            section: "preflight",
        });
    }
    if let Some((name, _)) = preflight.alias.iter().find(|(_, tag)| tag.is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "preflight alias '{name}' has an empty target tag"
        )));
    }
    if config.scan.enabled && config.scan.file_extensions.is_empty() {
        return Err(ConfigError::Invalid(
            "scan is enabled but scan.file_extensions is empty".to_string(),
        ));
    }
    if let Some(ext) = config
        .scan
        .file_extensions
        .intersection(&config.scan.style_extensions)
        .next()
    {
        return Err(ConfigError::Invalid(format!(
            "extension '{ext}' is listed as both a text and a style source"
        )));
    }
    Ok(())
}
