//! Configuration types deserialized from `strata.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level engine configuration parsed from `strata.toml`.
///
/// Every section is optional; an empty file yields the defaults documented
/// on each field.
#[derive(Debug, Deserialize)]
pub struct StrataConfig {
    /// Project scanning settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Preflight (tag reset rule) settings.
    #[serde(default)]
    pub preflight: PreflightConfig,
    /// Class tokens that are always compiled, whether or not they are seen.
    #[serde(default, deserialize_with = "deserialize_token_list")]
    pub safelist: Vec<String>,
    /// Class tokens that are never compiled, even when seen.
    #[serde(default, deserialize_with = "deserialize_token_list")]
    pub blocklist: Vec<String>,
    /// Expand variant groups such as `hover:(a b)` before extraction.
    #[serde(default = "default_true")]
    pub transform_groups: bool,
    /// Sort rules deterministically when building layer output.
    #[serde(default)]
    pub sort_utilities: bool,
    /// Apply vendor prefixes when building layer output.
    #[serde(default = "default_true")]
    pub prefixer: bool,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            preflight: PreflightConfig::default(),
            safelist: Vec::new(),
            blocklist: Vec::new(),
            transform_groups: true,
            sort_utilities: false,
            prefixer: true,
        }
    }
}

/// Settings for discovering and classifying project source files.
#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Whether a full project scan is performed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the first CSS generation request triggers the full scan.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
    /// Directories the host's file discovery starts from.
    #[serde(default = "default_dirs")]
    pub dirs: Vec<String>,
    /// Include patterns handed to the host's file discovery.
    #[serde(default)]
    pub include: Vec<String>,
    /// Identifiers containing any of these fragments are never processed.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Extensions of text sources whose tokens are extracted.
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
    /// Extensions of style sources routed to the CSS transform path.
    #[serde(default = "default_style_extensions")]
    pub style_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            run_on_startup: true,
            dirs: default_dirs(),
            include: Vec::new(),
            exclude: default_exclude(),
            file_extensions: default_file_extensions(),
            style_extensions: default_style_extensions(),
        }
    }
}

/// Settings for preflight generation from observed tags.
#[derive(Debug, Deserialize)]
pub struct PreflightConfig {
    /// Whether preflight rules are generated at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Generate preflight for every known tag instead of only observed ones.
    #[serde(default)]
    pub include_all: bool,
    /// Include the base reset rules.
    #[serde(default = "default_true")]
    pub include_base: bool,
    /// Include global rules (`*`, `::before`, `::after`).
    #[serde(default = "default_true")]
    pub include_global: bool,
    /// Include rules contributed by compiler plugins.
    #[serde(default = "default_true")]
    pub include_plugin: bool,
    /// Tags that always receive preflight rules.
    #[serde(default = "default_preflight_safelist", deserialize_with = "deserialize_token_list")]
    pub safelist: Vec<String>,
    /// Tags that never receive preflight rules.
    #[serde(default, deserialize_with = "deserialize_token_list")]
    pub blocklist: Vec<String>,
    /// Maps component names (e.g. `router-link`) to the HTML tag they render.
    #[serde(default = "default_alias")]
    pub alias: BTreeMap<String, String>,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_all: false,
            include_base: true,
            include_global: true,
            include_plugin: true,
            safelist: default_preflight_safelist(),
            blocklist: Vec::new(),
            alias: default_alias(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dirs() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}

fn default_file_extensions() -> Vec<String> {
    ["html", "vue", "svelte", "jsx", "tsx", "js", "ts", "md", "mdx", "pug", "astro"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_style_extensions() -> Vec<String> {
    ["css", "postcss", "pcss", "scss", "sass", "less", "styl", "stylus"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_preflight_safelist() -> Vec<String> {
    vec!["html".to_string(), "body".to_string(), "div".to_string()]
}

fn default_alias() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("router-link".to_string(), "a".to_string()),
        ("nuxt-link".to_string(), "a".to_string()),
    ])
}

/// Deserializes a token list given either as a list of strings or as one
/// whitespace-separated string.
///
/// Allows both `safelist = "p-4 m-2"` and `safelist = ["p-4", "m-2"]`.
fn deserialize_token_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TokenList;

    impl<'de> Visitor<'de> for TokenList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a whitespace-separated string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split_whitespace().map(str::to_string).collect())
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.extend(val.split_whitespace().map(str::to_string));
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(TokenList)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: StrataConfig = toml::from_str("").unwrap();
        assert!(config.scan.enabled);
        assert!(config.scan.run_on_startup);
        assert_eq!(config.scan.dirs, vec!["src"]);
        assert!(config.preflight.enabled);
        assert!(!config.preflight.include_all);
        assert_eq!(config.preflight.safelist, vec!["html", "body", "div"]);
        assert_eq!(config.preflight.alias.get("router-link").unwrap(), "a");
        assert!(config.transform_groups);
        assert!(config.prefixer);
        assert!(!config.sort_utilities);
    }

    #[test]
    fn safelist_as_string() {
        let config: StrataConfig = toml::from_str(r#"safelist = "p-4  m-2 text-center""#).unwrap();
        assert_eq!(config.safelist, vec!["p-4", "m-2", "text-center"]);
    }

    #[test]
    fn safelist_as_list() {
        let config: StrataConfig = toml::from_str(r#"safelist = ["p-4", "m-2 m-3"]"#).unwrap();
        assert_eq!(config.safelist, vec!["p-4", "m-2", "m-3"]);
    }

    #[test]
    fn explicit_alias_table_replaces_defaults() {
        let toml = r#"
[preflight.alias]
"my-button" = "button"
"#;
        let config: StrataConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.preflight.alias.len(), 1);
        assert_eq!(config.preflight.alias["my-button"], "button");
    }

    #[test]
    fn default_impl_matches_empty_document() {
        let parsed: StrataConfig = toml::from_str("").unwrap();
        let built = StrataConfig::default();
        assert_eq!(parsed.scan.file_extensions, built.scan.file_extensions);
        assert_eq!(parsed.scan.style_extensions, built.scan.style_extensions);
        assert_eq!(parsed.preflight.alias, built.preflight.alias);
        assert_eq!(parsed.transform_groups, built.transform_groups);
    }
}
