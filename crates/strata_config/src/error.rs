//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Why a `strata.toml` configuration could not be turned into a
/// [`ResolvedConfig`](crate::ResolvedConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path of the file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("failed to parse strata.toml: {0}")]
    Parse(String),

    /// A token appears in both the safelist and the blocklist of one section.
    #[error("'{token}' is both safelisted and blocklisted in {section}")]
    Conflict {
        /// The conflicting class token or tag.
        token: String,
        /// `classes` for the top-level lists, `preflight` for tag lists.
        section: &'static str,
    },

    /// Any other inconsistent value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_names_the_section() {
        let err = ConfigError::Conflict {
            token: "h1".to_string(),
            section: "preflight",
        };
        assert_eq!(
            err.to_string(),
            "'h1' is both safelisted and blocklisted in preflight"
        );
    }

    #[test]
    fn read_error_names_the_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("app/strata.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read app/strata.toml: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn parse_and_invalid_display() {
        assert_eq!(
            ConfigError::Parse("expected `=`".to_string()).to_string(),
            "failed to parse strata.toml: expected `=`"
        );
        assert_eq!(
            ConfigError::Invalid("empty alias".to_string()).to_string(),
            "invalid configuration: empty alias"
        );
    }
}
