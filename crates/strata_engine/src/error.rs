//! Error types for the engine and its external capabilities.

use std::io;
use std::sync::Arc;

use strata_config::ConfigError;
use strata_extract::ExtractError;

/// Errors reported by a [`StyleCompiler`](crate::StyleCompiler) or its factory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The compiler could not be constructed from the configuration.
    #[error("failed to construct style compiler: {0}")]
    Construct(String),

    /// Interpreting class tokens failed as a whole.
    #[error("failed to interpret class tokens: {0}")]
    Interpret(String),

    /// Preflight generation failed.
    #[error("failed to generate preflight: {0}")]
    Preflight(String),

    /// A style source could not be parsed.
    #[error("failed to transform style source {id}: {reason}")]
    Transform {
        /// Identifier of the style source.
        id: String,
        /// Description of the failure.
        reason: String,
    },
}

/// Errors reported by a [`SourceProvider`](crate::SourceProvider).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The provider could not enumerate sources.
    #[error("failed to discover sources: {0}")]
    Discover(String),

    /// The provider knows no source with this identifier.
    #[error("unknown source {0}")]
    NotFound(String),

    /// Reading a source failed.
    #[error("failed to read {id}: {source}")]
    Io {
        /// The identifier or path being read.
        id: String,
        /// The underlying I/O error.
        source: Arc<io::Error>,
    },
}

impl SourceError {
    /// Wraps an I/O error raised while accessing `id`.
    pub fn io(id: impl Into<String>, source: io::Error) -> Self {
        SourceError::Io {
            id: id.into(),
            source: Arc::new(source),
        }
    }
}

/// Errors surfaced by [`Engine`](crate::Engine) operations.
///
/// Cloneable so that the outcome of a single-flight operation can be handed,
/// identical, to every caller awaiting it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be resolved.
    #[error("configuration error: {0}")]
    Config(Arc<ConfigError>),

    /// The style compiler failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A transformer or extractor failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A source could not be discovered or read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A newer initialization started while this one was in flight.
    #[error("initialization superseded by a newer configuration")]
    Superseded,

    /// The runtime shut down before a background scan finished.
    #[error("scan cancelled before it finished")]
    Cancelled,
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(Arc::new(err))
    }
}
