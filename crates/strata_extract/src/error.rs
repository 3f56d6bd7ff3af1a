//! Error types for token extraction.

/// Errors raised by user-supplied transformers and extractors.
///
/// The engine does not catch or retry these; they surface to the caller that
/// submitted the source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// A source transformer failed to rewrite a file.
    #[error("transformer failed on {id}: {reason}")]
    Transformer {
        /// The identifier of the source being transformed.
        id: String,
        /// Description of the failure.
        reason: String,
    },

    /// An extractor failed to produce tokens.
    #[error("extractor '{extractor}' failed on {}: {reason}", .id.as_deref().unwrap_or("<inline>"))]
    Extractor {
        /// Name of the failing extractor.
        extractor: String,
        /// The identifier of the source, if known.
        id: Option<String>,
        /// Description of the failure.
        reason: String,
    },
}

impl ExtractError {
    /// Creates a transformer error.
    pub fn transformer(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ExtractError::Transformer {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an extractor error.
    pub fn extractor(
        extractor: impl Into<String>,
        id: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        ExtractError::Extractor {
            extractor: extractor.into(),
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }
}
