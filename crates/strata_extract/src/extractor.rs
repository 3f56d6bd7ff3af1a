//! Pluggable token extractors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::default::DefaultExtractor;
use crate::error::ExtractError;
use crate::target::extension_of;

/// Raw tokens found in one source.
///
/// Lists may contain duplicates and tokens the compiler will not recognize;
/// filtering happens in the token registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractResult {
    /// Candidate utility-class tokens.
    pub classes: Vec<String>,
    /// Candidate HTML tag or component names.
    pub tags: Vec<String>,
}

impl ExtractResult {
    /// Returns `true` if no tokens were found.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.tags.is_empty()
    }
}

/// A source of class and tag tokens for a family of file types.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Lowercase extensions (without the dot) this extractor claims.
    fn extensions(&self) -> &[String];

    /// Extracts tokens from `code`.
    async fn extract(&self, code: &str, id: Option<&str>) -> Result<ExtractResult, ExtractError>;
}

/// Runs the first registered extractor that claims `id`'s extension, falling
/// back to [`DefaultExtractor`] when none does or when `id` is unknown.
pub async fn apply_extractors(
    code: &str,
    id: Option<&str>,
    extractors: &[Arc<dyn Extractor>],
) -> Result<ExtractResult, ExtractError> {
    let ext = id.and_then(extension_of);
    if let Some(ext) = ext.as_deref() {
        if let Some(extractor) = extractors
            .iter()
            .find(|e| e.extensions().iter().any(|x| x == ext))
        {
            tracing::trace!(extractor = extractor.name(), id, "running extractor");
            return extractor.extract(code, id).await;
        }
    }
    Ok(DefaultExtractor.extract_tokens(code))
}
