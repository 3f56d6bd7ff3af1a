//! Feeding source text into the token registry and layer store.

use strata_cache::UpdateMode;
use strata_common::{ContentHash, SourceKey};
use strata_extract::{apply_extractors, apply_transformers, expand_groups};

use crate::compiler::{CssTransform, StyleCompiler};
use crate::engine::Engine;
use crate::error::EngineError;

impl<C: StyleCompiler> Engine<C> {
    /// Extracts class and tag tokens from one text source and queues the new
    /// ones for compilation.
    ///
    /// With `apply_group_transform` (and `transform_groups` enabled), variant
    /// groups are expanded first. Transformers run only when `id` is known.
    /// A known `id` whose text is unchanged since its last extraction is
    /// skipped. Returns `true` if any token was queued, meaning the host
    /// should regenerate.
    #[tracing::instrument(skip(self, code), fields(bytes = code.len()))]
    pub async fn extract_file(
        &self,
        code: &str,
        id: Option<&str>,
        apply_group_transform: bool,
    ) -> Result<bool, EngineError> {
        let session = self.session().await?;
        let config = &session.config;
        let grouped = apply_group_transform && config.transform_groups;
        let hash = ContentHash::from_text(code);
        if let Some(id) = id {
            let unchanged = self.inner.state.lock().fingerprints.is_unchanged(id, hash, grouped);
            if unchanged {
                tracing::trace!("source unchanged");
                return Ok(false);
            }
        }

        let mut code = if grouped {
            expand_groups(code)
        } else {
            code.to_string()
        };
        if let Some(id) = id {
            code = apply_transformers(code, id, &self.inner.options.transformers)?;
        }
        let tokens = apply_extractors(&code, id, &self.inner.options.extractors).await?;

        let mut state = self.inner.state.lock();
        let mut changed = state.registry.add_classes(&tokens.classes);
        if config.preflight.enabled || !config.preflight.include_all {
            changed |= state.registry.add_tags(&tokens.tags);
        }
        if let Some(id) = id {
            state.fingerprints.record(id, hash, grouped);
        }
        tracing::debug!(
            classes = tokens.classes.len(),
            tags = tokens.tags.len(),
            changed,
            "source extracted"
        );
        Ok(changed)
    }

    /// Splits a style source into layer blocks, stores them as the source's
    /// contribution, and returns the residual CSS.
    ///
    /// The contribution replaces whatever `id` contributed before, so layers
    /// the source no longer touches are invalidated too.
    #[tracing::instrument(skip(self, css), fields(bytes = css.len()))]
    pub async fn transform_css(&self, css: &str, id: &str) -> Result<String, EngineError> {
        let session = self.session().await?;
        let CssTransform { nodes, css } = session.compiler.transform_css(css, id).await?;
        self.inner
            .state
            .lock()
            .layers
            .update_layers(nodes, SourceKey::source(id), UpdateMode::Replace);
        Ok(css)
    }
}
