//! Submitting pending tokens to the compiler and serving layer output.

use std::sync::Arc;

use strata_cache::UpdateMode;
use strata_common::{Layer, SourceKey};

use crate::compiler::{PreflightRequest, RenderOptions, StyleCompiler};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::hooks::{GeneratedSnapshot, PendingSnapshot};
use crate::init::Session;

impl<C: StyleCompiler> Engine<C> {
    /// Compiles every pending class token and pending tag.
    ///
    /// Successfully interpreted classes become generated and their nodes are
    /// appended to the generated-classes contribution; classes the compiler
    /// did not accept become rejected. Preflight is produced for the pending
    /// tags, or once for every tag when preflight covers all tags. Builds are
    /// serialized, so concurrent callers never submit the same tokens twice.
    ///
    /// If a reconfiguration lands while the compiler is working, the result is
    /// discarded and the build starts over against the new configuration.
    #[tracing::instrument(skip(self))]
    pub async fn build_pending_styles(&self) -> Result<(), EngineError> {
        self.build_current().await.map(drop)
    }

    /// Builds until one pass completes against the current configuration and
    /// returns the session that pass used.
    pub(crate) async fn build_current(&self) -> Result<Session<C>, EngineError> {
        loop {
            let session = self.session().await?;
            if self.build_with(&session).await? {
                return Ok(session);
            }
            tracing::debug!(
                generation = session.generation,
                "configuration changed during build, rebuilding"
            );
        }
    }

    /// One build pass. Returns `false` if the configuration was replaced
    /// before the results could be stored.
    async fn build_with(&self, session: &Session<C>) -> Result<bool, EngineError> {
        let _build = self.inner.build.lock().await;
        let preflight = &session.config.preflight;

        let (pending, preflight_due) = {
            let state = self.inner.state.lock();
            if state.generation != session.generation {
                return Ok(false);
            }
            let pending = PendingSnapshot {
                classes: state.registry.pending_classes().iter().cloned().collect(),
                tags: state.registry.pending_tags().iter().cloned().collect(),
            };
            let due = preflight.enabled
                && if preflight.include_all {
                    !state.preflight_complete
                } else {
                    !pending.tags.is_empty()
                };
            (pending, due)
        };
        self.inner.options.hooks.on_before_generate(&pending);

        if !pending.classes.is_empty() {
            let interpretation = session.compiler.interpret(&pending.classes.join(" ")).await?;
            let mut state = self.inner.state.lock();
            if state.generation != session.generation {
                tracing::debug!("discarding interpretation from a superseded configuration");
                return Ok(false);
            }
            state.layers.update_layers(
                interpretation.nodes,
                SourceKey::GeneratedClasses,
                UpdateMode::Append,
            );
            state
                .registry
                .complete_classes(&pending.classes, &interpretation.succeeded);
            tracing::debug!(
                submitted = pending.classes.len(),
                succeeded = interpretation.succeeded.len(),
                "classes compiled"
            );
        }

        if preflight_due {
            let request = PreflightRequest::new(&session.config, &pending.tags);
            let nodes = session.compiler.preflight(request).await?;
            let mut state = self.inner.state.lock();
            if state.generation != session.generation {
                tracing::debug!("discarding preflight from a superseded configuration");
                return Ok(false);
            }
            let mode = if preflight.include_all {
                UpdateMode::Replace
            } else {
                UpdateMode::Append
            };
            state
                .layers
                .update_layers(nodes, SourceKey::GeneratedPreflights, mode);
            state.registry.complete_tags(&pending.tags);
            state.preflight_complete |= preflight.include_all;
            tracing::debug!(tags = pending.tags.len(), "preflight generated");
        } else if preflight.enabled && preflight.include_all && !pending.tags.is_empty() {
            // Already covered by the inclusive preflight of this configuration.
            let mut state = self.inner.state.lock();
            if state.generation != session.generation {
                return Ok(false);
            }
            state.registry.complete_tags(&pending.tags);
        }

        let generated = self.generated();
        self.inner.options.hooks.on_generated(&generated);
        Ok(true)
    }

    /// Returns the CSS text of one layer, rebuilding it only if a contribution
    /// to it changed since the last build.
    pub async fn build_layer_css(&self, layer: Layer) -> Result<Arc<str>, EngineError> {
        let session = self.session().await?;
        Ok(self.layer_css(&session, layer))
    }

    pub(crate) fn layer_css(&self, session: &Session<C>, layer: Layer) -> Arc<str> {
        let options = RenderOptions::from_config(&session.config);
        let compiler = &session.compiler;
        self.inner
            .state
            .lock()
            .layers
            .build_layer_css(layer, |nodes| compiler.render(layer, nodes, options))
    }
}
