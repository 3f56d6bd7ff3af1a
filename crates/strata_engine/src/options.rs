//! Engine construction options that cannot live in `strata.toml`.

use std::fmt;
use std::sync::Arc;

use strata_extract::{Extractor, SourceTransformer};

use crate::config::ConfigSource;
use crate::hooks::{Hooks, NoopHooks};
use crate::source::SourceProvider;

/// Capabilities and callbacks an [`Engine`](crate::Engine) is built with.
pub struct EngineOptions {
    pub(crate) config: Arc<dyn ConfigSource>,
    pub(crate) sources: Option<Arc<dyn SourceProvider>>,
    pub(crate) extractors: Vec<Arc<dyn Extractor>>,
    pub(crate) transformers: Vec<Arc<dyn SourceTransformer>>,
    pub(crate) hooks: Arc<dyn Hooks>,
}

impl EngineOptions {
    /// Creates options resolving configuration from `config`, with no source
    /// provider, no extractors beyond the built-in one, and no hooks.
    pub fn new(config: impl ConfigSource + 'static) -> Self {
        Self {
            config: Arc::new(config),
            sources: None,
            extractors: Vec::new(),
            transformers: Vec::new(),
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Sets the provider a full scan discovers and reads sources through.
    pub fn with_sources(mut self, sources: impl SourceProvider + 'static) -> Self {
        self.sources = Some(Arc::new(sources));
        self
    }

    /// Registers an extractor. The first one claiming an extension wins.
    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Arc::new(extractor));
        self
    }

    /// Appends a source transformer. Transformers run in registration order.
    pub fn with_transformer(mut self, transformer: impl SourceTransformer + 'static) -> Self {
        self.transformers.push(Arc::new(transformer));
        self
    }

    /// Sets the lifecycle hooks.
    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Sets lifecycle hooks shared with the caller.
    pub fn with_shared_hooks(mut self, hooks: Arc<dyn Hooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("sources", &self.sources.is_some())
            .field(
                "extractors",
                &self.extractors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("transformers", &self.transformers.len())
            .finish_non_exhaustive()
    }
}
