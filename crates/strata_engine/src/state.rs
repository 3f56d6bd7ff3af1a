//! The mutable cache state owned by one engine.

use std::sync::Arc;

use strata_cache::{LayerStore, RegistryPolicy, SourceFingerprints, TokenRegistry};
use strata_common::StyleNode;
use strata_config::ResolvedConfig;

/// Token registry, layer store and derived caches, guarded together.
///
/// `generation` is the initialization the contents belong to; results computed
/// against an older initialization are discarded instead of merged.
#[derive(Debug)]
pub(crate) struct State<N> {
    pub(crate) generation: u64,
    pub(crate) registry: TokenRegistry,
    pub(crate) layers: LayerStore<N>,
    pub(crate) fingerprints: SourceFingerprints,
    pub(crate) completions: Option<Arc<[String]>>,
    pub(crate) preflight_complete: bool,
}

impl<N: StyleNode> State<N> {
    pub(crate) fn new() -> Self {
        Self {
            generation: 0,
            registry: TokenRegistry::default(),
            layers: LayerStore::new(),
            fingerprints: SourceFingerprints::new(),
            completions: None,
            preflight_complete: false,
        }
    }

    /// Adopts a freshly initialized configuration.
    pub(crate) fn configure(&mut self, config: &ResolvedConfig, generation: u64) {
        self.generation = generation;
        self.registry.set_policy(RegistryPolicy::from_config(config));
        self.clear_cache(false);
    }

    /// Resets tokens and drops every derived cache.
    pub(crate) fn clear_cache(&mut self, full: bool) {
        self.registry.reset(full);
        self.layers.reset(full);
        self.fingerprints.clear();
        self.completions = None;
        self.preflight_complete = false;
    }
}
