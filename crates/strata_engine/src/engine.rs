//! The engine handle and its read-only introspection.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_cache::LayerMeta;
use strata_common::Layer;
use strata_config::ResolvedConfig;

use crate::compiler::{CompilerFactory, StyleCompiler};
use crate::hooks::{GeneratedSnapshot, PendingSnapshot};
use crate::init::Coordinator;
use crate::options::EngineOptions;
use crate::orchestrate::ScanFuture;
use crate::state::State;

pub(crate) struct Inner<C: StyleCompiler> {
    pub(crate) factory: Box<dyn CompilerFactory<C>>,
    pub(crate) options: EngineOptions,
    pub(crate) coordinator: Mutex<Coordinator<C>>,
    pub(crate) state: Mutex<State<C::Node>>,
    pub(crate) scan: Mutex<Option<ScanFuture>>,
    pub(crate) build: tokio::sync::Mutex<()>,
}

/// A cheaply clonable handle to one incremental CSS engine.
///
/// All clones share the same compiler, token registry and layer cache. Locks
/// are held only for in-memory bookkeeping, never across a compiler call, so
/// extraction for different sources may run concurrently. Extraction for the
/// same source identifier must be serialized by the caller.
pub struct Engine<C: StyleCompiler> {
    pub(crate) inner: Arc<Inner<C>>,
}

impl<C: StyleCompiler> Clone for Engine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: StyleCompiler> fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("generation", &self.generation())
            .field("ready", &self.is_ready())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<C: StyleCompiler> Engine<C> {
    /// Creates an uninitialized engine.
    ///
    /// Nothing is resolved or compiled until the first operation that needs a
    /// compiler, or an explicit [`init`](Self::init).
    pub fn new(factory: impl CompilerFactory<C> + 'static, options: EngineOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory: Box::new(factory),
                options,
                coordinator: Mutex::new(Coordinator::default()),
                state: Mutex::new(State::new()),
                scan: Mutex::new(None),
                build: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Resets token state and drops every cached layer.
    ///
    /// A full reset forgets which tokens were in use. Otherwise every compiled
    /// token is queued for recompilation. See [`TokenRegistry::reset`].
    ///
    /// [`TokenRegistry::reset`]: strata_cache::TokenRegistry::reset
    pub fn clear_cache(&self, full: bool) {
        self.inner.state.lock().clear_cache(full);
        tracing::debug!(full, "cache cleared");
    }

    /// Tokens awaiting compilation.
    pub fn pending(&self) -> PendingSnapshot {
        let state = self.inner.state.lock();
        PendingSnapshot {
            classes: state.registry.pending_classes().iter().cloned().collect(),
            tags: state.registry.pending_tags().iter().cloned().collect(),
        }
    }

    /// Tokens already compiled.
    pub fn generated(&self) -> GeneratedSnapshot {
        let state = self.inner.state.lock();
        GeneratedSnapshot {
            classes: state.registry.generated_classes().iter().cloned().collect(),
            tags: state.registry.generated_tags().iter().cloned().collect(),
        }
    }

    /// Class tokens the compiler did not accept since the last reset.
    pub fn rejected(&self) -> Vec<String> {
        self.inner.state.lock().registry.rejected_classes().iter().cloned().collect()
    }

    /// Cache state of one layer.
    pub fn layer_meta(&self, layer: Layer) -> LayerMeta {
        self.inner.state.lock().layers.meta(layer).clone()
    }

    /// Returns `true` if a build would submit anything to the compiler.
    ///
    /// Pending tags only count while preflight generation is enabled, and not
    /// once an inclusive preflight has been produced for this configuration.
    pub fn has_pending(&self) -> bool {
        let (enabled, include_all) = self.config().map_or((true, false), |config| {
            (config.preflight.enabled, config.preflight.include_all)
        });
        let state = self.inner.state.lock();
        let tags_due = if include_all {
            !state.preflight_complete
        } else {
            !state.registry.pending_tags().is_empty()
        };
        !state.registry.pending_classes().is_empty() || (enabled && tags_due)
    }

    /// Returns `true` once an initialization has been published.
    pub fn is_ready(&self) -> bool {
        self.inner.coordinator.lock().session().is_some()
    }

    /// The number of initializations started so far.
    pub fn generation(&self) -> u64 {
        self.inner.coordinator.lock().generation()
    }

    /// The configuration of the published initialization, if any.
    pub fn config(&self) -> Option<Arc<ResolvedConfig>> {
        self.inner
            .coordinator
            .lock()
            .session()
            .map(|session| Arc::clone(&session.config))
    }
}
