//! Single-flight initialization.
//!
//! `Uninitialized -> Initializing -> Ready`. Every [`Engine::init`] bumps the
//! generation and starts a fresh initialization; concurrent
//! [`Engine::ensure_init`] callers share whichever one is in flight. An
//! initialization publishes its result only if no newer one started while it
//! was running.

use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use strata_config::{ConfigError, ResolvedConfig};

use crate::compiler::StyleCompiler;
use crate::config::ConfigSource;
use crate::engine::{Engine, Inner};
use crate::error::EngineError;

/// A published initialization: the compiler and the configuration it was
/// built from.
pub(crate) struct Session<C> {
    pub(crate) compiler: Arc<C>,
    pub(crate) config: Arc<ResolvedConfig>,
    pub(crate) generation: u64,
}

impl<C> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            compiler: Arc::clone(&self.compiler),
            config: Arc::clone(&self.config),
            generation: self.generation,
        }
    }
}

pub(crate) type InitFuture<C> = Shared<BoxFuture<'static, Result<Session<C>, EngineError>>>;

pub(crate) struct Coordinator<C> {
    generation: u64,
    ready: Option<Session<C>>,
    in_flight: Option<InitFuture<C>>,
}

impl<C> Default for Coordinator<C> {
    fn default() -> Self {
        Self {
            generation: 0,
            ready: None,
            in_flight: None,
        }
    }
}

impl<C> Coordinator<C> {
    pub(crate) fn session(&self) -> Option<&Session<C>> {
        self.ready.as_ref()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl<C: StyleCompiler> Engine<C> {
    /// Starts a fresh initialization and waits for the newest one to finish.
    ///
    /// The previous compiler stays reachable for callers already holding it,
    /// but new callers wait for this initialization. If another `init` starts
    /// before this one finishes, this call resolves to the newer result.
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<Arc<C>, EngineError> {
        let flight = {
            let mut coordinator = self.inner.coordinator.lock();
            self.start_init(&mut coordinator)
        };
        match flight.await {
            Ok(session) => Ok(session.compiler),
            Err(EngineError::Superseded) => self.ensure_init().await,
            Err(err) => Err(err),
        }
    }

    /// Returns the ready compiler, joining or starting an initialization if
    /// there is none.
    pub async fn ensure_init(&self) -> Result<Arc<C>, EngineError> {
        Ok(self.session().await?.compiler)
    }

    pub(crate) async fn session(&self) -> Result<Session<C>, EngineError> {
        loop {
            let flight = {
                let mut coordinator = self.inner.coordinator.lock();
                if let Some(session) = &coordinator.ready {
                    return Ok(session.clone());
                }
                match &coordinator.in_flight {
                    Some(flight) => flight.clone(),
                    None => self.start_init(&mut coordinator),
                }
            };
            match flight.await {
                Err(EngineError::Superseded) => continue,
                result => return result,
            }
        }
    }

    fn start_init(&self, coordinator: &mut Coordinator<C>) -> InitFuture<C> {
        coordinator.generation += 1;
        coordinator.ready = None;
        let generation = coordinator.generation;
        let flight = run_init(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.options.config),
            generation,
        )
        .boxed()
        .shared();
        coordinator.in_flight = Some(flight.clone());
        tracing::debug!(generation, "initialization started");
        flight
    }

    fn finish_init(
        &self,
        generation: u64,
        resolved: Result<ResolvedConfig, ConfigError>,
    ) -> Result<Session<C>, EngineError> {
        let inner = &self.inner;
        let config = match resolved {
            Ok(config) => Arc::new(config),
            Err(err) => {
                tracing::warn!(generation, error = %err, "configuration could not be resolved");
                inner.options.hooks.on_config_error(&err);
                return Err(self.fail_init(generation, err.into()));
            }
        };
        let compiler = match inner.factory.create(&config) {
            Ok(compiler) => Arc::new(compiler),
            Err(err) => {
                tracing::warn!(generation, error = %err, "style compiler could not be constructed");
                return Err(self.fail_init(generation, err.into()));
            }
        };

        let session = Session {
            compiler,
            config,
            generation,
        };
        {
            let mut coordinator = inner.coordinator.lock();
            if coordinator.generation != generation {
                tracing::debug!(generation, current = coordinator.generation, "discarding superseded initialization");
                return Err(EngineError::Superseded);
            }
            inner.state.lock().configure(&session.config, generation);
            coordinator.ready = Some(session.clone());
            coordinator.in_flight = None;
        }
        inner.options.hooks.on_initialized(&session.config);
        tracing::info!(generation, "engine initialized");
        Ok(session)
    }

    /// Returns the coordinator to `Uninitialized` if `generation` is still
    /// current. A stale failure is reported as superseded so its waiters move
    /// on to the newer initialization.
    fn fail_init(&self, generation: u64, err: EngineError) -> EngineError {
        let mut coordinator = self.inner.coordinator.lock();
        if coordinator.generation != generation {
            return EngineError::Superseded;
        }
        coordinator.in_flight = None;
        err
    }
}

/// The in-flight future is stored inside the engine, so it holds the engine
/// only weakly while configuration resolves. An initialization abandoned by
/// every caller then cannot keep the engine alive.
async fn run_init<C: StyleCompiler>(
    inner: Weak<Inner<C>>,
    source: Arc<dyn ConfigSource>,
    generation: u64,
) -> Result<Session<C>, EngineError> {
    let resolved = source.resolve().await;
    let inner = inner.upgrade().ok_or(EngineError::Superseded)?;
    Engine { inner }.finish_init(generation, resolved)
}
