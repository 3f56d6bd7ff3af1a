//! Lifecycle callbacks for hosts that observe generation.

use strata_config::{ConfigError, ResolvedConfig};

/// Tokens awaiting compilation, as seen just before a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSnapshot {
    /// Pending class tokens, sorted.
    pub classes: Vec<String>,
    /// Pending tags, sorted.
    pub tags: Vec<String>,
}

/// Tokens already compiled, as seen just after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSnapshot {
    /// Generated class tokens, sorted.
    pub classes: Vec<String>,
    /// Tags whose preflight has been produced, sorted.
    pub tags: Vec<String>,
}

/// Callbacks invoked at fixed points of the engine lifecycle.
///
/// Hooks are called synchronously and must not call back into the engine.
/// Every method defaults to doing nothing.
pub trait Hooks: Send + Sync {
    /// Called before pending tokens are submitted to the compiler.
    fn on_before_generate(&self, _pending: &PendingSnapshot) {}

    /// Called after pending tokens have been compiled.
    fn on_generated(&self, _generated: &GeneratedSnapshot) {}

    /// Called once a new configuration has been applied.
    fn on_initialized(&self, _config: &ResolvedConfig) {}

    /// Called when configuration resolution fails.
    fn on_config_error(&self, _error: &ConfigError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}
