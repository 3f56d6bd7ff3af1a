//! Incremental CSS generation for utility-class projects.
//!
//! The [`Engine`] ties the pieces together: it resolves configuration and
//! builds a [`StyleCompiler`] exactly once per configuration (single-flight),
//! feeds source text through the extraction pipeline into the token registry,
//! submits only new tokens to the compiler, and serves per-layer CSS from the
//! layer cache, rebuilding a layer only when one of its contributions changed.
//!
//! Everything that parses CSS, maps tokens to rules, or touches the file
//! system is an external capability supplied through the traits in
//! [`compiler`], [`config`] and [`source`].

#![warn(missing_docs)]

mod bridge;
pub mod compiler;
pub mod config;
mod engine;
pub mod error;
mod extract;
pub mod hooks;
mod init;
pub mod options;
mod orchestrate;
pub mod source;
mod state;
#[cfg(test)]
mod testing;

pub use compiler::{
    CompilerFactory, CssTransform, Interpretation, PreflightRequest, RenderOptions, StyleCompiler,
};
pub use config::{ConfigDir, ConfigSource};
pub use engine::Engine;
pub use error::{CompileError, EngineError, SourceError};
pub use hooks::{GeneratedSnapshot, Hooks, NoopHooks, PendingSnapshot};
pub use options::EngineOptions;
pub use orchestrate::ScanSummary;
pub use source::{FsSources, SourceProvider};

pub use strata_cache::LayerMeta;
pub use strata_common::{Layer, SourceKey, StyleNode};
pub use strata_config::{ConfigError, ResolvedConfig};
pub use strata_extract::{ExtractError, ExtractResult, Extractor, SourceTransformer};
