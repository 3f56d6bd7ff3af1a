//! Incremental token tracking and layer output caching.
//!
//! This crate owns the in-memory state that makes CSS regeneration cheap: the
//! [`TokenRegistry`] of compiled and pending tokens, the [`LayerStore`] of
//! per-source style contributions with memoized per-layer output, and the
//! [`SourceFingerprints`] that let unchanged sources skip extraction.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod layers;
pub mod registry;

pub use fingerprint::SourceFingerprints;
pub use layers::{layer_banner, LayerMeta, LayerStore, UpdateMode};
pub use registry::{RegistryPolicy, TokenRegistry};
