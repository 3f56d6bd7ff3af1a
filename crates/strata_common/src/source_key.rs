//! Keys for per-source layer contributions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies who contributed a group of style nodes to the layer store.
///
/// Real source files and the two compiler-generated buckets live in separate
/// variants, so a file can never collide with generated output regardless of
/// its name.
///
/// The ordering is the emission order within a layer: preflights, then
/// generated classes, then files sorted by identifier, so that hand-written
/// `@layer` blocks come after generated rules.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SourceKey {
    /// Nodes produced by preflight generation for discovered tags.
    GeneratedPreflights,
    /// Nodes produced by interpreting discovered class tokens.
    GeneratedClasses,
    /// Nodes parsed out of a style source file, keyed by its identifier.
    Source(String),
}

impl SourceKey {
    /// Creates a key for a real source identifier.
    pub fn source(id: impl Into<String>) -> Self {
        SourceKey::Source(id.into())
    }

    /// Returns `true` for the compiler-generated buckets.
    pub fn is_generated(&self) -> bool {
        !matches!(self, SourceKey::Source(_))
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKey::Source(id) => f.write_str(id),
            SourceKey::GeneratedClasses => f.write_str("<generated classes>"),
            SourceKey::GeneratedPreflights => f.write_str("<generated preflights>"),
        }
    }
}
