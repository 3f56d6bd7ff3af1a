//! Shared foundational types used across the Strata CSS engine.
//!
//! This crate provides the output layer enumeration, the closed set of layer
//! contribution keys, the [`StyleNode`] abstraction over compiled style, content
//! hashing, and the static HTML tag universe used for preflight tracking.

#![warn(missing_docs)]

pub mod hash;
pub mod layer;
pub mod node;
pub mod source_key;
pub mod tags;

pub use hash::ContentHash;
pub use layer::{Layer, ParseLayerError};
pub use node::StyleNode;
pub use source_key::SourceKey;
pub use tags::{kebab_case, HTML_TAGS};
