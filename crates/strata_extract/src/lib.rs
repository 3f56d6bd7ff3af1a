//! Turning source text into raw class and tag tokens.
//!
//! Extraction is split into independent stages: variant-group expansion
//! ([`group`]), per-identifier source rewriting ([`transformer`]), and the
//! pluggable extractors that produce token lists ([`extractor`]), with a
//! built-in fallback ([`default`]). [`target`] decides which pipeline a source
//! identifier belongs to.

#![warn(missing_docs)]

pub mod default;
pub mod error;
pub mod extractor;
pub mod group;
pub mod target;
pub mod transformer;

pub use default::DefaultExtractor;
pub use error::ExtractError;
pub use extractor::{apply_extractors, ExtractResult, Extractor};
pub use group::expand_groups;
pub use target::{classify, extension_of, is_excluded, SourceKind};
pub use transformer::{apply_transformers, SourceTransformer};
