//! The three ordered CSS output layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed, ordered output buckets of generated CSS.
///
/// The declaration order is the emission order: `base` rules come first,
/// then `components`, then `utilities`, so later layers win at equal
/// specificity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Preflight/reset rules and `@layer base` blocks.
    Base,
    /// Component classes and `@layer components` blocks.
    Components,
    /// Utility classes and `@layer utilities` blocks.
    Utilities,
}

impl Layer {
    /// All layers in emission order.
    pub const ALL: [Layer; 3] = [Layer::Base, Layer::Components, Layer::Utilities];

    /// Returns the lowercase layer name as it appears in CSS and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::Components => "components",
            Layer::Utilities => "utilities",
        }
    }

    /// Returns the position of this layer in [`Layer::ALL`].
    pub fn index(self) -> usize {
        match self {
            Layer::Base => 0,
            Layer::Components => 1,
            Layer::Utilities => 2,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer '{0}', expected one of: base, components, utilities")]
pub struct ParseLayerError(pub String);

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "base" => Ok(Layer::Base),
            "components" => Ok(Layer::Components),
            "utilities" => Ok(Layer::Utilities),
            other => Err(ParseLayerError(other.to_string())),
        }
    }
}
