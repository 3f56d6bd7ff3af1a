//! Content hashing for skipping re-extraction of unchanged sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit content hash computed using XXH3.
///
/// Two source texts with the same `ContentHash` are assumed to be identical.
/// The engine records one per source identifier so that re-delivering the same
/// text for a file does not re-run transformers and extractors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Hashes UTF-8 source text.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the raw 128-bit digest.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", self.0 >> 96)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_text("<div class=\"p-4\"></div>");
        let b = ContentHash::from_text("<div class=\"p-4\"></div>");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_text("p-4");
        let b = ContentHash::from_text("p-5");
        assert_ne!(a, b);
    }

    #[test]
    fn text_and_bytes_agree() {
        assert_eq!(
            ContentHash::from_text("m-2"),
            ContentHash::from_bytes(b"m-2")
        );
    }

    #[test]
    fn display_is_zero_padded_hex() {
        let h = ContentHash::from_text("");
        let s = h.to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(u128::from_str_radix(&s, 16).unwrap(), h.as_u128());
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_text("test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert_eq!(s.len(), "ContentHash(..)".len() + 8);
    }
}
