//! Source content fingerprints and change detection.
//!
//! Records the content hash of the text last extracted for each source
//! identifier so that re-delivering unchanged text (a save without edits, a
//! watcher firing twice) does not re-run transformers and extractors.

use std::collections::HashMap;

use strata_common::ContentHash;

/// What was extracted for one source identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fingerprint {
    hash: ContentHash,
    grouped: bool,
}

/// Per-identifier content hashes of previously extracted sources.
#[derive(Debug, Default)]
pub struct SourceFingerprints {
    seen: HashMap<String, Fingerprint>,
}

impl SourceFingerprints {
    /// Creates an empty fingerprint table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was last extracted from identical text with the
    /// same group-transform setting.
    pub fn is_unchanged(&self, id: &str, hash: ContentHash, grouped: bool) -> bool {
        self.seen.get(id) == Some(&Fingerprint { hash, grouped })
    }

    /// Records a successful extraction of `id`.
    pub fn record(&mut self, id: &str, hash: ContentHash, grouped: bool) {
        self.seen.insert(id.to_string(), Fingerprint { hash, grouped });
    }

    /// Forgets every recorded source.
    pub fn clear(&mut self) {
        self.seen.clear();
    }

    /// Returns the number of recorded sources.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
