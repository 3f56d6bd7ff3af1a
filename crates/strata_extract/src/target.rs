//! Classification of source identifiers.
//!
//! Decides, from an identifier's extension, whether a source is a style sheet
//! (routed to the CSS transform path) or a text source (routed to token
//! extraction). Identifiers may carry a bundler query suffix such as
//! `App.vue?vue&type=style`, which is ignored.

use strata_config::ResolvedScan;

/// How a source participates in CSS generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Markup or script whose class and tag tokens are extracted.
    Text,
    /// A style sheet whose layer blocks are parsed into style nodes.
    Style,
}

/// Returns the lowercase extension of an identifier, without query or dot.
pub fn extension_of(id: &str) -> Option<String> {
    let path = id.split(|c: char| c == '?' || c == '#').next().unwrap_or(id);
    let file_name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns `true` if the identifier contains any configured exclude fragment.
pub fn is_excluded(id: &str, scan: &ResolvedScan) -> bool {
    let normalized = id.replace('\\', "/");
    scan.exclude
        .iter()
        .filter(|fragment| !fragment.is_empty())
        .any(|fragment| normalized.contains(fragment.as_str()))
}

/// Classifies a source identifier.
///
/// Returns `None` for excluded identifiers and for extensions that are
/// neither text nor style sources.
pub fn classify(id: &str, scan: &ResolvedScan) -> Option<SourceKind> {
    if is_excluded(id, scan) {
        return None;
    }
    let ext = extension_of(id)?;
    if scan.style_extensions.contains(&ext) {
        Some(SourceKind::Style)
    } else if scan.file_extensions.contains(&ext) {
        Some(SourceKind::Text)
    } else {
        None
    }
}
