//! The built-in extractor used when no registered extractor claims a source.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ExtractError;
use crate::extractor::{ExtractResult, Extractor};

/// Splits text on quotes, whitespace and braces and keeps every fragment that
/// looks like a utility class; collects element names from `<tag ...>` markup.
///
/// It deliberately over-approximates: anything the compiler does not know is
/// rejected later at interpretation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl DefaultExtractor {
    /// Extracts tokens synchronously.
    pub fn extract_tokens(&self, code: &str) -> ExtractResult {
        ExtractResult {
            classes: extract_classes(code),
            tags: extract_tags(code),
        }
    }
}

#[async_trait]
impl Extractor for DefaultExtractor {
    fn name(&self) -> &str {
        "default"
    }

    fn extensions(&self) -> &[String] {
        &[]
    }

    async fn extract(&self, code: &str, _id: Option<&str>) -> Result<ExtractResult, ExtractError> {
        Ok(self.extract_tokens(code))
    }
}

fn is_splitter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '"' | '`' | '{' | '}')
}

fn extract_classes(code: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    code.split(is_splitter)
        .filter(|s| is_class_candidate(s))
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// Returns `true` for fragments shaped like a (possibly variant-prefixed,
/// important, or arbitrary-valued) utility class.
fn is_class_candidate(s: &str) -> bool {
    let body = s.strip_prefix('!').unwrap_or(s);
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase()
        || first.is_ascii_digit()
        || matches!(first, '@' | '<' | '>' | '.' | '+' | '-'))
    {
        return false;
    }

    let mut depth = 0usize;
    for c in chars {
        let ok = match c {
            '(' => {
                depth += 1;
                true
            }
            ')' if depth > 0 => {
                depth -= 1;
                true
            }
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '.' | '%' | '#' | '-') => {
                true
            }
            '+' => depth > 0,
            ':' | '/' | '\\' | '[' | ']' | '$' => depth == 0,
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    if depth != 0 {
        return false;
    }

    // A lowercase letter must appear before the final character, which must
    // close a word, a call or an arbitrary value.
    let Some(last) = s.chars().last() else {
        return false;
    };
    let ends_well = last.is_ascii_alphanumeric() || matches!(last, '_' | ')' | ']');
    let body_before_last = &s[..s.len() - last.len_utf8()];
    ends_well && body_before_last.chars().any(|c| c.is_ascii_lowercase())
}

fn extract_tags(code: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    let bytes = code.as_bytes();
    let mut i = 0;
    while let Some(rel) = code[i..].find('<') {
        let start = i + rel + 1;
        i = start;
        let Some(&first) = bytes.get(start) else {
            break;
        };
        if !(first.is_ascii_alphanumeric() || first == b'_') {
            continue;
        }
        let mut end = start + 1;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'_' | b'-'))
        {
            end += 1;
        }
        if !code[end..].contains('>') {
            break;
        }
        let name = &code[start..end];
        if seen.insert(name) {
            tags.push(name.to_string());
        }
        i = end;
    }
    tags
}
