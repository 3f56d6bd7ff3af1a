//! Variant-group expansion.
//!
//! Rewrites grouped shorthand such as `hover:(bg-red-500 text-white)` into the
//! flat class list `hover:bg-red-500 hover:text-white` so that extractors only
//! ever see plain tokens. Groups nest and are expanded innermost-first until no
//! group remains, e.g. `md:(hover:(a b) c)` becomes `md:hover:a md:hover:b md:c`.
//! A `-` separator groups utility stems: `bg-(red-500 opacity-50)`.

/// Expands every well-formed variant group in `code`.
///
/// Parentheses that do not form a group (function calls, arithmetic, text in
/// prose) are left untouched.
pub fn expand_groups(code: &str) -> String {
    let mut current = code.to_string();
    while let Some(next) = expand_innermost(&current) {
        current = next;
    }
    current
}

/// Expands the first innermost group found, or returns `None` when there is
/// nothing left to expand.
fn expand_innermost(code: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(rel) = code[search_from..].find('(') {
        let open = search_from + rel;
        search_from = open + 1;
        let close = open + 1 + code[open + 1..].find(|c: char| c == '(' || c == ')')?;
        if code.as_bytes()[close] == b'(' {
            continue;
        }
        if let Some((start, replacement)) = expand_group(code, open, close) {
            let mut out = String::with_capacity(code.len() + replacement.len());
            out.push_str(&code[..start]);
            out.push_str(&replacement);
            out.push_str(&code[close + 1..]);
            return Some(out);
        }
    }
    None
}

/// Expands the group whose parentheses sit at `open` and `close`.
///
/// Returns the byte offset where the group's prefix starts together with the
/// flattened replacement text.
fn expand_group(code: &str, open: usize, close: usize) -> Option<(usize, String)> {
    if open < 2 {
        return None;
    }
    let bytes = code.as_bytes();
    let sep = bytes[open - 1];
    if sep != b':' && sep != b'-' {
        return None;
    }

    let prefix_end = open - 1;
    let mut start = prefix_end;
    while start > 0 && is_prefix_byte(bytes[start - 1]) {
        start -= 1;
    }
    let prefix = &code[start..prefix_end];
    if !prefix.bytes().any(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let content = &code[open + 1..close];
    if !content.chars().all(is_content_char) {
        return None;
    }
    let sep = char::from(sep);
    let items: Vec<String> = content
        .split_whitespace()
        .map(|item| format!("{prefix}{sep}{item}"))
        .collect();
    if items.is_empty() {
        return None;
    }
    Some((start, items.join(" ")))
}

fn is_prefix_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'!' | b'+' | b':' | b'/' | b'-')
}

fn is_content_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '~' | '!' | '_' | ':' | '/' | '\\' | ',' | '%' | '#' | '.' | '$' | '-' | '[' | ']'
        )
}
