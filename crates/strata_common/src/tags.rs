//! The static universe of HTML tags tracked for preflight generation.

/// Every standard HTML element name a preflight can target.
///
/// Tags seen in source files only become preflight candidates if they appear
/// here (directly, or through a configured alias).
pub const HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "legend", "li", "link", "main", "map", "mark", "math", "menu", "meta",
    "meter", "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "param",
    "picture", "pre", "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search",
    "section", "select", "slot", "small", "source", "span", "strong", "style", "sub", "summary",
    "sup", "svg", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead",
    "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

/// Normalizes an element or component name to lowercase kebab-case.
///
/// `RouterLink`, `router_link` and `router link` all become `router-link`, which
/// is the form alias tables are keyed by.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            pending_dash = !out.is_empty();
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() && prev_lower_or_digit {
            pending_dash = true;
        }
        if pending_dash {
            out.push('-');
            pending_dash = false;
        }
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out
}
