//! Per-source text rewriting applied before extraction.

use std::sync::Arc;

use crate::error::ExtractError;

/// Rewrites a source's text before tokens are extracted from it.
///
/// Returning `Ok(None)` leaves the text unchanged. Transformers only run for
/// sources with a known identifier.
pub trait SourceTransformer: Send + Sync {
    /// Rewrites `code` belonging to `id`.
    fn transform(&self, code: &str, id: &str) -> Result<Option<String>, ExtractError>;
}

impl<F> SourceTransformer for F
where
    F: Fn(&str, &str) -> Result<Option<String>, ExtractError> + Send + Sync,
{
    fn transform(&self, code: &str, id: &str) -> Result<Option<String>, ExtractError> {
        self(code, id)
    }
}

/// Runs every transformer in order, threading the rewritten text through.
pub fn apply_transformers(
    code: String,
    id: &str,
    transformers: &[Arc<dyn SourceTransformer>],
) -> Result<String, ExtractError> {
    let mut code = code;
    for transformer in transformers {
        if let Some(rewritten) = transformer.transform(&code, id)? {
            code = rewritten;
        }
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_html() -> Arc<dyn SourceTransformer> {
        Arc::new(
            |code: &str, id: &str| -> Result<Option<String>, ExtractError> {
                Ok(id.ends_with(".html").then(|| code.replace("btn", "px-4 py-2")))
            },
        )
    }

    fn suffix() -> Arc<dyn SourceTransformer> {
        Arc::new(
            |code: &str, _id: &str| -> Result<Option<String>, ExtractError> {
                Ok(Some(format!("{code} m-1")))
            },
        )
    }

    #[test]
    fn transformers_run_in_order() {
        let out =
            apply_transformers("btn".to_string(), "a.html", &[upper_html(), suffix()]).unwrap();
        assert_eq!(out, "px-4 py-2 m-1");
    }

    #[test]
    fn none_leaves_text_unchanged() {
        let out = apply_transformers("btn".to_string(), "a.vue", &[upper_html()]).unwrap();
        assert_eq!(out, "btn");
    }

    #[test]
    fn errors_stop_the_chain() {
        let failing: Arc<dyn SourceTransformer> = Arc::new(
            |_: &str, id: &str| -> Result<Option<String>, ExtractError> {
                Err(ExtractError::transformer(id, "cannot parse"))
            },
        );
        let err =
            apply_transformers("x".to_string(), "a.vue", &[failing, suffix()]).unwrap_err();
        assert_eq!(err, ExtractError::transformer("a.vue", "cannot parse"));
    }
}
