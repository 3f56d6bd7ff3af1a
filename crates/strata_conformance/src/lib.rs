//! Conformance test helpers for the Strata CSS engine.
//!
//! Provides a deterministic [`StubCompiler`] that understands a small fixed
//! vocabulary of utilities, components and `@layer` blocks, an in-memory
//! [`MemorySources`] provider, and constructors wiring them into an
//! [`Engine`] with call counters for assertion in integration tests.

#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use strata_common::{Layer, StyleNode};
use strata_config::{load_config_from_str, ResolvedConfig};
use strata_engine::{
    CompileError, CompilerFactory, CssTransform, Engine, EngineOptions, Interpretation,
    PreflightRequest, RenderOptions, SourceError, SourceProvider, StyleCompiler,
};

/// Utility prefixes the stub compiler accepts, each followed by `-<value>`.
pub const UTILITY_PREFIXES: &[&str] = &["p", "px", "py", "m", "mx", "my", "mt", "w", "h", "text", "bg", "gap"];

/// Component classes the stub compiler accepts.
pub const COMPONENTS: &[&str] = &["btn", "card", "badge"];

/// A compiled rule: its layer and its serialized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubNode {
    /// The layer the rule is emitted into.
    pub layer: Layer,
    /// The serialized rule.
    pub css: String,
}

impl StubNode {
    /// Creates a node.
    pub fn new(layer: Layer, css: impl Into<String>) -> Self {
        Self {
            layer,
            css: css.into(),
        }
    }
}

impl StyleNode for StubNode {
    fn layer(&self) -> Layer {
        self.layer
    }
}

/// Call counters shared by every compiler a [`StubFactory`] builds.
#[derive(Debug, Default)]
pub struct StubStats {
    /// Compilers constructed.
    pub constructed: AtomicUsize,
    /// `interpret` calls.
    pub interpret: AtomicUsize,
    /// `preflight` calls.
    pub preflight: AtomicUsize,
    /// `render` calls.
    pub render: AtomicUsize,
}

impl StubStats {
    /// Reads one counter.
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// A deterministic style compiler over a fixed vocabulary.
///
/// A class token compiles if, after stripping `variant:` prefixes and a
/// leading `!`, it is one of [`COMPONENTS`] (components layer) or
/// `<prefix>-<value>` for a prefix in [`UTILITY_PREFIXES`] (utilities layer).
/// Style sources are split into `@layer <name> { ... }` blocks; everything
/// else is residual CSS.
#[derive(Debug)]
pub struct StubCompiler {
    stats: Arc<StubStats>,
}

impl StubCompiler {
    /// Creates a compiler recording into `stats`.
    pub fn new(stats: Arc<StubStats>) -> Self {
        Self { stats }
    }

    fn compile_token(&self, token: &str) -> Option<StubNode> {
        let (variants, utility) = match token.rsplit_once(':') {
            Some((variants, utility)) => (Some(variants), utility),
            None => (None, token),
        };
        let (important, utility) = match utility.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, utility),
        };
        let layer = if COMPONENTS.contains(&utility) {
            Layer::Components
        } else {
            let (prefix, value) = utility.split_once('-')?;
            if value.is_empty() || !UTILITY_PREFIXES.contains(&prefix) {
                return None;
            }
            Layer::Utilities
        };
        let selector = escape_selector(token);
        let pseudo = variants
            .map(|v| v.split(':').map(|p| format!(":{p}")).collect::<String>())
            .unwrap_or_default();
        let bang = if important { " !important" } else { "" };
        Some(StubNode::new(
            layer,
            format!(".{selector}{pseudo} {{ --{utility}: 1{bang}; }}"),
        ))
    }
}

/// Escapes the characters of a class token that are special in selectors.
pub fn escape_selector(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if matches!(c, ':' | '!' | '/' | '.' | '[' | ']' | '(' | ')' | '%' | '#' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl StyleCompiler for StubCompiler {
    type Node = StubNode;

    async fn interpret(&self, text: &str) -> Result<Interpretation<StubNode>, CompileError> {
        self.stats.interpret.fetch_add(1, Ordering::SeqCst);
        let mut out = Interpretation::default();
        for token in text.split_whitespace() {
            if let Some(node) = self.compile_token(token) {
                out.succeeded.push(token.to_string());
                out.nodes.push(node);
            }
        }
        Ok(out)
    }

    async fn preflight(&self, request: PreflightRequest) -> Result<Vec<StubNode>, CompileError> {
        self.stats.preflight.fetch_add(1, Ordering::SeqCst);
        let mut nodes = Vec::new();
        if request.include_global {
            nodes.push(StubNode::new(Layer::Base, "*, ::before, ::after { box-sizing: border-box; }"));
        }
        if request.include_base {
            match request.markup {
                Some(markup) => {
                    for tag in markup.split_whitespace() {
                        let name = tag.trim_start_matches('<').trim_end_matches("/>");
                        nodes.push(StubNode::new(Layer::Base, format!("{name} {{ margin: 0; }}")));
                    }
                }
                None => nodes.push(StubNode::new(Layer::Base, "* { margin: 0; }")),
            }
        }
        Ok(nodes)
    }

    async fn transform_css(&self, css: &str, id: &str) -> Result<CssTransform<StubNode>, CompileError> {
        let mut nodes = Vec::new();
        let mut residual = String::new();
        let mut rest = css;
        while let Some(start) = rest.find("@layer") {
            residual.push_str(&rest[..start]);
            let after = &rest[start + "@layer".len()..];
            let open = after.find('{').ok_or_else(|| transform_error(id, "missing '{' after @layer"))?;
            let layer: Layer = after[..open]
                .trim()
                .parse()
                .map_err(|err| transform_error(id, format!("{err}")))?;
            let body_start = open + 1;
            let close = matching_brace(&after[body_start..])
                .ok_or_else(|| transform_error(id, "unclosed @layer block"))?;
            let body = after[body_start..body_start + close].trim();
            if !body.is_empty() {
                nodes.push(StubNode::new(layer, body));
            }
            rest = &after[body_start + close + 1..];
        }
        residual.push_str(rest);
        Ok(CssTransform {
            nodes,
            css: residual.trim().to_string(),
        })
    }

    fn render(&self, _layer: Layer, nodes: &[&StubNode], options: RenderOptions) -> String {
        self.stats.render.fetch_add(1, Ordering::SeqCst);
        let mut rules: Vec<&str> = nodes.iter().map(|n| n.css.as_str()).collect();
        if options.sort {
            rules.sort_unstable();
        }
        rules.join("\n")
    }

    async fn completions(&self) -> Result<Vec<String>, CompileError> {
        let mut list: Vec<String> = COMPONENTS.iter().map(|c| c.to_string()).collect();
        list.extend(UTILITY_PREFIXES.iter().map(|p| format!("{p}-")));
        Ok(list)
    }
}

fn transform_error(id: &str, reason: impl Into<String>) -> CompileError {
    CompileError::Transform {
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Returns the offset of the `}` closing an already-opened block.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Builds [`StubCompiler`]s that share one set of counters.
#[derive(Debug, Clone, Default)]
pub struct StubFactory {
    /// Counters shared by every compiler built.
    pub stats: Arc<StubStats>,
}

impl CompilerFactory<StubCompiler> for StubFactory {
    fn create(&self, _config: &ResolvedConfig) -> Result<StubCompiler, CompileError> {
        self.stats.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(StubCompiler::new(Arc::clone(&self.stats)))
    }
}

/// An in-memory source provider. Clones share the same files and counters.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: RwLock<BTreeMap<String, String>>,
    reads: AtomicUsize,
    discoveries: AtomicUsize,
}

impl MemorySources {
    /// Creates a provider holding `files`.
    pub fn new<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let sources = Self::default();
        for (id, text) in files {
            sources.insert(id, text);
        }
        sources
    }

    /// Adds or replaces a file.
    pub fn insert(&self, id: impl Into<String>, text: impl Into<String>) {
        self.inner.files.write().insert(id.into(), text.into());
    }

    /// Number of `read` calls served.
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Number of `discover` calls served.
    pub fn discoveries(&self) -> usize {
        self.inner.discoveries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceProvider for MemorySources {
    async fn discover(&self, _config: &ResolvedConfig) -> Result<Vec<String>, SourceError> {
        self.inner.discoveries.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.files.read().keys().cloned().collect())
    }

    async fn read(&self, id: &str) -> Result<String, SourceError> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .files
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}

/// Parses a `strata.toml` snippet into a resolved configuration.
pub fn make_config(toml_str: &str) -> ResolvedConfig {
    load_config_from_str(toml_str).unwrap()
}

/// A configuration with scanning disabled, for tests that feed sources by hand.
pub fn manual_config() -> ResolvedConfig {
    make_config(
        r#"
[scan]
enabled = false
"#,
    )
}

/// Builds an engine over the stub compiler with the given options.
pub fn stub_engine_with(options: EngineOptions) -> (Engine<StubCompiler>, Arc<StubStats>) {
    let factory = StubFactory::default();
    let stats = Arc::clone(&factory.stats);
    (Engine::new(factory, options), stats)
}

/// Builds an engine over the stub compiler with a fixed configuration.
pub fn stub_engine(config: ResolvedConfig) -> (Engine<StubCompiler>, Arc<StubStats>) {
    stub_engine_with(EngineOptions::new(config))
}
