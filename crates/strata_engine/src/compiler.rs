//! The style-compiler capability the engine drives.
//!
//! The engine never parses CSS or decides how a token becomes a rule. It hands
//! token text, tag markup, and style sheets to a [`StyleCompiler`] and stores
//! the opaque nodes it returns.

use async_trait::async_trait;
use strata_common::{Layer, StyleNode};
use strata_config::ResolvedConfig;

use crate::error::CompileError;

/// The outcome of interpreting a batch of class tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation<N> {
    /// Tokens that produced at least one rule.
    pub succeeded: Vec<String>,
    /// The rules produced, in compiler order.
    pub nodes: Vec<N>,
}

impl<N> Default for Interpretation<N> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

/// A preflight generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightRequest {
    /// Space-separated `<tag/>` markup of the tags to cover, or `None` to
    /// cover every tag.
    pub markup: Option<String>,
    /// Include base reset rules.
    pub include_base: bool,
    /// Include global rules.
    pub include_global: bool,
    /// Include rules contributed by compiler plugins.
    pub include_plugin: bool,
}

impl PreflightRequest {
    /// Builds a request covering `tags`, or every tag when `include_all` is set.
    pub fn new(config: &ResolvedConfig, tags: &[String]) -> Self {
        let preflight = &config.preflight;
        let markup = (!preflight.include_all).then(|| {
            tags.iter()
                .map(|tag| format!("<{tag}/>"))
                .collect::<Vec<_>>()
                .join(" ")
        });
        Self {
            markup,
            include_base: preflight.include_base,
            include_global: preflight.include_global,
            include_plugin: preflight.include_plugin,
        }
    }
}

/// A style source split into layer blocks and residual CSS.
#[derive(Debug, Clone, PartialEq)]
pub struct CssTransform<N> {
    /// Nodes parsed out of `@layer` blocks and directives.
    pub nodes: Vec<N>,
    /// The remaining CSS text, returned to the host in place of the source.
    pub css: String,
}

/// Output policy applied when a layer is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Sort rules deterministically.
    pub sort: bool,
    /// Apply vendor prefixes.
    pub prefix: bool,
}

impl RenderOptions {
    /// Reads the output policy from a resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            sort: config.sort_utilities,
            prefix: config.prefixer,
        }
    }
}

/// A style compiler bound to one resolved configuration.
#[async_trait]
pub trait StyleCompiler: Send + Sync + 'static {
    /// The compiled-style unit this compiler produces.
    type Node: StyleNode;

    /// Interprets space-separated class tokens.
    ///
    /// Tokens the compiler does not recognize are simply absent from
    /// [`Interpretation::succeeded`]; an `Err` means the whole batch failed.
    async fn interpret(&self, text: &str) -> Result<Interpretation<Self::Node>, CompileError>;

    /// Produces preflight rules for the requested tags.
    async fn preflight(&self, request: PreflightRequest) -> Result<Vec<Self::Node>, CompileError>;

    /// Splits a style source into layer-tagged nodes and residual CSS.
    async fn transform_css(&self, css: &str, id: &str) -> Result<CssTransform<Self::Node>, CompileError>;

    /// Serializes the nodes of one layer.
    fn render(&self, layer: Layer, nodes: &[&Self::Node], options: RenderOptions) -> String;

    /// Lists the class names this compiler can complete, for editor tooling.
    async fn completions(&self) -> Result<Vec<String>, CompileError> {
        Ok(Vec::new())
    }
}

/// Builds a fresh compiler for each resolved configuration.
pub trait CompilerFactory<C>: Send + Sync {
    /// Constructs a compiler for `config`.
    fn create(&self, config: &ResolvedConfig) -> Result<C, CompileError>;
}

impl<C, F> CompilerFactory<C> for F
where
    F: Fn(&ResolvedConfig) -> Result<C, CompileError> + Send + Sync,
{
    fn create(&self, config: &ResolvedConfig) -> Result<C, CompileError> {
        self(config)
    }
}
