//! A minimal compiler for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use strata_common::{Layer, StyleNode};
use strata_config::ResolvedConfig;

use crate::compiler::{CssTransform, Interpretation, PreflightRequest, RenderOptions, StyleCompiler};
use crate::error::CompileError;
use crate::{Engine, EngineOptions};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestNode {
    pub(crate) layer: Layer,
    pub(crate) css: String,
}

impl StyleNode for TestNode {
    fn layer(&self) -> Layer {
        self.layer
    }
}

pub(crate) fn node(layer: Layer, name: &str) -> TestNode {
    TestNode {
        layer,
        css: format!(".{name} {{}}"),
    }
}

#[derive(Default)]
pub(crate) struct Calls {
    interpret: AtomicUsize,
    preflight: AtomicUsize,
    completions: AtomicUsize,
    last_markup: Mutex<Option<Option<String>>>,
    latency: Mutex<Duration>,
}

impl Calls {
    pub(crate) fn interpret(&self) -> usize {
        self.interpret.load(Ordering::SeqCst)
    }

    pub(crate) fn preflight(&self) -> usize {
        self.preflight.load(Ordering::SeqCst)
    }

    pub(crate) fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub(crate) fn last_markup(&self) -> Option<Option<String>> {
        self.last_markup.lock().clone()
    }

    /// Makes every later `interpret` and `preflight` call take `latency`.
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    async fn wait(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Accepts every token except `bogus`; `btn*` tokens are components.
pub(crate) struct TestCompiler {
    calls: Arc<Calls>,
}

#[async_trait]
impl StyleCompiler for TestCompiler {
    type Node = TestNode;

    async fn interpret(&self, text: &str) -> Result<Interpretation<TestNode>, CompileError> {
        self.calls.interpret.fetch_add(1, Ordering::SeqCst);
        self.calls.wait().await;
        let mut out = Interpretation::default();
        for token in text.split_whitespace().filter(|t| *t != "bogus") {
            let layer = if token.starts_with("btn") {
                Layer::Components
            } else {
                Layer::Utilities
            };
            out.succeeded.push(token.to_string());
            out.nodes.push(node(layer, token));
        }
        Ok(out)
    }

    async fn preflight(&self, request: PreflightRequest) -> Result<Vec<TestNode>, CompileError> {
        self.calls.preflight.fetch_add(1, Ordering::SeqCst);
        self.calls.wait().await;
        let nodes = match &request.markup {
            Some(markup) => markup
                .split_whitespace()
                .map(|tag| TestNode {
                    layer: Layer::Base,
                    css: format!("{} {{}}", tag.trim_start_matches('<').trim_end_matches("/>")),
                })
                .collect(),
            None => vec![TestNode {
                layer: Layer::Base,
                css: "* {}".to_string(),
            }],
        };
        *self.calls.last_markup.lock() = Some(request.markup);
        Ok(nodes)
    }

    async fn transform_css(&self, css: &str, _id: &str) -> Result<CssTransform<TestNode>, CompileError> {
        Ok(CssTransform {
            nodes: Vec::new(),
            css: css.to_string(),
        })
    }

    fn render(&self, _layer: Layer, nodes: &[&TestNode], _options: RenderOptions) -> String {
        nodes.iter().map(|n| n.css.as_str()).collect::<Vec<_>>().join("\n")
    }

    async fn completions(&self) -> Result<Vec<String>, CompileError> {
        self.calls.completions.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["p-4".to_string(), "btn".to_string()])
    }
}

pub(crate) fn engine(config: ResolvedConfig) -> (Engine<TestCompiler>, Arc<Calls>) {
    engine_with(EngineOptions::new(config))
}

pub(crate) fn engine_with(options: EngineOptions) -> (Engine<TestCompiler>, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let shared = Arc::clone(&calls);
    let factory = move |_: &ResolvedConfig| -> Result<TestCompiler, CompileError> {
        Ok(TestCompiler {
            calls: Arc::clone(&shared),
        })
    };
    (Engine::new(factory, options), calls)
}
