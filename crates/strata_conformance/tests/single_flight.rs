//! Tests of the single-flight guarantees for initialization and scanning.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use strata_common::Layer;
use strata_conformance::{
    manual_config, stub_engine_with, MemorySources, StubCompiler, StubNode, StubStats,
};
use strata_config::ConfigError;
use strata_engine::{
    CompileError, ConfigSource, CssTransform, Engine, EngineError, EngineOptions,
    Interpretation, PreflightRequest, RenderOptions, ResolvedConfig, StyleCompiler,
};

/// Resolves after a delay; the first resolution takes longest.
struct SlowConfig {
    calls: AtomicUsize,
    configs: Vec<ResolvedConfig>,
}

impl SlowConfig {
    fn new(configs: Vec<ResolvedConfig>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            configs,
        }
    }
}

#[async_trait]
impl ConfigSource for SlowConfig {
    async fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = if call == 0 { 40 } else { 5 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(self.configs[call.min(self.configs.len() - 1)].clone())
    }
}

fn with_safelist(token: &str) -> ResolvedConfig {
    let mut config = manual_config();
    config.safelist.insert(token.to_string());
    config
}

#[tokio::test]
async fn concurrent_ensure_init_constructs_once() {
    let options = EngineOptions::new(SlowConfig::new(vec![manual_config()]));
    let (engine, stats) = stub_engine_with(options);

    let (a, b, c) = tokio::join!(engine.ensure_init(), engine.ensure_init(), engine.ensure_init());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    assert_eq!(StubStats::get(&stats.constructed), 1);
    assert_eq!(engine.generation(), 1);
}

#[tokio::test]
async fn first_requests_share_initialization() {
    let options = EngineOptions::new(SlowConfig::new(vec![manual_config()]));
    let (engine, stats) = stub_engine_with(options);

    let (extracted, css) = tokio::join!(
        engine.extract_file("p-4", Some("a.html"), true),
        engine.generate_css(Some(Layer::Utilities)),
    );
    assert!(extracted.unwrap());
    css.unwrap();
    assert_eq!(StubStats::get(&stats.constructed), 1);
}

#[tokio::test]
async fn newest_initialization_wins() {
    let options = EngineOptions::new(SlowConfig::new(vec![
        with_safelist("m-1"),
        with_safelist("m-2"),
    ]));
    let (engine, stats) = stub_engine_with(options);

    let late = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.init().await
    };
    let (stale, fresh) = tokio::join!(engine.init(), late);
    assert!(Arc::ptr_eq(&stale.unwrap(), &fresh.unwrap()));

    assert_eq!(engine.generation(), 2);
    assert!(engine.config().unwrap().safelist.contains("m-2"));
    assert_eq!(engine.pending().classes, vec!["m-2"]);
    // The stale initialization still built a compiler, but never published it.
    assert_eq!(StubStats::get(&stats.constructed), 2);
}

#[tokio::test]
async fn waiters_of_a_superseded_init_follow_the_newer_one() {
    let options = EngineOptions::new(SlowConfig::new(vec![
        with_safelist("m-1"),
        with_safelist("m-2"),
    ]));
    let (engine, _) = stub_engine_with(options);

    let waiter = async {
        tokio::time::sleep(Duration::from_millis(2)).await;
        engine.ensure_init().await
    };
    let reinit = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.init().await
    };
    let (first, waited, newer) = tokio::join!(engine.ensure_init(), waiter, reinit);
    let newer = newer.unwrap();
    assert!(Arc::ptr_eq(&first.unwrap(), &newer));
    assert!(Arc::ptr_eq(&waited.unwrap(), &newer));
}

#[tokio::test]
async fn concurrent_scans_read_each_source_once() {
    let sources = MemorySources::new([
        ("src/a.html", "<div class=\"p-4\">"),
        ("src/b.html", "<div class=\"m-2\">"),
        ("src/c.css", "@layer components { .c { color: red } }"),
    ]);
    let options = EngineOptions::new(ResolvedConfig::default()).with_sources(sources.clone());
    let (engine, _) = stub_engine_with(options);

    let (x, y, css) = tokio::join!(engine.scan(), engine.scan(), engine.generate_css(None));
    assert_eq!(x.unwrap(), y.unwrap());
    let css = css.unwrap();
    assert!(css.contains(".p-4 ") && css.contains(".m-2 ") && css.contains(".c { color: red }"));
    assert_eq!(sources.discoveries(), 1);
    assert_eq!(sources.reads(), 3);
}

#[tokio::test]
async fn initialization_failure_reaches_every_waiter() {
    struct Broken;

    #[async_trait]
    impl ConfigSource for Broken {
        async fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err(ConfigError::Parse("expected '=' at line 1".to_string()))
        }
    }

    let (engine, stats) = stub_engine_with(EngineOptions::new(Broken));
    let (a, b) = tokio::join!(engine.generate_css(None), engine.extract_file("p-4", None, true));
    assert!(matches!(a, Err(EngineError::Config(_))));
    assert!(matches!(b, Err(EngineError::Config(_))));
    assert_eq!(StubStats::get(&stats.constructed), 0);
    assert!(!engine.is_ready());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_sources_all_compile() {
    let (engine, _) = stub_engine_with(EngineOptions::new(manual_config()));
    let mut tasks = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let id = format!("src/page{i}.html");
            engine
                .extract_file(&format!("<p class=\"w-{i} h-{i}\">"), Some(&id), true)
                .await?;
            engine.generate_css(None).await
        }));
    }
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let css = engine.generate_css(Some(Layer::Utilities)).await.unwrap();
    for i in 0..16 {
        assert!(css.contains(&format!(".w-{i} ")));
        assert!(css.contains(&format!(".h-{i} ")));
    }
    assert!(engine.pending().classes.is_empty());
    assert!(engine.rejected().is_empty());
}

/// Delays every `interpret` and `preflight` call of the stub compiler.
struct Sluggish(StubCompiler);

#[async_trait]
impl StyleCompiler for Sluggish {
    type Node = StubNode;

    async fn interpret(&self, text: &str) -> Result<Interpretation<StubNode>, CompileError> {
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.0.interpret(text).await
    }

    async fn preflight(&self, request: PreflightRequest) -> Result<Vec<StubNode>, CompileError> {
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.0.preflight(request).await
    }

    async fn transform_css(&self, css: &str, id: &str) -> Result<CssTransform<StubNode>, CompileError> {
        self.0.transform_css(css, id).await
    }

    fn render(&self, layer: Layer, nodes: &[&StubNode], options: RenderOptions) -> String {
        self.0.render(layer, nodes, options)
    }
}

fn sluggish_engine() -> (Engine<Sluggish>, Arc<StubStats>) {
    let stats = Arc::new(StubStats::default());
    let shared = Arc::clone(&stats);
    let factory = move |_: &ResolvedConfig| -> Result<Sluggish, CompileError> {
        Ok(Sluggish(StubCompiler::new(Arc::clone(&shared))))
    };
    (Engine::new(factory, EngineOptions::new(manual_config())), stats)
}

#[tokio::test]
async fn css_requested_during_a_reload_is_complete() {
    let (engine, stats) = sluggish_engine();
    engine.extract_file(r#"<div class="p-4">"#, None, true).await.unwrap();

    let reload = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.init().await.unwrap();
    };
    let (css, ()) = tokio::join!(engine.generate_css(Some(Layer::Utilities)), reload);
    let css = css.unwrap();

    assert!(css.contains(".p-4"), "{css}");
    assert!(engine.pending().classes.is_empty());
    assert_eq!(engine.generation(), 2);
    assert_eq!(StubStats::get(&stats.interpret), 2);
}

#[tokio::test]
async fn preflight_interrupted_by_a_reload_is_redone() {
    let (engine, stats) = sluggish_engine();
    engine.extract_file("<section></section>", None, true).await.unwrap();

    let reload = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.init().await.unwrap();
    };
    let (css, ()) = tokio::join!(engine.generate_css(Some(Layer::Base)), reload);
    css.unwrap();

    assert_eq!(StubStats::get(&stats.preflight), 2);
    assert!(engine.generated().tags.contains(&"section".to_string()));
    assert!(engine.pending().tags.is_empty());
}
