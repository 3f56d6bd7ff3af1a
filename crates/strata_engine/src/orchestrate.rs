//! Full scans and CSS generation requests.

use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt, Shared};
use strata_common::Layer;
use strata_extract::{classify, SourceKind};

use crate::compiler::StyleCompiler;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::source::SourceProvider;

pub(crate) type ScanFuture = Shared<BoxFuture<'static, Result<ScanSummary, EngineError>>>;

/// What a full scan processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Text sources extracted.
    pub text: usize,
    /// Style sources transformed.
    pub styles: usize,
    /// Discovered identifiers that were excluded or of an unknown kind.
    pub skipped: usize,
}

impl<C: StyleCompiler> Engine<C> {
    /// Produces the CSS for one layer, or for all layers in order.
    ///
    /// Initializes the engine if needed, runs the startup scan once when
    /// configured, and compiles pending tokens first. The all-layers form is
    /// `base`, `components`, `utilities` joined by newlines and trimmed.
    #[tracing::instrument(skip(self))]
    pub async fn generate_css(&self, layer: Option<Layer>) -> Result<String, EngineError> {
        let session = self.session().await?;
        if session.config.scan.enabled && session.config.scan.run_on_startup {
            self.scan().await?;
        }

        loop {
            let session = self.build_current().await?;
            let css = match layer {
                Some(layer) => self.layer_css(&session, layer).to_string(),
                None => Layer::ALL
                    .iter()
                    .map(|&layer| self.layer_css(&session, layer))
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string(),
            };
            // A reset between the build and the render leaves the output short.
            if self.inner.state.lock().generation == session.generation {
                return Ok(css);
            }
        }
    }

    /// Extracts every source the provider discovers.
    ///
    /// Runs at most once per engine: concurrent callers share the scan in
    /// flight and later callers get its recorded outcome. Without a source
    /// provider the scan is an empty success.
    ///
    /// The scan runs as its own Tokio task, so it finishes even if every
    /// caller stops waiting for it. Must be called within a Tokio runtime.
    pub async fn scan(&self) -> Result<ScanSummary, EngineError> {
        let flight = {
            let mut slot = self.inner.scan.lock();
            match &*slot {
                Some(flight) => flight.clone(),
                None => {
                    let task = tokio::spawn(self.clone().run_scan());
                    let flight = async move {
                        match task.await {
                            Ok(result) => result,
                            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                            Err(_) => Err(EngineError::Cancelled),
                        }
                    }
                    .boxed()
                    .shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// Returns `true` once a scan has been started.
    pub fn scan_started(&self) -> bool {
        self.inner.scan.lock().is_some()
    }

    async fn run_scan(self) -> Result<ScanSummary, EngineError> {
        let session = self.session().await?;
        let Some(sources) = self.inner.options.sources.clone() else {
            tracing::debug!("no source provider; nothing to scan");
            return Ok(ScanSummary::default());
        };

        let ids = sources.discover(&session.config).await?;
        let mut summary = ScanSummary::default();
        let mut jobs = Vec::new();
        for id in ids {
            match classify(&id, &session.config.scan) {
                Some(kind) => {
                    match kind {
                        SourceKind::Text => summary.text += 1,
                        SourceKind::Style => summary.styles += 1,
                    }
                    jobs.push(self.scan_source(Arc::clone(&sources), id, kind));
                }
                None => summary.skipped += 1,
            }
        }
        try_join_all(jobs).await?;
        tracing::info!(
            text = summary.text,
            styles = summary.styles,
            skipped = summary.skipped,
            "scan complete"
        );
        Ok(summary)
    }

    async fn scan_source(
        &self,
        sources: Arc<dyn SourceProvider>,
        id: String,
        kind: SourceKind,
    ) -> Result<(), EngineError> {
        let code = sources.read(&id).await?;
        match kind {
            SourceKind::Style => {
                self.transform_css(&code, &id).await?;
            }
            SourceKind::Text => {
                self.extract_file(&code, Some(&id), true).await?;
            }
        }
        Ok(())
    }

    /// The compiler's completion list, memoized until the next cache reset.
    pub async fn completions(&self) -> Result<Arc<[String]>, EngineError> {
        let session = self.session().await?;
        let cached = self.inner.state.lock().completions.clone();
        if let Some(list) = cached {
            return Ok(list);
        }
        let list: Arc<[String]> = session.compiler.completions().await?.into();
        let mut state = self.inner.state.lock();
        if state.generation == session.generation {
            state.completions = Some(Arc::clone(&list));
        }
        Ok(list)
    }
}
