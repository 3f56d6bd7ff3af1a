//! Per-source layer contributions and memoized layer output.
//!
//! Every source (a style file, or one of the compiler-generated buckets)
//! contributes an ordered list of style nodes. Each layer's CSS text is built
//! from the nodes of all sources tagged with that layer and cached until a
//! contribution touching the layer changes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::SystemTime;

use strata_common::{Layer, SourceKey, StyleNode};

/// Cache state of one layer.
#[derive(Debug, Clone, Default)]
pub struct LayerMeta {
    css: Option<Arc<str>>,
    timestamp: Option<SystemTime>,
    builds: u64,
}

impl LayerMeta {
    /// The memoized CSS text, or `None` if the layer is dirty.
    pub fn cached_css(&self) -> Option<&Arc<str>> {
        self.css.as_ref()
    }

    /// When the layer was last invalidated by a contribution change.
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    /// How many times the layer's CSS was rebuilt since the last reset.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Returns `true` if the layer must be rebuilt before being read.
    pub fn is_dirty(&self) -> bool {
        self.css.is_none()
    }
}

/// Whether a contribution replaces or extends what a source contributed before.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// The new nodes are the source's entire contribution.
    Replace,
    /// The new nodes are added after the source's existing contribution.
    Append,
}

/// Returns the comment line that opens every built layer.
pub fn layer_banner(layer: Layer) -> String {
    format!("/* strata layer {layer} */\n")
}

/// Style nodes grouped by contributing source, with per-layer output caches.
#[derive(Debug)]
pub struct LayerStore<N> {
    contributions: BTreeMap<SourceKey, Vec<N>>,
    metas: [LayerMeta; 3],
}

impl<N> Default for LayerStore<N> {
    fn default() -> Self {
        Self {
            contributions: BTreeMap::new(),
            metas: Default::default(),
        }
    }
}

impl<N: StyleNode> LayerStore<N> {
    /// Creates an empty store with every layer dirty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a source's contribution and invalidates every layer it touches.
    ///
    /// The invalidated layers are those of the new nodes plus, in replace
    /// mode, those of the nodes being replaced. Returns the invalidated layers.
    pub fn update_layers(&mut self, nodes: Vec<N>, key: SourceKey, mode: UpdateMode) -> BTreeSet<Layer> {
        let mut changed: BTreeSet<Layer> = nodes.iter().map(StyleNode::layer).collect();
        match mode {
            UpdateMode::Replace => {
                if let Some(previous) = self.contributions.insert(key.clone(), nodes) {
                    changed.extend(previous.iter().map(StyleNode::layer));
                }
            }
            UpdateMode::Append => {
                self.contributions.entry(key.clone()).or_default().extend(nodes);
            }
        }

        let timestamp = SystemTime::now();
        for layer in &changed {
            let meta = &mut self.metas[layer.index()];
            meta.css = None;
            meta.timestamp = Some(timestamp);
        }
        if !changed.is_empty() {
            tracing::debug!(source = %key, ?mode, layers = ?changed, "layers invalidated");
        }
        changed
    }

    /// Returns the CSS text of one layer, rebuilding it if it is dirty.
    ///
    /// `render` receives the layer's nodes in contribution order (see
    /// [`SourceKey`]'s ordering) and produces the rule text; the store adds
    /// the layer banner and memoizes the result.
    pub fn build_layer_css<F>(&mut self, layer: Layer, render: F) -> Arc<str>
    where
        F: FnOnce(&[&N]) -> String,
    {
        if let Some(css) = &self.metas[layer.index()].css {
            return Arc::clone(css);
        }
        let nodes: Vec<&N> = self
            .contributions
            .values()
            .flatten()
            .filter(|node| node.layer() == layer)
            .collect();
        let body = render(&nodes);
        let css: Arc<str> = Arc::from(format!("{}{}", layer_banner(layer), body));

        let meta = &mut self.metas[layer.index()];
        meta.css = Some(Arc::clone(&css));
        meta.builds += 1;
        tracing::debug!(%layer, nodes = nodes.len(), bytes = css.len(), "layer rebuilt");
        css
    }

    /// Marks every layer dirty and clears its timestamp.
    pub fn invalidate_all(&mut self) {
        self.metas = Default::default();
    }

    /// Drops contributions after a reconfiguration and invalidates every layer.
    ///
    /// A full reset drops everything. Otherwise only the compiler-generated
    /// buckets are dropped, since their tokens are queued for recompilation;
    /// file contributions are kept.
    pub fn reset(&mut self, full: bool) {
        if full {
            self.contributions.clear();
        } else {
            self.contributions.retain(|key, _| !key.is_generated());
        }
        self.invalidate_all();
    }

    /// Returns the cache state of one layer.
    pub fn meta(&self, layer: Layer) -> &LayerMeta {
        &self.metas[layer.index()]
    }

    /// Returns what a source currently contributes.
    pub fn contribution(&self, key: &SourceKey) -> Option<&[N]> {
        self.contributions.get(key).map(Vec::as_slice)
    }

    /// Returns every contributing source, in emission order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceKey> {
        self.contributions.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Node(Layer, &'static str);

    impl StyleNode for Node {
        fn layer(&self) -> Layer {
            self.0
        }
    }

    fn render(nodes: &[&Node]) -> String {
        nodes.iter().map(|n| n.1).collect::<Vec<_>>().join("\n")
    }

    fn body(css: &str) -> &str {
        css.split_once('\n').map(|(_, rest)| rest).unwrap_or("")
    }

    #[test]
    fn empty_layer_is_banner_only() {
        let mut store: LayerStore<Node> = LayerStore::new();
        let css = store.build_layer_css(Layer::Base, render);
        assert_eq!(&*css, "/* strata layer base */\n");
    }

    #[test]
    fn build_filters_by_layer() {
        let mut store = LayerStore::new();
        store.update_layers(
            vec![Node(Layer::Utilities, ".p-4{}"), Node(Layer::Base, "h1{}")],
            SourceKey::GeneratedClasses,
            UpdateMode::Append,
        );
        let css = store.build_layer_css(Layer::Utilities, render);
        assert_eq!(body(&css), ".p-4{}");
        let css = store.build_layer_css(Layer::Base, render);
        assert_eq!(body(&css), "h1{}");
    }

    #[test]
    fn build_is_memoized_until_invalidated() {
        let mut store = LayerStore::new();
        store.update_layers(
            vec![Node(Layer::Utilities, ".a{}")],
            SourceKey::GeneratedClasses,
            UpdateMode::Append,
        );
        store.build_layer_css(Layer::Utilities, render);
        store.build_layer_css(Layer::Utilities, |_| panic!("must not rebuild"));
        assert_eq!(store.meta(Layer::Utilities).builds(), 1);

        store.update_layers(
            vec![Node(Layer::Utilities, ".b{}")],
            SourceKey::GeneratedClasses,
            UpdateMode::Append,
        );
        assert!(store.meta(Layer::Utilities).is_dirty());
        let css = store.build_layer_css(Layer::Utilities, render);
        assert_eq!(body(&css), ".a{}\n.b{}");
        assert_eq!(store.meta(Layer::Utilities).builds(), 2);
    }

    #[test]
    fn untouched_layers_stay_cached() {
        let mut store = LayerStore::new();
        store.build_layer_css(Layer::Base, render);
        let changed = store.update_layers(
            vec![Node(Layer::Utilities, ".a{}")],
            SourceKey::GeneratedClasses,
            UpdateMode::Append,
        );
        assert_eq!(changed, BTreeSet::from([Layer::Utilities]));
        assert!(!store.meta(Layer::Base).is_dirty());
        assert!(store.meta(Layer::Base).timestamp().is_none());
        assert!(store.meta(Layer::Utilities).timestamp().is_some());
    }

    #[test]
    fn replace_discards_previous_contribution() {
        let mut store = LayerStore::new();
        let key = SourceKey::source("main.css");
        store.update_layers(vec![Node(Layer::Components, ".btn-a{}")], key.clone(), UpdateMode::Replace);
        store.update_layers(vec![Node(Layer::Components, ".btn-b{}")], key.clone(), UpdateMode::Replace);
        let css = store.build_layer_css(Layer::Components, render);
        assert_eq!(body(&css), ".btn-b{}");
    }

    #[test]
    fn replace_invalidates_layers_of_removed_nodes() {
        let mut store = LayerStore::new();
        let key = SourceKey::source("main.css");
        store.update_layers(vec![Node(Layer::Base, "body{}")], key.clone(), UpdateMode::Replace);
        store.build_layer_css(Layer::Base, render);
        let changed = store.update_layers(vec![Node(Layer::Components, ".c{}")], key, UpdateMode::Replace);
        assert_eq!(changed, BTreeSet::from([Layer::Base, Layer::Components]));
        let css = store.build_layer_css(Layer::Base, render);
        assert_eq!(body(&css), "");
    }

    #[test]
    fn append_accumulates() {
        let mut store = LayerStore::new();
        store.update_layers(vec![Node(Layer::Utilities, ".a{}")], SourceKey::GeneratedClasses, UpdateMode::Append);
        store.update_layers(vec![Node(Layer::Utilities, ".b{}")], SourceKey::GeneratedClasses, UpdateMode::Append);
        assert_eq!(store.contribution(&SourceKey::GeneratedClasses).unwrap().len(), 2);
    }

    #[test]
    fn generated_output_precedes_files() {
        let mut store = LayerStore::new();
        store.update_layers(vec![Node(Layer::Base, "file")], SourceKey::source("a.css"), UpdateMode::Replace);
        store.update_layers(vec![Node(Layer::Base, "classes")], SourceKey::GeneratedClasses, UpdateMode::Append);
        store.update_layers(vec![Node(Layer::Base, "preflight")], SourceKey::GeneratedPreflights, UpdateMode::Append);
        let css = store.build_layer_css(Layer::Base, render);
        assert_eq!(body(&css), "preflight\nclasses\nfile");
    }

    #[test]
    fn soft_reset_keeps_file_contributions() {
        let mut store = LayerStore::new();
        store.update_layers(vec![Node(Layer::Base, "file")], SourceKey::source("a.css"), UpdateMode::Replace);
        store.update_layers(vec![Node(Layer::Base, "gen")], SourceKey::GeneratedClasses, UpdateMode::Append);
        store.build_layer_css(Layer::Base, render);
        store.reset(false);
        assert!(store.meta(Layer::Base).is_dirty());
        assert_eq!(store.meta(Layer::Base).builds(), 0);
        assert!(store.contribution(&SourceKey::GeneratedClasses).is_none());
        let css = store.build_layer_css(Layer::Base, render);
        assert_eq!(body(&css), "file");
    }

    #[test]
    fn full_reset_drops_everything() {
        let mut store = LayerStore::new();
        store.update_layers(vec![Node(Layer::Base, "file")], SourceKey::source("a.css"), UpdateMode::Replace);
        store.reset(true);
        assert_eq!(store.sources().count(), 0);
    }
}
