//! The opaque unit of compiled style.

use crate::layer::Layer;

/// A unit of compiled style produced by a style compiler.
///
/// The engine never looks inside a node. It only reads the layer the node
/// belongs to, in order to route it into the right output bucket and to
/// decide which cached layers a contribution invalidates.
pub trait StyleNode: Clone + Send + Sync + 'static {
    /// The layer this node is emitted into.
    fn layer(&self) -> Layer;
}
