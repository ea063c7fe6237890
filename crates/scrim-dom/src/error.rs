#![forbid(unsafe_code)]

use crate::node::NodeId;

/// Structural failure reported by [`crate::Document`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The id names a node that was destroyed (or never existed).
    #[error("node {0} is stale or was destroyed")]
    StaleNode(NodeId),
    /// Inserting `child` under `parent` would make a node its own ancestor.
    #[error("cannot insert {child} under {parent}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// The document root and body cannot be removed or destroyed.
    #[error("node {0} is a protected document node")]
    ProtectedNode(NodeId),
}

/// Result alias for document operations.
pub type Result<T> = std::result::Result<T, DomError>;
