use serde::Serialize;

use crate::tree::NodeKind;

/// A vertex of the dependency graph: one per distinct node name in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Repository path for files, raw identifier for libraries and variables.
    pub name: String,
    /// Kind of the last tree node that wrote this vertex.
    pub kind: NodeKind,
}
