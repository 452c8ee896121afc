use serde::Serialize;

use crate::graph::{DependencyGraph, edge::EdgeKind};
use crate::tree::{DependencyNode, NodeKind};

/// Aggregated statistics over a dependency tree and its graph.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DependencyStats {
    pub root: String,
    pub tree_nodes: usize,
    pub tree_depth: usize,
    pub vertices: usize,
    pub edges: usize,
    pub resources: usize,
    pub libraries: usize,
    pub variables: usize,
    /// Imports that point back at a file already being expanded.
    pub back_references: usize,
}

/// Compute statistics from a finished tree and the graph built from it.
pub fn dependency_stats(tree: &DependencyNode, graph: &DependencyGraph) -> DependencyStats {
    let breakdown = graph.nodes_by_kind();
    let back_references = tree.iter().filter(|n| n.back_reference).count();
    debug_assert_eq!(
        back_references,
        graph
            .edges()
            .filter(|(_, _, kind)| *kind == EdgeKind::BackReference)
            .count()
    );

    DependencyStats {
        root: tree.name.clone(),
        tree_nodes: tree.node_count(),
        tree_depth: tree.depth(),
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
        resources: *breakdown.get(&NodeKind::Resource).unwrap_or(&0),
        libraries: *breakdown.get(&NodeKind::Library).unwrap_or(&0),
        variables: *breakdown.get(&NodeKind::Variable).unwrap_or(&0),
        back_references,
    }
}
