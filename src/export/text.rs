use std::collections::HashSet;
use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;

use crate::graph::DependencyGraph;

/// Vertex names, one per line, in first-seen order.
pub fn render_text(graph: &DependencyGraph, visible: &HashSet<NodeIndex>) -> String {
    let inner = graph.inner();
    let mut out = String::new();
    for idx in inner.node_indices() {
        if visible.contains(&idx) {
            writeln!(out, "{}", inner[idx].name).unwrap();
        }
    }
    out
}
