use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::graph::edge::EdgeKind;
use crate::tree::NodeKind;

#[derive(Serialize)]
struct JsonGraph<'a> {
    nodes: Vec<JsonNode<'a>>,
    edges: Vec<JsonEdge<'a>>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    name: &'a str,
    kind: NodeKind,
}

#[derive(Serialize)]
struct JsonEdge<'a> {
    from: &'a str,
    to: &'a str,
    kind: EdgeKind,
}

/// Pretty-printed `{ "nodes": [...], "edges": [...] }` document.
pub fn render_json(graph: &DependencyGraph, visible: &HashSet<NodeIndex>) -> anyhow::Result<String> {
    let inner = graph.inner();

    let nodes = inner
        .node_indices()
        .filter(|idx| visible.contains(idx))
        .map(|idx| JsonNode {
            name: &inner[idx].name,
            kind: inner[idx].kind,
        })
        .collect();
    let edges = inner
        .edge_references()
        .filter(|e| visible.contains(&e.source()) && visible.contains(&e.target()))
        .map(|e| JsonEdge {
            from: &inner[e.source()].name,
            to: &inner[e.target()].name,
            kind: *e.weight(),
        })
        .collect();

    let mut content = serde_json::to_string_pretty(&JsonGraph { nodes, edges })?;
    content.push('\n');
    Ok(content)
}
