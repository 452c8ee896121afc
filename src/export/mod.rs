pub mod dot;
pub mod json;
pub mod mermaid;
pub mod model;
pub mod text;

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::DependencyGraph;

use model::{ExportFormat, ExportParams, ExportResult};

/// Mermaid renderers struggle past this many edges.
const MERMAID_EDGE_LIMIT: usize = 500;

/// Export the dependency graph in the requested format.
///
/// Steps:
/// 1. Build the set of visible vertices (dropping hidden kinds).
/// 2. Count visible vertices and edges.
/// 3. Check scale guards and collect warnings if thresholds are exceeded.
/// 4. Dispatch to the renderer.
pub fn export_graph(graph: &DependencyGraph, params: &ExportParams) -> anyhow::Result<ExportResult> {
    let visible = visible_nodes(graph, params);
    let (node_count, edge_count) = count_nodes_edges(graph, &visible);

    let mut warnings: Vec<String> = Vec::new();
    if params.format == ExportFormat::Mermaid && edge_count > MERMAID_EDGE_LIMIT {
        let msg = format!(
            "Large graph: {} edges may render poorly in Mermaid. Consider --format dot.",
            edge_count
        );
        warnings.push(msg);
    }

    let content = match params.format {
        ExportFormat::Text => text::render_text(graph, &visible),
        ExportFormat::Dot => dot::render_dot(graph, &visible),
        ExportFormat::Mermaid => mermaid::render_mermaid(graph, &visible),
        ExportFormat::Json => json::render_json(graph, &visible)?,
    };

    Ok(ExportResult {
        content,
        node_count,
        edge_count,
        warnings,
    })
}

fn visible_nodes(graph: &DependencyGraph, params: &ExportParams) -> HashSet<NodeIndex> {
    let inner = graph.inner();
    inner
        .node_indices()
        .filter(|&idx| !params.hide.contains(&inner[idx].kind))
        .collect()
}

fn count_nodes_edges(graph: &DependencyGraph, visible: &HashSet<NodeIndex>) -> (usize, usize) {
    let edges = graph
        .inner()
        .edge_references()
        .filter(|e| visible.contains(&e.source()) && visible.contains(&e.target()))
        .count();
    (visible.len(), edges)
}
