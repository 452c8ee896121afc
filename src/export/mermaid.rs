use std::collections::HashSet;
use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::export::dot::kind_fillcolor;
use crate::graph::DependencyGraph;
use crate::graph::edge::EdgeKind;
use crate::tree::NodeKind;

const KINDS: [NodeKind; 4] = [
    NodeKind::Root,
    NodeKind::Resource,
    NodeKind::Library,
    NodeKind::Variable,
];

/// Escape a string for safe use in Mermaid node labels (quotes inside labels break the syntax).
fn escape_mermaid_label(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

/// Render the dependency graph as a Mermaid flowchart.
pub fn render_mermaid(graph: &DependencyGraph, visible: &HashSet<NodeIndex>) -> String {
    let inner = graph.inner();
    let mut out = String::new();
    writeln!(out, "flowchart TB").unwrap();

    for kind in KINDS {
        writeln!(out, "    classDef {} fill:{}", kind, kind_fillcolor(kind)).unwrap();
    }

    for idx in inner.node_indices() {
        if !visible.contains(&idx) {
            continue;
        }
        let node = &inner[idx];
        writeln!(
            out,
            "    n{}[\"{}<br/>({})\"]:::{}",
            idx.index(),
            escape_mermaid_label(&node.name),
            node.kind,
            node.kind
        )
        .unwrap();
    }

    for edge in inner.edge_references() {
        let (src, tgt) = (edge.source(), edge.target());
        if !visible.contains(&src) || !visible.contains(&tgt) {
            continue;
        }
        let arrow = match edge.weight() {
            EdgeKind::Imports => "-->",
            EdgeKind::BackReference => "-.->",
        };
        writeln!(out, "    n{} {} n{}", src.index(), arrow, tgt.index()).unwrap();
    }

    out
}
