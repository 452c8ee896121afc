use std::collections::HashSet;
use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::DependencyGraph;
use crate::graph::edge::EdgeKind;
use crate::tree::NodeKind;

/// DOT fillcolor for a node kind.
pub fn kind_fillcolor(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Root => "skyblue",
        NodeKind::Resource => "orange",
        NodeKind::Library => "lightgreen",
        NodeKind::Variable => "lightcoral",
    }
}

/// DOT edge style attributes for a given EdgeKind.
fn edge_style(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Imports => "style=solid",
        EdgeKind::BackReference => "style=dashed color=red constraint=false",
    }
}

/// Escape a string for use inside a double-quoted DOT label.
fn escape_dot_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the dependency graph as DOT format.
///
/// Node IDs are `n<index>`; labels carry the name and kind on two lines.
pub fn render_dot(graph: &DependencyGraph, visible: &HashSet<NodeIndex>) -> String {
    let inner = graph.inner();
    let mut out = String::new();
    writeln!(out, "digraph robot_dependencies {{").unwrap();
    writeln!(out, "    rankdir=TB;").unwrap();
    writeln!(out, "    node [shape=box style=filled fontname=monospace];").unwrap();

    for idx in inner.node_indices() {
        if !visible.contains(&idx) {
            continue;
        }
        let node = &inner[idx];
        writeln!(
            out,
            "    n{} [label=\"{}\\n({})\" fillcolor=\"{}\"];",
            idx.index(),
            escape_dot_label(&node.name),
            node.kind,
            kind_fillcolor(node.kind)
        )
        .unwrap();
    }

    for edge in inner.edge_references() {
        let (src, tgt) = (edge.source(), edge.target());
        if !visible.contains(&src) || !visible.contains(&tgt) {
            continue;
        }
        writeln!(
            out,
            "    n{} -> n{} [{}];",
            src.index(),
            tgt.index(),
            edge_style(*edge.weight())
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}
