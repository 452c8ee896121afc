pub mod edge;
pub mod node;

use std::collections::HashMap;

use petgraph::Directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::tree::{DependencyNode, NodeKind};
use edge::EdgeKind;
use node::GraphNode;

/// The materialized dependency graph: a directed petgraph StableGraph with an
/// O(1) name lookup index.
///
/// Built once by [`build_graph`] and only read afterwards.
pub struct DependencyGraph {
    graph: StableGraph<GraphNode, EdgeKind, Directed>,
    index: HashMap<String, NodeIndex>,
}

/// Flatten a dependency tree into a graph.
///
/// Every tree node becomes (or merges into) the vertex carrying its name; the
/// kind is last-write-wins, except that back-references keep the kind of the
/// vertex they point at. Every parent-child pair becomes one edge, so a tree
/// with N distinct names and E relationships yields N vertices and E edges.
pub fn build_graph(root: &DependencyNode) -> DependencyGraph {
    let mut graph = DependencyGraph {
        graph: StableGraph::new(),
        index: HashMap::new(),
    };
    let root_idx = graph.upsert(&root.name, root.kind, true);
    graph.add_children(root_idx, root);
    graph
}

impl DependencyGraph {
    fn upsert(&mut self, name: &str, kind: NodeKind, overwrite: bool) -> NodeIndex {
        if let Some(&existing) = self.index.get(name) {
            if overwrite {
                self.graph[existing].kind = kind;
            }
            return existing;
        }
        let idx = self.graph.add_node(GraphNode {
            name: name.to_owned(),
            kind,
        });
        self.index.insert(name.to_owned(), idx);
        idx
    }

    fn add_children(&mut self, parent_idx: NodeIndex, parent: &DependencyNode) {
        for child in &parent.children {
            let child_idx = self.upsert(&child.name, child.kind, !child.back_reference);
            let kind = if child.back_reference {
                EdgeKind::BackReference
            } else {
                EdgeKind::Imports
            };
            self.graph.add_edge(parent_idx, child_idx, kind);
            self.add_children(child_idx, child);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vertices in first-seen (pre-order) order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Edges as `(from, to, kind)` in insertion order, duplicates included.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, EdgeKind)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
    }

    /// Count vertices per kind.
    pub fn nodes_by_kind(&self) -> HashMap<NodeKind, usize> {
        let mut map: HashMap<NodeKind, usize> = HashMap::new();
        for node in self.nodes() {
            *map.entry(node.kind).or_insert(0) += 1;
        }
        map
    }

    /// The underlying petgraph graph, for algorithms and renderers.
    pub fn inner(&self) -> &StableGraph<GraphNode, EdgeKind, Directed> {
        &self.graph
    }
}
