use std::collections::HashMap;

use petgraph::Directed;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::Graph;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::graph::DependencyGraph;
use crate::tree::NodeKind;

/// A set of files forming an import cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCycle {
    /// Files forming the cycle, sorted by path.
    /// The first file is repeated at the end to close the visual cycle.
    pub files: Vec<String>,
}

/// Detect import cycles among the files of the dependency graph.
///
/// Runs Kosaraju's SCC algorithm on the subgraph of root and resource
/// vertices. Components with more than one file are cycles; a single file is
/// reported only when it imports itself.
///
/// Returns cycles sorted by their first file.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<ImportCycle> {
    let inner = graph.inner();

    // Step 1: file-only petgraph Graph (kosaraju_scc needs a compact graph).
    let mut file_graph: Graph<NodeIndex, (), Directed> = Graph::new();
    let mut orig_to_new: HashMap<NodeIndex, petgraph::graph::NodeIndex> = HashMap::new();
    let mut self_imports: Vec<NodeIndex> = Vec::new();

    for idx in inner.node_indices() {
        if matches!(inner[idx].kind, NodeKind::Root | NodeKind::Resource) {
            orig_to_new.insert(idx, file_graph.add_node(idx));
        }
    }

    for edge in inner.edge_references() {
        if let (Some(&src), Some(&dst)) =
            (orig_to_new.get(&edge.source()), orig_to_new.get(&edge.target()))
        {
            if edge.source() == edge.target() {
                self_imports.push(edge.source());
            }
            file_graph.add_edge(src, dst, ());
        }
    }

    // Step 2: strongly connected components.
    let sccs = kosaraju_scc(&file_graph);

    // Step 3: keep real cycles and sort for deterministic output.
    let mut cycles: Vec<ImportCycle> = sccs
        .into_iter()
        .filter_map(|scc| {
            let is_cycle = scc.len() > 1 || self_imports.contains(&file_graph[scc[0]]);
            if !is_cycle {
                return None;
            }
            let mut files: Vec<String> = scc
                .iter()
                .map(|&new_idx| inner[file_graph[new_idx]].name.clone())
                .collect();
            files.sort();
            let first = files[0].clone();
            files.push(first);
            Some(ImportCycle { files })
        })
        .collect();

    cycles.sort_by(|a, b| a.files[0].cmp(&b.files[0]));
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::tree::DependencyNode;

    fn node(name: &str, kind: NodeKind, children: Vec<DependencyNode>) -> DependencyNode {
        let mut n = DependencyNode::leaf(name, kind);
        n.children = children;
        n
    }

    #[test]
    fn test_two_file_cycle() {
        let tree = node(
            "a.robot",
            NodeKind::Root,
            vec![node(
                "b.resource",
                NodeKind::Resource,
                vec![DependencyNode::back_reference("a.robot")],
            )],
        );
        let cycles = find_cycles(&build_graph(&tree));
        assert_eq!(
            cycles,
            vec![ImportCycle {
                files: vec!["a.robot".into(), "b.resource".into(), "a.robot".into()]
            }]
        );
    }

    #[test]
    fn test_self_import() {
        let tree = node(
            "a.resource",
            NodeKind::Root,
            vec![DependencyNode::back_reference("a.resource")],
        );
        let cycles = find_cycles(&build_graph(&tree));
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].files, vec!["a.resource", "a.resource"]);
    }

    #[test]
    fn test_acyclic_tree_has_no_cycles() {
        let tree = node(
            "s.robot",
            NodeKind::Root,
            vec![
                DependencyNode::leaf("Collections", NodeKind::Library),
                node(
                    "x.resource",
                    NodeKind::Resource,
                    vec![DependencyNode::leaf("BuiltIn", NodeKind::Library)],
                ),
            ],
        );
        assert!(find_cycles(&build_graph(&tree)).is_empty());
    }

    #[test]
    fn test_cycles_sorted_by_first_file() {
        let tree = node(
            "s.robot",
            NodeKind::Root,
            vec![
                node(
                    "z.resource",
                    NodeKind::Resource,
                    vec![node(
                        "y.resource",
                        NodeKind::Resource,
                        vec![DependencyNode::back_reference("z.resource")],
                    )],
                ),
                node(
                    "b.resource",
                    NodeKind::Resource,
                    vec![node(
                        "c.resource",
                        NodeKind::Resource,
                        vec![DependencyNode::back_reference("b.resource")],
                    )],
                ),
            ],
        );
        let cycles = find_cycles(&build_graph(&tree));
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].files[0], "b.resource");
        assert_eq!(cycles[1].files[0], "y.resource");
    }
}
