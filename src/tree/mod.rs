pub mod builder;

use std::fmt::Write;

use serde::Serialize;

pub use builder::TreeBuilder;

/// What a node of the dependency tree stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The entry file of a build. Exactly one per tree.
    Root,
    /// A test-definition file reached through a `Resource` import.
    Resource,
    /// A keyword library, referenced by name.
    Library,
    /// A variable file, referenced by name.
    Variable,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Resource => "resource",
            NodeKind::Library => "library",
            NodeKind::Variable => "variable",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the dependency tree. Children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// Repository path for root/resource nodes, raw identifier otherwise.
    pub name: String,
    pub kind: NodeKind,
    /// Set on a resource that is already being expanded higher up the import
    /// chain. Such a node is never fetched and has no children.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub back_reference: bool,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    /// A childless node.
    pub fn leaf(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            back_reference: false,
            children: Vec::new(),
        }
    }

    /// A resource that closes an import cycle.
    pub fn back_reference(name: impl Into<String>) -> Self {
        Self {
            back_reference: true,
            ..Self::leaf(name, NodeKind::Resource)
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DependencyNode::node_count).sum::<usize>()
    }

    /// Number of parent-child relationships in this subtree.
    pub fn edge_count(&self) -> usize {
        self.node_count() - 1
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Indented text rendering, one node per line.
    ///
    /// ```text
    /// suite.robot (root)
    /// ├── Collections (library)
    /// └── common.resource (resource)
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.label()).unwrap();
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let last_idx = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (branch, indent) = if i == last_idx {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            writeln!(out, "{prefix}{branch}{}", child.label()).unwrap();
            child.render_children(&format!("{prefix}{indent}"), out);
        }
    }

    fn label(&self) -> String {
        if self.back_reference {
            format!("{} ({}) ↺", self.name, self.kind)
        } else {
            format!("{} ({})", self.name, self.kind)
        }
    }
}

/// Pre-order walk over a [`DependencyNode`] subtree, children in order.
pub struct PreOrder<'a> {
    stack: Vec<&'a DependencyNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
