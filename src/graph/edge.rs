use serde::Serialize;

/// The kind of directed edge between two vertices of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Parent file -> imported resource, library or variable file.
    Imports,
    /// Parent file -> a resource already being expanded higher up the chain.
    /// These are the edges that close import cycles.
    BackReference,
}
