use crate::tree::NodeKind;

/// Output format for graph export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Vertex names, one per line (default).
    Text,
    /// Graphviz DOT format. Suitable for large graphs and tooling.
    Dot,
    /// Mermaid flowchart format. Best for small-to-medium graphs in markdown.
    Mermaid,
    /// `{ "nodes": [...], "edges": [...] }` for programmatic consumption.
    Json,
}

impl ExportFormat {
    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Dot => "dot",
            ExportFormat::Mermaid => "mmd",
            ExportFormat::Json => "json",
        }
    }
}

/// Parameters controlling a graph export operation.
pub struct ExportParams {
    pub format: ExportFormat,
    /// Vertices of these kinds (and their edges) are left out.
    pub hide: Vec<NodeKind>,
}

/// Result of a graph export operation.
pub struct ExportResult {
    /// The rendered graph content.
    pub content: String,
    /// Number of exported vertices.
    pub node_count: usize,
    /// Number of exported edges.
    pub edge_count: usize,
    /// Advisory warnings (e.g. scale guard messages) for the caller to report.
    pub warnings: Vec<String>,
}
