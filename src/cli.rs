use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::CONFIG_FILE_NAME;
use crate::export::model::ExportFormat;
use crate::tree::NodeKind;

/// Inventory the dependencies of Robot Framework suites stored in GitLab.
///
/// robot-deps starts from a root suite, follows its `Resource` imports
/// recursively, and reports every resource file, library and variable file
/// involved as a tree or a graph.
#[derive(Parser, Debug)]
#[command(
    name = "robot-deps",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for tree, stats and cycle reports.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact human-readable format (default).
    #[default]
    Compact,
    /// Columnar table with optional ANSI bold headers when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

/// Where to read files from. Each flag overrides the matching config key.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// GitLab base URL (config: gitlab_url).
    #[arg(long)]
    pub gitlab_url: Option<String>,

    /// GitLab private token (config: private_token).
    #[arg(long, env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitLab project path or ID (config: project_path).
    #[arg(long)]
    pub project: Option<String>,

    /// Branch, tag or commit (config: branch_name).
    #[arg(long)]
    pub branch: Option<String>,

    /// Repository path of the root suite (config: file_path).
    #[arg(long)]
    pub file: Option<String>,

    /// Read files from a local checkout instead of GitLab.
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// Per-request timeout in seconds (config: timeout_secs).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Concurrent fetch workers; 1 is sequential (config: jobs).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dependency tree of the root suite.
    Tree {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format: indented tree, one row per node, or JSON.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Export the dependency graph as text, DOT, Mermaid or JSON.
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Export format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,

        /// Leave out vertices of these kinds (comma-separated: root,resource,library,variable).
        #[arg(long, value_enum, value_delimiter = ',')]
        hide: Vec<NodeKind>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Vertex counts per kind, edges, back-references and tree depth.
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Detect import cycles between resource files.
    ///
    /// Uses Kosaraju's SCC algorithm on the file-level graph. Exits with
    /// status 1 when at least one cycle is found.
    Cycles {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },
}
