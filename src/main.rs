mod cli;
mod config;
mod error;
mod export;
mod extractor;
mod graph;
mod query;
mod resolver;
mod source;
mod tree;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SourceArgs};
use config::{DepsConfig, Settings, SourceSettings};
use export::model::{ExportFormat, ExportParams};
use extractor::robot::RobotImportExtractor;
use graph::build_graph;
use source::FileSource;
use source::gitlab::GitLabSource;
use source::local::LocalSource;
use tree::{DependencyNode, TreeBuilder};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tree { source, format } => {
            let tree = build_tree(&cli.config, &source)?;
            print!("{}", query::output::format_tree(&tree, &format));
        }

        Commands::Export {
            source,
            format,
            hide,
            output,
        } => {
            let tree = build_tree(&cli.config, &source)?;
            let graph = build_graph(&tree);
            let result = export::export_graph(&graph, &ExportParams { format, hide })?;
            for warning in &result.warnings {
                warn!("{}", warning);
            }

            match output {
                Some(path) => {
                    let path = with_default_extension(path, format);
                    std::fs::write(&path, &result.content)
                        .with_context(|| format!("unable to save {}", path.display()))?;
                    eprintln!(
                        "Exported {} nodes, {} edges to {}",
                        result.node_count,
                        result.edge_count,
                        path.display()
                    );
                }
                None => print!("{}", result.content),
            }
        }

        Commands::Stats { source, format } => {
            let tree = build_tree(&cli.config, &source)?;
            let graph = build_graph(&tree);
            let stats = query::stats::dependency_stats(&tree, &graph);
            print!("{}", query::output::format_stats(&stats, &format));
        }

        Commands::Cycles { source, format } => {
            let tree = build_tree(&cli.config, &source)?;
            let graph = build_graph(&tree);
            let cycles = query::circular::find_cycles(&graph);
            print!("{}", query::output::format_cycles(&cycles, &format));
            if !cycles.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Route `tracing` output to stderr so stdout carries only command output.
fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("robot_deps={level}"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load settings, connect to the configured source and build the tree.
fn build_tree(config_path: &Path, args: &SourceArgs) -> Result<DependencyNode> {
    let config = DepsConfig::load(config_path)?;
    let settings = Settings::resolve(config, args)?;

    let source: Box<dyn FileSource> = match &settings.source {
        SourceSettings::GitLab {
            url,
            token,
            timeout,
        } => {
            let gitlab = GitLabSource::new(url, token.clone(), *timeout)?;
            gitlab
                .authenticate()
                .with_context(|| format!("unable to connect to {url}"))?;
            info!("connected to {url}");
            Box::new(gitlab)
        }
        SourceSettings::Local { root } => {
            let local = LocalSource::new(root);
            info!("reading files from {}", local.root().display());
            Box::new(local)
        }
    };

    let builder = TreeBuilder::new(
        &*source,
        &RobotImportExtractor,
        settings.repository.as_str(),
        settings.branch.as_str(),
    )
    .with_extensions(settings.extensions.clone())
    .with_jobs(settings.jobs)?;

    builder.build_tree(&settings.root_file).map_err(|err| {
        warn!("inventory aborted while processing {}", err.path());
        anyhow::Error::new(err)
            .context(format!("no dependency report produced for {}", settings.root_file))
    })
}

/// Append the format's conventional extension when `path` has none.
fn with_default_extension(path: PathBuf, format: ExportFormat) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format.extension())
    }
}
