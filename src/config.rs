use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use tracing::debug;

use crate::cli::SourceArgs;
use crate::tree::builder::DEFAULT_EXTENSIONS;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "robot-deps.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration loaded from `robot-deps.toml`.
///
/// Every field is optional here; [`Settings::resolve`] merges command-line
/// overrides and reports what is still missing.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DepsConfig {
    /// Base URL of the GitLab instance, e.g. `https://gitlab.example.com`.
    pub gitlab_url: Option<String>,
    /// Personal or project access token.
    pub private_token: Option<String>,
    /// Project path (`group/project`) or numeric project ID.
    pub project_path: Option<String>,
    /// Branch, tag or commit to read files from.
    pub branch_name: Option<String>,
    /// Repository path of the root suite.
    pub file_path: Option<String>,
    /// Extensions whose imports are read. Defaults to `.robot` and `.resource`.
    pub extensions: Option<Vec<String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Number of concurrent fetch workers. 1 keeps the build sequential.
    pub jobs: Option<usize>,
}

impl DepsConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the default (empty) configuration. A file that
    /// exists but cannot be read or parsed is an error: guessing connection
    /// settings would only produce a misleading inventory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str::<Self>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Where files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
    GitLab {
        url: String,
        token: Option<String>,
        timeout: Duration,
    },
    Local {
        root: PathBuf,
    },
}

/// Fully resolved settings for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source: SourceSettings,
    /// Repository reference handed to the source (GitLab project path).
    pub repository: String,
    pub branch: String,
    pub root_file: String,
    pub extensions: Vec<String>,
    pub jobs: usize,
}

impl Settings {
    /// Merge command-line overrides over the file configuration.
    pub fn resolve(config: DepsConfig, args: &SourceArgs) -> anyhow::Result<Self> {
        let root_file = args
            .file
            .clone()
            .or(config.file_path)
            .context("no root file: set `file_path` in the config or pass --file")?;

        let source = if let Some(root) = &args.local {
            SourceSettings::Local { root: root.clone() }
        } else {
            let url = args
                .gitlab_url
                .clone()
                .or(config.gitlab_url)
                .context("no GitLab URL: set `gitlab_url` in the config or pass --gitlab-url")?;
            let timeout = args
                .timeout
                .or(config.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS);
            SourceSettings::GitLab {
                url,
                token: args.token.clone().or(config.private_token),
                timeout: Duration::from_secs(timeout),
            }
        };

        let repository = args.project.clone().or(config.project_path);
        let repository = match (&source, repository) {
            (_, Some(project)) => project,
            (SourceSettings::Local { .. }, None) => String::new(),
            (SourceSettings::GitLab { .. }, None) => {
                bail!("no GitLab project: set `project_path` in the config or pass --project")
            }
        };

        let extensions = config
            .extensions
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect());

        Ok(Self {
            source,
            repository,
            branch: args
                .branch
                .clone()
                .or(config.branch_name)
                .unwrap_or_else(|| "main".to_owned()),
            root_file,
            extensions,
            jobs: args.jobs.or(config.jobs).unwrap_or(1).max(1),
        })
    }
}
