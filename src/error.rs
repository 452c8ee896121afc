use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`FileSource`](crate::source::FileSource).
///
/// A missing or unreadable file is *not* one of these: sources report absence
/// as empty content. These variants are reserved for conditions that make the
/// whole inventory untrustworthy.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The GitLab base URL cannot carry API path segments.
    #[error("invalid GitLab URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The server rejected the private token.
    #[error("GitLab rejected the private token (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The HTTP client could not be created or a request failed outright.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A local file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures raised by an [`ImportExtractor`](crate::extractor::ImportExtractor)
/// when a file's settings cannot be classified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// An import setting (`Resource`, `Library`, `Variables`) carries no value.
    #[error("line {line}: setting '{setting}' requires a value")]
    MissingImportName { line: usize, setting: String },
}

/// A fatal failure while building the dependency tree. No partial tree is
/// produced when one of these is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to fetch '{path}'")]
    Fetch {
        path: String,
        #[source]
        source: SourceError,
    },

    #[error("malformed imports in '{path}'")]
    Extract {
        path: String,
        #[source]
        source: ExtractError,
    },
}

impl BuildError {
    /// Repository path of the file that aborted the build.
    pub fn path(&self) -> &str {
        match self {
            BuildError::Fetch { path, .. } | BuildError::Extract { path, .. } => path,
        }
    }
}
