use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::FileSource;
use crate::error::SourceError;

/// Reads repository files from a local checkout.
///
/// The checkout already pins a repository and a branch, so both arguments of
/// [`FileSource::fetch`] are ignored here.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSource for LocalSource {
    fn fetch(&self, _repository: &str, _branch: &str, path: &str) -> Result<String, SourceError> {
        if path.is_empty() || path.split('/').any(|segment| segment == "..") {
            warn!("{path}: outside of {}", self.root.display());
            return Ok(String::new());
        }

        let full = self.root.join(path);
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(content),
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    warn!("{path}: not found under {}", self.root.display());
                    Ok(String::new())
                }
                ErrorKind::InvalidData => {
                    warn!("{path}: not valid UTF-8");
                    Ok(String::new())
                }
                _ if full.is_dir() => {
                    debug!("{path}: is a directory");
                    Ok(String::new())
                }
                _ => Err(SourceError::Io { path: full, source: err }),
            },
        }
    }
}
