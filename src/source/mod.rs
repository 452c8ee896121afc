pub mod gitlab;
pub mod local;

#[cfg(test)]
pub mod memory;

use crate::error::SourceError;

/// Read-only access to the files of a remote repository.
///
/// Implementations must report a missing or unreadable file as `Ok` with an
/// empty string. `Err` is reserved for failures that make the whole inventory
/// untrustworthy, such as rejected credentials.
///
/// Sources are `Send + Sync` so the tree builder can expand sibling imports on
/// a worker pool.
pub trait FileSource: Send + Sync {
    /// Return the raw text of `path` in `repository` at `branch`.
    fn fetch(&self, repository: &str, branch: &str, path: &str) -> Result<String, SourceError>;
}
