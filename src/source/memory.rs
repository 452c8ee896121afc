use std::collections::HashMap;
use std::sync::Mutex;

use super::FileSource;
use crate::error::SourceError;

/// In-memory repository for tests. Records every fetched path.
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
    unauthorized: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_owned(), content.to_owned());
        self
    }

    /// Make fetching `path` fail as if the credentials were rejected.
    pub fn with_rejected(mut self, path: &str) -> Self {
        self.unauthorized.push(path.to_owned());
        self
    }

    /// Paths fetched so far, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetched.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

impl FileSource for MemorySource {
    fn fetch(&self, _repository: &str, _branch: &str, path: &str) -> Result<String, SourceError> {
        self.fetched.lock().unwrap().push(path.to_owned());
        if self.unauthorized.iter().any(|p| p == path) {
            return Err(SourceError::Unauthorized { status: 401 });
        }
        Ok(self.files.get(path).cloned().unwrap_or_default())
    }
}
