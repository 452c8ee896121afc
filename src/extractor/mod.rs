pub mod robot;

use serde::Serialize;

use crate::error::ExtractError;

/// The three import kinds the tree builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// Another test-definition file, fetched and expanded recursively.
    Resource,
    /// A keyword library, referenced by name only.
    Library,
    /// A variable file, referenced by name only.
    Variable,
}

/// Imports declared by a single file, grouped by kind in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependencies {
    pub resources: Vec<String>,
    pub libraries: Vec<String>,
    pub variables: Vec<String>,
}

impl Dependencies {
    pub fn push(&mut self, kind: ImportKind, name: String) {
        match kind {
            ImportKind::Resource => self.resources.push(name),
            ImportKind::Library => self.libraries.push(name),
            ImportKind::Variable => self.variables.push(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.libraries.is_empty() && self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resources.len() + self.libraries.len() + self.variables.len()
    }
}

/// Classifies the imports declared in a file's raw text.
pub trait ImportExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<Dependencies, ExtractError>;
}
