use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{DependencyNode, NodeKind};
use crate::error::BuildError;
use crate::extractor::ImportExtractor;
use crate::resolver::{normalize_path, resolve_import_path};
use crate::source::FileSource;

/// File extensions whose content is handed to the import extractor.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".robot", ".resource"];

/// The chain of files currently being expanded, innermost first.
///
/// Each recursion level borrows its parent's link, so sibling subtrees expanded
/// on different workers share the common prefix without locking.
struct Ancestors<'a> {
    path: &'a str,
    parent: Option<&'a Ancestors<'a>>,
}

impl Ancestors<'_> {
    fn contains(&self, path: &str) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.path == path {
                return true;
            }
            link = current.parent;
        }
        false
    }
}

/// Recursively discovers the imports of a root file.
///
/// Only `Resource` imports are fetched and expanded; libraries and variable
/// files become leaves. Repository and branch stay fixed for the whole build.
pub struct TreeBuilder<'a> {
    source: &'a dyn FileSource,
    extractor: &'a dyn ImportExtractor,
    repository: String,
    branch: String,
    extensions: Vec<String>,
    pool: Option<ThreadPool>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        source: &'a dyn FileSource,
        extractor: &'a dyn ImportExtractor,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            source,
            extractor,
            repository: repository.into(),
            branch: branch.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            pool: None,
        }
    }

    /// Replace the list of extensions treated as test-definition files.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.to_ascii_lowercase())
            .collect();
        self
    }

    /// Expand the resource imports of each file on a pool of `jobs` workers.
    ///
    /// `jobs <= 1` keeps the build sequential. Child order is the same either way.
    pub fn with_jobs(mut self, jobs: usize) -> anyhow::Result<Self> {
        self.pool = if jobs > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .thread_name(|i| format!("robot-deps-fetch-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(self)
    }

    /// Build the dependency tree rooted at `root_path`.
    ///
    /// An absent root yields a single childless root node. Malformed imports or
    /// a fatal source failure anywhere abort the whole build.
    pub fn build_tree(&self, root_path: &str) -> Result<DependencyNode, BuildError> {
        let root_path = normalize_path(root_path);
        info!(
            "building dependency tree for {root_path} ({}@{})",
            self.repository, self.branch
        );
        let tree = match &self.pool {
            Some(pool) => pool.install(|| self.visit(&root_path, NodeKind::Root, None)),
            None => self.visit(&root_path, NodeKind::Root, None),
        }?;
        info!(
            "tree complete: {} nodes, depth {}",
            tree.node_count(),
            tree.depth()
        );
        Ok(tree)
    }

    fn visit(
        &self,
        path: &str,
        kind: NodeKind,
        ancestors: Option<&Ancestors<'_>>,
    ) -> Result<DependencyNode, BuildError> {
        let content = self
            .source
            .fetch(&self.repository, &self.branch, path)
            .map_err(|source| BuildError::Fetch {
                path: path.to_owned(),
                source,
            })?;

        let mut node = DependencyNode::leaf(path, kind);
        if content.is_empty() {
            debug!("{path}: no content, kept as leaf");
            return Ok(node);
        }
        if !self.is_definition_file(path) {
            debug!("{path}: not a test-definition file, imports not read");
            return Ok(node);
        }

        let deps = self
            .extractor
            .extract(&content)
            .map_err(|source| BuildError::Extract {
                path: path.to_owned(),
                source,
            })?;
        if deps.is_empty() {
            debug!("{path}: no imports");
            return Ok(node);
        }
        debug!(
            "{path}: {} libraries, {} variables, {} resources",
            deps.libraries.len(),
            deps.variables.len(),
            deps.resources.len()
        );

        node.children.reserve(deps.len());
        node.children.extend(
            deps.libraries
                .into_iter()
                .map(|name| DependencyNode::leaf(name, NodeKind::Library)),
        );
        node.children.extend(
            deps.variables
                .into_iter()
                .map(|name| DependencyNode::leaf(name, NodeKind::Variable)),
        );

        let chain = Ancestors {
            path,
            parent: ancestors,
        };
        let resolved: Vec<String> = deps
            .resources
            .iter()
            .filter_map(|raw| {
                let child = resolve_import_path(path, raw);
                if child.is_empty() {
                    warn!("{path}: resource import '{raw}' names a directory, skipped");
                    None
                } else {
                    Some(child)
                }
            })
            .collect();

        let resources: Vec<DependencyNode> = if self.pool.is_some() && resolved.len() > 1 {
            resolved
                .par_iter()
                .map(|child| self.visit_resource(child, &chain))
                .collect::<Result<_, _>>()?
        } else {
            resolved
                .iter()
                .map(|child| self.visit_resource(child, &chain))
                .collect::<Result<_, _>>()?
        };
        node.children.extend(resources);

        Ok(node)
    }

    fn visit_resource(
        &self,
        path: &str,
        chain: &Ancestors<'_>,
    ) -> Result<DependencyNode, BuildError> {
        if chain.contains(path) {
            warn!("import cycle: {} imports {path} again", chain.path);
            return Ok(DependencyNode::back_reference(path));
        }
        self.visit(path, NodeKind::Resource, Some(chain))
    }

    fn is_definition_file(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, SourceError};
    use crate::extractor::robot::RobotImportExtractor;
    use crate::source::memory::MemorySource;

    fn build(source: &MemorySource, root: &str) -> Result<DependencyNode, BuildError> {
        TreeBuilder::new(source, &RobotImportExtractor, "qa/suites", "main").build_tree(root)
    }

    fn names(node: &DependencyNode) -> Vec<(&str, NodeKind)> {
        node.children
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect()
    }

    #[test]
    fn test_suite_with_library_and_resource() {
        let source = MemorySource::new()
            .with_file(
                "suite.robot",
                "*** Settings ***\nResource    ./common.resource\nLibrary    Collections\n",
            )
            .with_file("common.resource", "*** Keywords ***\nNoop\n    No Operation\n");

        let tree = build(&source, "suite.robot").unwrap();
        assert_eq!(tree.name, "suite.robot");
        assert_eq!(tree.kind, NodeKind::Root);
        assert_eq!(
            names(&tree),
            vec![
                ("Collections", NodeKind::Library),
                ("common.resource", NodeKind::Resource)
            ]
        );
        assert!(tree.children[1].children.is_empty());
    }

    #[test]
    fn test_children_ordered_libraries_variables_resources() {
        let source = MemorySource::new().with_file(
            "s.robot",
            "*** Settings ***\n\
             Resource    b.resource\n\
             Variables    v1.py\n\
             Library    L1\n\
             Resource    a.resource\n\
             Library    L2\n\
             Variables    v2.yaml\n",
        );
        let tree = build(&source, "s.robot").unwrap();
        assert_eq!(
            names(&tree),
            vec![
                ("L1", NodeKind::Library),
                ("L2", NodeKind::Library),
                ("v1.py", NodeKind::Variable),
                ("v2.yaml", NodeKind::Variable),
                ("b.resource", NodeKind::Resource),
                ("a.resource", NodeKind::Resource),
            ]
        );
    }

    #[test]
    fn test_absent_root_is_single_leaf() {
        let source = MemorySource::new();
        let tree = build(&source, "missing.robot").unwrap();
        assert_eq!(tree, DependencyNode::leaf("missing.robot", NodeKind::Root));
    }

    #[test]
    fn test_absent_resource_is_leaf() {
        let source = MemorySource::new()
            .with_file("s.robot", "*** Settings ***\nResource    ./gone.resource\n");
        let tree = build(&source, "s.robot").unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "gone.resource");
        assert_eq!(tree.children[0].kind, NodeKind::Resource);
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn test_libraries_and_variables_are_never_fetched() {
        let source = MemorySource::new()
            .with_file(
                "dir/s.robot",
                "*** Settings ***\nLibrary    ./libs/custom.resource\nVariables    ../vars.resource\n",
            )
            .with_file("dir/libs/custom.resource", "*** Settings ***\nLibrary    X\n");
        let tree = build(&source, "dir/s.robot").unwrap();
        assert_eq!(source.fetched(), vec!["dir/s.robot"]);
        // Leaf names stay raw, unresolved.
        assert_eq!(
            names(&tree),
            vec![
                ("./libs/custom.resource", NodeKind::Library),
                ("../vars.resource", NodeKind::Variable)
            ]
        );
    }

    #[test]
    fn test_resources_resolved_against_importing_file() {
        let source = MemorySource::new()
            .with_file(
                "tests/web/login.robot",
                "*** Settings ***\nResource    ../../keywords/auth.resource\n",
            )
            .with_file(
                "keywords/auth.resource",
                "*** Settings ***\nResource    ./common/http.resource\n",
            )
            .with_file("keywords/common/http.resource", "*** Settings ***\nLibrary    RequestsLibrary\n");

        let tree = build(&source, "tests/web/login.robot").unwrap();
        let auth = &tree.children[0];
        assert_eq!(auth.name, "keywords/auth.resource");
        let http = &auth.children[0];
        assert_eq!(http.name, "keywords/common/http.resource");
        assert_eq!(http.kind, NodeKind::Resource);
        assert_eq!(names(http), vec![("RequestsLibrary", NodeKind::Library)]);
    }

    #[test]
    fn test_import_resolving_to_repository_root_is_skipped() {
        let source = MemorySource::new().with_file(
            "suite.robot",
            "*** Settings ***\nResource    ./\nResource    ${CURDIR}\nResource    .\nResource    kw.resource\n",
        );
        let tree = build(&source, "suite.robot").unwrap();
        assert_eq!(names(&tree), vec![("kw.resource", NodeKind::Resource)]);
        assert_eq!(source.fetch_count(""), 0);
    }

    #[test]
    fn test_root_path_is_normalized() {
        let source =
            MemorySource::new().with_file("a/s.robot", "*** Settings ***\nLibrary    X\n");
        let tree = build(&source, "./a//s.robot").unwrap();
        assert_eq!(tree.name, "a/s.robot");
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_non_definition_file_is_not_parsed() {
        let source = MemorySource::new()
            .with_file("s.robot", "*** Settings ***\nResource    notes.txt\n")
            .with_file("notes.txt", "*** Settings ***\nLibrary    Hidden\n");
        let tree = build(&source, "s.robot").unwrap();
        assert_eq!(tree.children[0].name, "notes.txt");
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn test_custom_extensions() {
        let source = MemorySource::new()
            .with_file("s.robot", "*** Settings ***\nResource    notes.txt\n")
            .with_file("notes.txt", "*** Settings ***\nLibrary    Shown\n");
        let tree = TreeBuilder::new(&source, &RobotImportExtractor, "r", "b")
            .with_extensions(vec![".robot".into(), ".TXT".into()])
            .build_tree("s.robot")
            .unwrap();
        assert_eq!(names(&tree.children[0]), vec![("Shown", NodeKind::Library)]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let source = MemorySource::new()
            .with_file(
                "s.robot",
                "*** Settings ***\nResource    a.resource\nResource    b.resource\nLibrary    L\n",
            )
            .with_file("a.resource", "*** Settings ***\nResource    b.resource\n")
            .with_file("b.resource", "*** Settings ***\nVariables    v.py\n");
        let first = build(&source, "s.robot").unwrap();
        let second = build(&source, "s.robot").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_diamond_imports_are_expanded_on_each_branch() {
        let source = MemorySource::new()
            .with_file(
                "s.robot",
                "*** Settings ***\nResource    a.resource\nResource    b.resource\n",
            )
            .with_file("a.resource", "*** Settings ***\nResource    shared.resource\n")
            .with_file("b.resource", "*** Settings ***\nResource    shared.resource\n")
            .with_file("shared.resource", "*** Settings ***\nLibrary    L\n");
        let tree = build(&source, "s.robot").unwrap();
        assert_eq!(tree.node_count(), 7);
        assert_eq!(source.fetch_count("shared.resource"), 2);
        assert!(tree.iter().all(|n| !n.back_reference));
    }

    #[test]
    fn test_cycle_recorded_as_back_reference() {
        let source = MemorySource::new()
            .with_file("a.resource", "*** Settings ***\nResource    b.resource\n")
            .with_file("b.resource", "*** Settings ***\nResource    a.resource\n");
        let tree = build(&source, "a.resource").unwrap();

        let b = &tree.children[0];
        assert_eq!(b.name, "b.resource");
        assert!(!b.back_reference);
        let back = &b.children[0];
        assert_eq!(back.name, "a.resource");
        assert_eq!(back.kind, NodeKind::Resource);
        assert!(back.back_reference);
        assert!(back.children.is_empty());
        assert_eq!(source.fetch_count("a.resource"), 1);
    }

    #[test]
    fn test_self_import_is_back_reference() {
        let source = MemorySource::new()
            .with_file("a.resource", "*** Settings ***\nResource    ./a.resource\n");
        let tree = build(&source, "a.resource").unwrap();
        assert_eq!(tree.children, vec![DependencyNode::back_reference("a.resource")]);
    }

    #[test]
    fn test_malformed_imports_abort_the_build() {
        let source = MemorySource::new()
            .with_file("s.robot", "*** Settings ***\nResource    ok.resource\n")
            .with_file("ok.resource", "*** Settings ***\nLibrary\n");
        let err = build(&source, "s.robot").unwrap_err();
        assert_eq!(err.path(), "ok.resource");
        match err {
            BuildError::Extract { source, .. } => assert_eq!(
                source,
                ExtractError::MissingImportName {
                    line: 2,
                    setting: "Library".into()
                }
            ),
            other => panic!("expected Extract error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_credentials_abort_the_build() {
        let source = MemorySource::new()
            .with_file("s.robot", "*** Settings ***\nResource    locked.resource\n")
            .with_rejected("locked.resource");
        let err = build(&source, "s.robot").unwrap_err();
        assert!(matches!(
            err,
            BuildError::Fetch {
                source: SourceError::Unauthorized { status: 401 },
                ..
            }
        ));
    }

    #[test]
    fn test_worker_pool_preserves_child_order() {
        let mut source = MemorySource::new();
        let mut settings = String::from("*** Settings ***\n");
        for i in 0..16 {
            settings.push_str(&format!("Resource    r{i}.resource\n"));
            source = source.with_file(
                &format!("r{i}.resource"),
                &format!("*** Settings ***\nLibrary    Lib{i}\n"),
            );
        }
        source = source.with_file("s.robot", &settings);

        let sequential = build(&source, "s.robot").unwrap();
        let parallel = TreeBuilder::new(&source, &RobotImportExtractor, "qa/suites", "main")
            .with_jobs(4)
            .unwrap()
            .build_tree("s.robot")
            .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.children[7].name, "r7.resource");
    }
}
