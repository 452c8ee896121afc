//! Repository path resolution for resource imports.
//!
//! Paths handled here are remote repository paths: always `/`-separated,
//! relative to the repository root, never carrying a leading `./` or `/`.
//! Nothing in this module touches the local filesystem.

/// Robot Framework's built-in variable for the directory of the current file.
const CURDIR: &str = "${CURDIR}";

/// Resolve a raw resource import declared in `current` to a repository path.
///
/// Imports whose first segment is `.` or `..` are resolved against the
/// directory containing `current`. Anything else is taken as a path from the
/// repository root. Both are normalized.
pub fn resolve_import_path(current: &str, raw: &str) -> String {
    let raw = raw.trim().replace('\\', "/");
    let raw = expand_curdir(&raw);

    if is_relative(&raw) {
        let dir = parent_dir(current);
        if dir.is_empty() {
            normalize_path(&raw)
        } else {
            normalize_path(&format!("{dir}/{raw}"))
        }
    } else {
        normalize_path(&raw)
    }
}

/// True when the first segment of `raw` is `.` or `..`.
pub fn is_relative(raw: &str) -> bool {
    matches!(raw.split('/').next(), Some(".") | Some(".."))
}

/// Collapse `.`, empty and `..` segments of a `/`-separated path.
///
/// `..` segments that would climb above the repository root are kept, so the
/// result still names the file the import asked for (and will fail to fetch).
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Directory part of a repository path, `""` for files at the root.
fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// `${CURDIR}/x` means `./x`; a bare `${CURDIR}` means `.`.
fn expand_curdir(raw: &str) -> String {
    match raw.strip_prefix(CURDIR) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => format!(".{rest}"),
        _ => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_import_resolves_against_current_directory() {
        assert_eq!(
            resolve_import_path("a/b/c.suite", "./d.resource"),
            "a/b/d.resource"
        );
    }

    #[test]
    fn test_parent_import_climbs_one_directory() {
        assert_eq!(
            resolve_import_path("a/b/c.suite", "../d.resource"),
            "a/d.resource"
        );
    }

    #[test]
    fn test_non_relative_import_is_left_untouched() {
        assert_eq!(
            resolve_import_path("a/b/c.suite", "x/y.resource"),
            "x/y.resource"
        );
    }

    #[test]
    fn test_non_relative_import_is_still_normalized() {
        assert_eq!(
            resolve_import_path("a/b/c.suite", "x/./z/../y.resource"),
            "x/y.resource"
        );
        assert_eq!(resolve_import_path("a/b/c.suite", "/x/y.resource"), "x/y.resource");
    }

    #[test]
    fn test_relative_import_from_repository_root() {
        assert_eq!(
            resolve_import_path("suite.robot", "./common.resource"),
            "common.resource"
        );
        assert_eq!(
            resolve_import_path("suite.robot", "./keywords/login.resource"),
            "keywords/login.resource"
        );
    }

    #[test]
    fn test_multiple_parent_segments() {
        assert_eq!(
            resolve_import_path("a/b/c/d.robot", "../../shared/e.resource"),
            "a/shared/e.resource"
        );
        assert_eq!(
            resolve_import_path("a/b/c.robot", ".././../e.resource"),
            "e.resource"
        );
    }

    #[test]
    fn test_climbing_above_root_keeps_parent_segments() {
        assert_eq!(
            resolve_import_path("a/c.robot", "../../e.resource"),
            "../e.resource"
        );
    }

    #[test]
    fn test_backslashes_are_repository_separators() {
        assert_eq!(
            resolve_import_path("a/b/c.robot", "..\\shared\\e.resource"),
            "a/shared/e.resource"
        );
    }

    #[test]
    fn test_curdir_variable_is_current_directory() {
        assert_eq!(
            resolve_import_path("a/b/c.robot", "${CURDIR}/d.resource"),
            "a/b/d.resource"
        );
        assert_eq!(
            resolve_import_path("a/b/c.robot", "${CURDIR}/../d.resource"),
            "a/d.resource"
        );
    }

    #[test]
    fn test_dot_prefixed_name_is_not_relative() {
        // `.hidden` is a directory name, not a relative marker.
        assert!(!is_relative(".hidden/x.resource"));
        assert_eq!(
            resolve_import_path("a/b/c.robot", ".hidden/x.resource"),
            ".hidden/x.resource"
        );
    }

    #[test]
    fn test_no_leading_dot_slash_in_result() {
        let resolved = resolve_import_path("c.robot", "./././d.resource");
        assert_eq!(resolved, "d.resource");
        assert!(!resolved.starts_with("./"));
    }

    #[test]
    fn test_normalize_collapses_empty_segments() {
        assert_eq!(normalize_path("a//b///c.robot"), "a/b/c.robot");
        assert_eq!(normalize_path("./a/b/"), "a/b");
    }
}
