use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::{Dependencies, ImportExtractor, ImportKind};
use crate::error::ExtractError;

/// Reads the `*** Settings ***` section of Robot Framework `.robot` and
/// `.resource` files and classifies its `Resource`, `Library` and `Variables`
/// imports.
///
/// Both the space-separated format (cells split by two or more spaces or a
/// tab) and the pipe-separated format (`| Resource | x.resource |`) are
/// understood. Only the first argument of an import is kept: library
/// arguments, `AS`/`WITH NAME` aliases and variable-file arguments are
/// dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct RobotImportExtractor;

static SEPARATOR: OnceLock<Regex> = OnceLock::new();

fn separator() -> &'static Regex {
    SEPARATOR.get_or_init(|| Regex::new(r"\t+| {2,}|\u{a0}{2,}").expect("invalid separator regex"))
}

/// An import setting whose value is expected on a `...` continuation row.
struct Pending<'a> {
    kind: ImportKind,
    setting: &'a str,
    line: usize,
}

impl Pending<'_> {
    fn into_error(self) -> ExtractError {
        ExtractError::MissingImportName {
            line: self.line,
            setting: self.setting.trim().to_owned(),
        }
    }
}

impl ImportExtractor for RobotImportExtractor {
    fn extract(&self, content: &str) -> Result<Dependencies, ExtractError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut deps = Dependencies::default();
        let mut in_settings = false;
        let mut pending: Option<Pending<'_>> = None;

        for (idx, line) in content.lines().enumerate() {
            let cells = split_cells(line);
            let Some(first) = cells.first() else {
                continue;
            };

            if let Some(rest) = continuation(&cells) {
                if let Some(waiting) = pending.take() {
                    match rest.first().map(|c| c.trim()).filter(|c| !c.is_empty()) {
                        Some(name) => {
                            trace!("line {}: {:?} import {} (continued)", idx + 1, waiting.kind, name);
                            deps.push(waiting.kind, name.to_owned());
                        }
                        None => pending = Some(waiting),
                    }
                }
                continue;
            }
            if let Some(waiting) = pending.take() {
                return Err(waiting.into_error());
            }

            if let Some(header) = section_header(first) {
                in_settings = matches!(header.as_str(), "settings" | "setting");
                continue;
            }
            if !in_settings || first.is_empty() {
                continue;
            }

            let Some(kind) = import_kind(first) else {
                continue;
            };
            let name = cells.get(1).map(|c| c.trim()).unwrap_or_default();
            if name.is_empty() {
                pending = Some(Pending {
                    kind,
                    setting: *first,
                    line: idx + 1,
                });
                continue;
            }
            trace!("line {}: {:?} import {}", idx + 1, kind, name);
            deps.push(kind, name.to_owned());
        }

        match pending {
            Some(waiting) => Err(waiting.into_error()),
            None => Ok(deps),
        }
    }
}

/// Cells after the `...` marker when `cells` is a continuation row, indented
/// or not.
fn continuation<'c, 'a>(cells: &'c [&'a str]) -> Option<&'c [&'a str]> {
    match cells {
        ["...", rest @ ..] => Some(rest),
        ["", "...", rest @ ..] => Some(rest),
        _ => None,
    }
}

/// Split a row into cells, dropping trailing comment cells.
///
/// An indented row yields an empty first cell.
fn split_cells(line: &str) -> Vec<&str> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut cells: Vec<&str> = if line.starts_with("| ") || line == "|" {
        let inner = line.strip_prefix('|').unwrap_or(line).trim();
        let inner = inner.strip_suffix('|').unwrap_or(inner).trim_end();
        inner.split(" | ").map(str::trim).collect()
    } else {
        separator().split(line).collect()
    };

    if let Some(pos) = cells.iter().position(|c| c.starts_with('#')) {
        cells.truncate(pos);
    }
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

/// Lowercased section name when `cell` is a `*** Name ***` header.
fn section_header(cell: &str) -> Option<String> {
    if !cell.starts_with('*') {
        return None;
    }
    let name = cell.trim_matches(|c: char| c == '*' || c.is_whitespace());
    Some(name.to_lowercase())
}

/// Setting names are case- and space-insensitive; a trailing colon is allowed.
fn import_kind(setting: &str) -> Option<ImportKind> {
    let normalized: String = setting
        .trim_end_matches(':')
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    match normalized.as_str() {
        "resource" => Some(ImportKind::Resource),
        "library" => Some(ImportKind::Library),
        "variables" => Some(ImportKind::Variable),
        _ => None,
    }
}
