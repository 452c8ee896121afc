use std::io::IsTerminal;

use crate::cli::OutputFormat;
use crate::query::circular::ImportCycle;
use crate::query::stats::DependencyStats;
use crate::tree::DependencyNode;

/// Render the dependency tree according to the selected output format.
///
/// The table lists one row per tree node in pre-order with its depth, so
/// repeated names stay distinguishable by position.
pub fn format_tree(tree: &DependencyNode, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Compact => tree.render(),

        OutputFormat::Table => {
            let mut rows: Vec<(usize, &DependencyNode)> = Vec::new();
            collect_rows(tree, 0, &mut rows);
            let kind_w = rows
                .iter()
                .map(|(_, n)| n.kind.as_str().len())
                .max()
                .unwrap_or(4)
                .max(4);
            let use_color = std::io::stdout().is_terminal();

            let mut out = String::new();
            let header = format!("{:<5}  {:<kind_w$}  {}", "DEPTH", "KIND", "NAME");
            if use_color {
                out.push_str(&format!("\x1b[1m{header}\x1b[0m\n"));
            } else {
                out.push_str(&format!("{header}\n"));
            }
            out.push_str(&format!("{}\n", "-".repeat(header.len())));
            for (depth, node) in rows {
                let marker = if node.back_reference { " ↺" } else { "" };
                out.push_str(&format!(
                    "{:<5}  {:<kind_w$}  {}{}\n",
                    depth,
                    node.kind.as_str(),
                    node.name,
                    marker
                ));
            }
            out
        }

        OutputFormat::Json => format!(
            "{}\n",
            serde_json::to_string_pretty(tree).unwrap_or_default()
        ),
    }
}

fn collect_rows<'a>(node: &'a DependencyNode, depth: usize, rows: &mut Vec<(usize, &'a DependencyNode)>) {
    rows.push((depth, node));
    for child in &node.children {
        collect_rows(child, depth + 1, rows);
    }
}

/// Render import cycles according to the selected output format.
pub fn format_cycles(cycles: &[ImportCycle], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Compact | OutputFormat::Table => {
            let mut out = String::new();
            for cycle in cycles {
                out.push_str("cycle ");
                out.push_str(&cycle.files.join(" -> "));
                out.push('\n');
            }
            out.push_str(&format!("{} cycles found\n", cycles.len()));
            out
        }

        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = cycles
                .iter()
                .map(|c| serde_json::json!({ "files": c.files }))
                .collect();
            format!("{}\n", serde_json::to_string_pretty(&json).unwrap_or_default())
        }
    }
}

/// Render dependency statistics according to the selected output format.
pub fn format_stats(stats: &DependencyStats, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Compact => format!(
            "root {}\n\
             vertices {} ({} resources, {} libraries, {} variables)\n\
             edges {} ({} back-references)\n\
             tree {} nodes, depth {}\n",
            stats.root,
            stats.vertices,
            stats.resources,
            stats.libraries,
            stats.variables,
            stats.edges,
            stats.back_references,
            stats.tree_nodes,
            stats.tree_depth,
        ),

        OutputFormat::Table => {
            let rows: [(&str, String); 9] = [
                ("root", stats.root.clone()),
                ("vertices", stats.vertices.to_string()),
                ("resources", stats.resources.to_string()),
                ("libraries", stats.libraries.to_string()),
                ("variables", stats.variables.to_string()),
                ("edges", stats.edges.to_string()),
                ("back-references", stats.back_references.to_string()),
                ("tree nodes", stats.tree_nodes.to_string()),
                ("tree depth", stats.tree_depth.to_string()),
            ];
            let key_w = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(6).max(6);
            let use_color = std::io::stdout().is_terminal();

            let mut out = String::new();
            if use_color {
                out.push_str(&format!("\x1b[1m{:<key_w$}  {}\x1b[0m\n", "METRIC", "VALUE"));
            } else {
                out.push_str(&format!("{:<key_w$}  {}\n", "METRIC", "VALUE"));
            }
            out.push_str(&format!("{}\n", "-".repeat(key_w + 8)));
            for (key, value) in rows {
                out.push_str(&format!("{:<key_w$}  {}\n", key, value));
            }
            out
        }

        OutputFormat::Json => format!(
            "{}\n",
            serde_json::to_string_pretty(stats).unwrap_or_default()
        ),
    }
}
