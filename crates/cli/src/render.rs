//! Text and JSON renderings of a driver tree.

use drivertree_engine::format::{format_value, FormatOptions};
use drivertree_engine::visibility::{display_rows, VisibleRow};
use drivertree_engine::{ComputeKind, NodeTree, Status};
use serde::Serialize;

/// Width of the indented name column in table output.
const NAME_WIDTH: usize = 34;
/// Width of each value column in table output.
const VALUE_WIDTH: usize = 14;

/// One row of `--json` output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowJson {
    pub id: String,
    pub name: String,
    pub depth: usize,
    pub value: f64,
    pub display: String,
    pub target_value: f64,
    pub target_display: String,
    pub status: Status,
    pub compute_kind: ComputeKind,
    pub pinned: bool,
    pub collapsed: bool,
    pub branch: bool,
}

/// Rows in display order; collapsed branches are skipped unless `all`.
pub fn rows(tree: &NodeTree, all: bool) -> Vec<VisibleRow<'_>> {
    display_rows(tree, all)
}

pub fn rows_json(rows: &[VisibleRow<'_>], opts: &FormatOptions) -> Vec<RowJson> {
    rows.iter()
        .map(|row| {
            let node = row.node;
            RowJson {
                id: node.id.to_string(),
                name: node.name.clone(),
                depth: row.depth,
                value: node.value,
                display: format_value(node.value, node.value_kind, opts),
                target_value: node.target_value,
                target_display: format_value(node.target_value, node.value_kind, opts),
                status: node.status(),
                compute_kind: node.compute_kind,
                pinned: node.pinned,
                collapsed: node.collapsed,
                branch: row.is_branch,
            }
        })
        .collect()
}

/// Indented table, one line per row.
///
/// ```text
/// ▾ ARR                                       $930        $1,000  at risk
///     Starting                                $800          $800  on track  [pinned]
/// ```
pub fn render_table(rows: &[VisibleRow<'_>], opts: &FormatOptions) -> String {
    let mut out = String::new();
    for row in rows {
        let node = row.node;
        let marker = match (row.is_branch, node.collapsed) {
            (true, true) => "▸ ",
            (true, false) => "▾ ",
            (false, _) => "  ",
        };
        let label = format!("{}{}{}", "  ".repeat(row.depth), marker, node.name);
        let label = truncate(&label, NAME_WIDTH);

        let mut line = format!(
            "{:<name_w$}{:>val_w$}{:>val_w$}  {}",
            label,
            format_value(node.value, node.value_kind, opts),
            format_value(node.target_value, node.value_kind, opts),
            node.status(),
            name_w = NAME_WIDTH,
            val_w = VALUE_WIDTH,
        );
        if node.pinned {
            line.push_str("  [pinned]");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivertree_engine::TreeNode;

    fn tree() -> NodeTree {
        NodeTree::new(vec![
            TreeNode::sum("arr", None, 930.0).with_name("ARR").with_target(1000.0),
            TreeNode::input("start", Some("arr"), 800.0).with_name("Starting").with_pinned(true),
            TreeNode::sum("net", Some("arr"), 130.0).with_name("Net new").with_order(1).with_collapsed(true),
            TreeNode::input("new", Some("net"), 250.0).with_name("New"),
            TreeNode::input("churn", Some("net"), -120.0).with_name("Churn").with_order(1),
        ])
    }

    #[test]
    fn test_table_hides_collapsed() {
        let t = tree();
        let table = render_table(&rows(&t, false), &FormatOptions::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("▾ ARR"));
        assert!(lines[0].contains("$930"));
        assert!(lines[0].contains("$1,000"));
        assert!(lines[0].ends_with("at risk"));
        assert!(lines[1].ends_with("[pinned]"));
        assert!(lines[2].contains("▸ Net new"));
    }

    #[test]
    fn test_table_all_rows() {
        let t = tree();
        let table = render_table(&rows(&t, true), &FormatOptions::default());
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("-$120"));
    }

    #[test]
    fn test_rows_json_shape() {
        let t = tree();
        let json = serde_json::to_value(rows_json(&rows(&t, true), &FormatOptions::default())).unwrap();
        let first = &json[0];
        assert_eq!(first["id"], "arr");
        assert_eq!(first["status"], "at_risk");
        assert_eq!(first["display"], "$930");
        assert_eq!(first["computeKind"], "sum");
        assert_eq!(first["branch"], true);
        assert_eq!(json[4]["depth"], 2);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
