//! Collapse-aware visibility.
//!
//! A node is visible iff no strict ancestor is collapsed. A node's own
//! `collapsed` flag only hides its descendants. Both queries are recomputed
//! from the full collection; they run on the render path, not the edit path.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::node::{NodeId, TreeNode};
use crate::tree::NodeTree;

/// Ids of every node not hidden behind a collapsed ancestor.
pub fn compute_visible(tree: &NodeTree) -> FxHashSet<NodeId> {
    let lookup: FxHashMap<&str, &TreeNode> = tree.iter().map(|n| (n.id.as_str(), n)).collect();

    tree.iter()
        .filter(|node| !has_collapsed_ancestor(node, &lookup))
        .map(|node| node.id.clone())
        .collect()
}

fn has_collapsed_ancestor(node: &TreeNode, lookup: &FxHashMap<&str, &TreeNode>) -> bool {
    let mut cursor = node.parent_id.as_ref();
    let mut steps = 0;
    while let Some(parent_id) = cursor {
        let Some(parent) = lookup.get(parent_id.as_str()) else {
            return false;
        };
        if parent.collapsed {
            return true;
        }
        steps += 1;
        if steps > lookup.len() {
            return false;
        }
        cursor = parent.parent_id.as_ref();
    }
    false
}

/// Ids of nodes with at least one child, i.e. those that can be collapsed.
pub fn branch_node_ids(tree: &NodeTree) -> FxHashSet<NodeId> {
    tree.iter()
        .filter(|n| tree.has_children(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}

/// A visible node with its display depth.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
    pub is_branch: bool,
}

/// Visible nodes in depth-first display order, children by `order`.
pub fn visible_rows(tree: &NodeTree) -> Vec<VisibleRow<'_>> {
    display_rows(tree, false)
}

/// Depth-first display order. Membership comes from `compute_visible` and
/// the branch flag from `branch_node_ids`; with `include_hidden` every node
/// is listed.
///
/// Walks start at nodes whose parent does not resolve (the root, then any
/// dangling subtrees) in load order, so those subtrees sit at depth 0.
pub fn display_rows(tree: &NodeTree, include_hidden: bool) -> Vec<VisibleRow<'_>> {
    let visible = compute_visible(tree);
    let branches = branch_node_ids(tree);

    let (tops, rest): (Vec<&TreeNode>, Vec<&TreeNode>) =
        tree.iter().partition(|n| tree.parent_of(n.id.as_str()).is_none());

    let mut rows = Vec::new();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    // Nodes in a malformed cycle are reachable from no top; list them last
    for start in tops.into_iter().chain(rest) {
        let mut stack = vec![(start, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            let id = node.id.as_str();
            if !seen.insert(id) {
                continue;
            }
            // A hidden node's descendants are hidden as well
            if !include_hidden && !visible.contains(id) {
                continue;
            }
            rows.push(VisibleRow { node, depth, is_branch: branches.contains(id) });
            stack.extend(tree.children(id).into_iter().rev().map(|c| (c, depth + 1)));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> NodeTree {
        NodeTree::new(vec![
            TreeNode::sum("root", None, 0.0),
            TreeNode::sum("a", Some("root"), 0.0),
            TreeNode::input("b", Some("root"), 0.0).with_order(1),
            TreeNode::input("c", Some("a"), 0.0),
            TreeNode::sum("d", Some("a"), 0.0).with_order(1),
            TreeNode::input("e", Some("d"), 0.0),
        ])
    }

    fn ids(set: &FxHashSet<NodeId>) -> Vec<&str> {
        let mut v: Vec<&str> = set.iter().map(NodeId::as_str).collect();
        v.sort();
        v
    }

    #[test]
    fn test_everything_visible_when_expanded() {
        assert_eq!(compute_visible(&tree()).len(), 6);
    }

    #[test]
    fn test_collapse_hides_descendants_not_self() {
        let t = tree().with_node("a", |n| n.collapsed = true).unwrap();
        assert_eq!(ids(&compute_visible(&t)), vec!["a", "b", "root"]);
    }

    #[test]
    fn test_collapsed_root_shows_only_root() {
        let t = tree().with_node("root", |n| n.collapsed = true).unwrap();
        assert_eq!(ids(&compute_visible(&t)), vec!["root"]);
    }

    #[test]
    fn test_collapsing_a_leaf_changes_nothing() {
        let before = compute_visible(&tree());
        let t = tree().with_node("e", |n| n.collapsed = true).unwrap();
        assert_eq!(compute_visible(&t), before);
    }

    #[test]
    fn test_nested_collapse() {
        let t = tree().with_node("d", |n| n.collapsed = true).unwrap();
        assert_eq!(ids(&compute_visible(&t)), vec!["a", "b", "c", "d", "root"]);
    }

    #[test]
    fn test_dangling_parent_counts_as_visible() {
        let t = NodeTree::new(vec![TreeNode::input("x", Some("ghost"), 0.0)]);
        assert_eq!(ids(&compute_visible(&t)), vec!["x"]);
    }

    #[test]
    fn test_branch_node_ids() {
        assert_eq!(ids(&branch_node_ids(&tree())), vec!["a", "d", "root"]);
    }

    #[test]
    fn test_visible_rows_order() {
        let t = tree().with_node("d", |n| n.collapsed = true).unwrap();
        let rows: Vec<(&str, usize)> = visible_rows(&t)
            .iter()
            .map(|r| (r.node.id.as_str(), r.depth))
            .collect();
        assert_eq!(rows, vec![("root", 0), ("a", 1), ("c", 2), ("d", 2), ("b", 1)]);
        assert!(visible_rows(&t)[3].is_branch);
    }

    #[test]
    fn test_display_rows_include_hidden() {
        let t = tree().with_node("a", |n| n.collapsed = true).unwrap();
        assert_eq!(visible_rows(&t).len(), 3);
        let ids: Vec<&str> = display_rows(&t, true).iter().map(|r| r.node.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "c", "d", "e", "b"]);
    }

    #[test]
    fn test_rows_agree_with_compute_visible() {
        let t = NodeTree::new(vec![
            TreeNode::sum("root", None, 0.0),
            TreeNode::sum("a", Some("root"), 0.0).with_collapsed(true),
            TreeNode::input("c", Some("a"), 0.0),
            TreeNode::sum("orphan", Some("ghost"), 0.0),
            TreeNode::input("o1", Some("orphan"), 0.0),
        ]);

        let rows = visible_rows(&t);
        let listed: Vec<(&str, usize)> =
            rows.iter().map(|r| (r.node.id.as_str(), r.depth)).collect();
        assert_eq!(listed, vec![("root", 0), ("a", 1), ("orphan", 0), ("o1", 1)]);

        let mut row_ids: Vec<&str> = rows.iter().map(|r| r.node.id.as_str()).collect();
        row_ids.sort();
        assert_eq!(row_ids, ids(&compute_visible(&t)));

        let branches = branch_node_ids(&t);
        for row in &rows {
            assert_eq!(row.is_branch, branches.contains(row.node.id.as_str()));
        }
    }

    #[test]
    fn test_cyclic_nodes_still_listed_once() {
        let t = NodeTree::new(vec![
            TreeNode::sum("x", Some("y"), 0.0),
            TreeNode::sum("y", Some("x"), 0.0),
        ]);
        let rows = display_rows(&t, true);
        assert_eq!(rows.len(), 2);
    }
}
