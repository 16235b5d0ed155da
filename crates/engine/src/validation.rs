//! Boundary checks for node collections.
//!
//! Field constraints and tree shape are enforced here, before a collection
//! reaches the engine. `recalculate` and friends assume valid input and only
//! degrade gracefully on structural anomalies.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::TreeError;
use crate::node::TreeNode;

/// Maximum number of nodes in one tree.
pub const MAX_NODES: usize = 200;
/// Maximum length of `id` and `parentId`, in characters.
pub const MAX_ID_LEN: usize = 100;
/// Maximum length of `name`, in characters.
pub const MAX_NAME_LEN: usize = 200;
/// Largest allowed sibling `order`.
pub const MAX_ORDER: u32 = 1000;

/// Field-level checks for a single node.
pub fn validate_node(node: &TreeNode) -> Vec<TreeError> {
    let mut errors = Vec::new();
    let id = node.id.as_str();

    check_len(&mut errors, id, "id", id, MAX_ID_LEN);
    if let Some(parent) = &node.parent_id {
        check_len(&mut errors, id, "parentId", parent.as_str(), MAX_ID_LEN);
    }
    check_len(&mut errors, id, "name", &node.name, MAX_NAME_LEN);

    if !node.value.is_finite() {
        errors.push(TreeError::NonFinite { id: id.to_string(), field: "value" });
    }
    if !node.target_value.is_finite() {
        errors.push(TreeError::NonFinite { id: id.to_string(), field: "targetValue" });
    }
    if node.order > MAX_ORDER {
        errors.push(TreeError::OrderOutOfRange {
            id: id.to_string(),
            order: node.order,
            max: MAX_ORDER,
        });
    }

    errors
}

fn check_len(errors: &mut Vec<TreeError>, id: &str, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len == 0 || len > max {
        errors.push(TreeError::FieldLength { id: id.to_string(), field, len, max });
    }
}

/// All field and shape violations in a collection, in discovery order.
///
/// An empty result means the collection is a single-rooted, acyclic tree
/// whose nodes satisfy every field constraint.
pub fn validate_nodes(nodes: &[TreeNode]) -> Vec<TreeError> {
    let mut errors = Vec::new();

    if nodes.len() > MAX_NODES {
        errors.push(TreeError::TooManyNodes { count: nodes.len(), max: MAX_NODES });
    }

    for node in nodes {
        errors.extend(validate_node(node));
    }

    let mut seen = FxHashSet::default();
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            errors.push(TreeError::DuplicateId(node.id.to_string()));
        }
    }

    let roots: Vec<String> = nodes
        .iter()
        .filter(|n| n.is_root())
        .map(|n| n.id.to_string())
        .collect();
    match roots.len() {
        0 if !nodes.is_empty() => errors.push(TreeError::MissingRoot),
        0 | 1 => {}
        _ => errors.push(TreeError::MultipleRoots(roots)),
    }

    let parents: FxHashMap<&str, Option<&str>> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.parent_id.as_ref().map(|p| p.as_str())))
        .collect();

    for node in nodes {
        if let Some(parent) = &node.parent_id {
            if !parents.contains_key(parent.as_str()) {
                errors.push(TreeError::DanglingParent {
                    id: node.id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
    }

    errors.extend(find_cycles(nodes, &parents));
    errors
}

/// Report one node per parent-chain cycle.
///
/// Every node has at most one parent, so walking up from each unvisited
/// node either reaches a finished node, leaves the tree, or re-enters the
/// current walk, which is a cycle.
fn find_cycles(nodes: &[TreeNode], parents: &FxHashMap<&str, Option<&str>>) -> Vec<TreeError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Active(usize),
        Done,
    }

    let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
    let mut errors = Vec::new();

    for (walk, node) in nodes.iter().enumerate() {
        let mut cursor = Some(node.id.as_str());
        let mut path = Vec::new();
        while let Some(id) = cursor {
            match marks.get(id) {
                Some(Mark::Done) => break,
                Some(Mark::Active(w)) if *w == walk => {
                    errors.push(TreeError::Cycle(id.to_string()));
                    break;
                }
                Some(Mark::Active(_)) => break,
                None => {}
            }
            marks.insert(id, Mark::Active(walk));
            path.push(id);
            cursor = parents.get(id).copied().flatten();
        }
        for id in path {
            marks.insert(id, Mark::Done);
        }
    }

    errors
}
