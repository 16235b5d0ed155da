//! Copy-on-write node arena.
//!
//! `NodeTree` holds the node collection as a vector of shared node handles
//! plus id and child indexes. Cloning a tree copies pointers, not nodes, and
//! a value update replaces a single handle. Undo snapshots therefore share
//! every node that an edit did not touch.
//!
//! # Invariants
//!
//! 1. **Insertion order preserved:** `iter()` yields nodes in load order.
//! 2. **Immutable shape:** ids, parents and orders never change after
//!    construction, so both indexes are shared by every derived snapshot.
//! 3. **Ordered children:** each child list is sorted by `order`, ties broken
//!    by load position.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TreeError;
use crate::node::{NodeId, TreeNode};
use crate::validation;

#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<Arc<TreeNode>>,
    /// id -> position in `nodes`. On duplicate ids the last one wins.
    index: Arc<FxHashMap<NodeId, usize>>,
    /// parent id -> child positions, sorted by `order`.
    children: Arc<FxHashMap<NodeId, Vec<usize>>>,
}

impl NodeTree {
    /// Build a tree without validation.
    ///
    /// Engine operations tolerate structural anomalies (dangling parents,
    /// cycles) by terminating their walks early. Use `try_from_nodes` at
    /// the boundary.
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        let nodes: Vec<Arc<TreeNode>> = nodes.into_iter().map(Arc::new).collect();

        let mut index = FxHashMap::default();
        for (pos, node) in nodes.iter().enumerate() {
            index.insert(node.id.clone(), pos);
        }

        let mut children: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        for (pos, node) in nodes.iter().enumerate() {
            if let Some(parent) = &node.parent_id {
                children.entry(parent.clone()).or_default().push(pos);
            }
        }
        for list in children.values_mut() {
            // Stable sort keeps load position as the tie-breaker
            list.sort_by_key(|&pos| nodes[pos].order);
        }

        Self {
            nodes,
            index: Arc::new(index),
            children: Arc::new(children),
        }
    }

    /// Build a tree after checking field constraints and tree shape.
    ///
    /// Fails with the first violation found.
    pub fn try_from_nodes(nodes: Vec<TreeNode>) -> Result<Self, TreeError> {
        if let Some(err) = validation::validate_nodes(&nodes).into_iter().next() {
            return Err(err);
        }
        Ok(Self::new(nodes))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.index.get(id).map(|&pos| self.nodes[pos].as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in load order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.nodes.iter().map(|n| n.as_ref())
    }

    /// The first node without a parent.
    pub fn root(&self) -> Option<&TreeNode> {
        self.iter().find(|n| n.is_root())
    }

    /// The parent node, if the node exists and its parent resolves.
    pub fn parent_of(&self, id: &str) -> Option<&TreeNode> {
        let parent = self.get(id)?.parent_id.as_ref()?;
        self.get(parent.as_str())
    }

    /// Direct children sorted by `order`.
    pub fn children(&self, id: &str) -> Vec<&TreeNode> {
        self.children
            .get(id)
            .map(|list| list.iter().map(|&pos| self.nodes[pos].as_ref()).collect())
            .unwrap_or_default()
    }

    /// Current values of the direct children, in `order` sequence.
    pub fn child_values(&self, id: &str) -> Vec<f64> {
        self.children
            .get(id)
            .map(|list| list.iter().map(|&pos| self.nodes[pos].value).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|list| !list.is_empty())
    }

    /// Strict ancestors, nearest first.
    ///
    /// Stops at a dangling parent reference, and after `len()` steps so a
    /// malformed cyclic collection cannot loop forever.
    pub fn ancestors(&self, id: &str) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(node) = cursor {
            if out.len() >= self.len() {
                break;
            }
            out.push(node);
            cursor = self.parent_of(node.id.as_str());
        }
        out
    }

    /// Number of resolvable ancestors (root has depth 0).
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len()
    }

    /// Copy-on-write value update. Returns `None` if `id` is absent.
    pub fn with_value(&self, id: &str, value: f64) -> Option<Self> {
        self.with_node(id, |node| node.value = value)
    }

    /// Copy-on-write update of one node.
    ///
    /// The closure must not change `id`, `parent_id` or `order`; the shared
    /// indexes depend on them.
    pub fn with_node(&self, id: &str, f: impl FnOnce(&mut TreeNode)) -> Option<Self> {
        let pos = *self.index.get(id)?;
        let mut next = self.clone();
        next.update_at(pos, f);
        Some(next)
    }

    /// In-place update used while building a derived snapshot.
    pub(crate) fn set_value(&mut self, id: &str, value: f64) -> bool {
        match self.index.get(id).copied() {
            Some(pos) => {
                self.update_at(pos, |node| node.value = value);
                true
            }
            None => false,
        }
    }

    fn update_at(&mut self, pos: usize, f: impl FnOnce(&mut TreeNode)) {
        let node = Arc::make_mut(&mut self.nodes[pos]);
        let (id, parent, order) = (node.id.clone(), node.parent_id.clone(), node.order);
        f(node);
        debug_assert!(
            node.id == id && node.parent_id == parent && node.order == order,
            "node shape changed in place"
        );
    }

    /// Returns true if both trees hold the same allocation for `id`.
    pub fn shares_node(&self, other: &NodeTree, id: &str) -> bool {
        match (self.index.get(id), other.index.get(id)) {
            (Some(&a), Some(&b)) => Arc::ptr_eq(&self.nodes[a], &other.nodes[b]),
            _ => false,
        }
    }

    /// Owned copy of the nodes in load order.
    pub fn to_vec(&self) -> Vec<TreeNode> {
        self.iter().cloned().collect()
    }
}

impl PartialEq for NodeTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl From<Vec<TreeNode>> for NodeTree {
    fn from(nodes: Vec<TreeNode>) -> Self {
        Self::new(nodes)
    }
}

impl FromIterator<TreeNode> for NodeTree {
    fn from_iter<I: IntoIterator<Item = TreeNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Serialize for NodeTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for NodeTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TreeNode>::deserialize(deserializer).map(Self::new)
    }
}
