//! Node schema for driver trees.
//!
//! A `TreeNode` is one driver in the decomposition of a target number.
//! Field names follow the camelCase wire shape the generator and the
//! persistence layer exchange.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Opaque node identifier, stable for the node's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a node's value measures. Affects formatting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Currency,
    Percentage,
    Count,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency => write!(f, "currency"),
            Self::Percentage => write!(f, "percentage"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// How a node obtains its value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeKind {
    /// Leaf whose value is set directly.
    #[default]
    Input,
    /// Arithmetic sum of the children's values.
    Sum,
    /// Product of the children's values.
    Product,
}

impl ComputeKind {
    /// Returns true for kinds whose value is derived from children.
    pub fn is_derived(self) -> bool {
        !matches!(self, ComputeKind::Input)
    }

    /// Fold child values (already in `order` sequence) into a node value.
    ///
    /// Returns `None` when the node keeps its current value: inputs never
    /// fold, and a derived node with no children behaves like an input.
    pub fn fold(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            ComputeKind::Input => None,
            ComputeKind::Sum => Some(values.iter().sum()),
            ComputeKind::Product => Some(values.iter().product()),
        }
    }
}

impl fmt::Display for ComputeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Sum => write!(f, "sum"),
            Self::Product => write!(f, "product"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    /// `None` for exactly one node per tree: the root.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub name: String,
    pub value: f64,
    /// Used only to derive status, never by recalculation.
    pub target_value: f64,
    pub value_kind: ValueKind,
    pub compute_kind: ComputeKind,
    /// Pinned nodes hold their value; recalculation stops at them.
    #[serde(default)]
    pub pinned: bool,
    /// Rank among siblings, the sole sort key for folding and display.
    pub order: u32,
    /// Hides descendants, never the node itself.
    #[serde(default)]
    pub collapsed: bool,
}

impl TreeNode {
    /// Create a node with the given shape. The name defaults to the id and
    /// the target defaults to the initial value.
    pub fn new(
        id: impl Into<NodeId>,
        parent_id: Option<&str>,
        compute_kind: ComputeKind,
        value: f64,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.as_str().to_string(),
            id,
            parent_id: parent_id.map(NodeId::from),
            value,
            target_value: value,
            value_kind: ValueKind::default(),
            compute_kind,
            pinned: false,
            order: 0,
            collapsed: false,
        }
    }

    pub fn input(id: impl Into<NodeId>, parent_id: Option<&str>, value: f64) -> Self {
        Self::new(id, parent_id, ComputeKind::Input, value)
    }

    pub fn sum(id: impl Into<NodeId>, parent_id: Option<&str>, value: f64) -> Self {
        Self::new(id, parent_id, ComputeKind::Sum, value)
    }

    pub fn product(id: impl Into<NodeId>, parent_id: Option<&str>, value: f64) -> Self {
        Self::new(id, parent_id, ComputeKind::Product, value)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_target(mut self, target_value: f64) -> Self {
        self.target_value = target_value;
        self
    }

    pub fn with_value_kind(mut self, value_kind: ValueKind) -> Self {
        self.value_kind = value_kind;
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Derived status against this node's target.
    pub fn status(&self) -> Status {
        Status::classify(self.value, self.target_value)
    }
}
