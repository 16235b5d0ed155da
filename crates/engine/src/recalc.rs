//! Upward recalculation after a single node edit.
//!
//! Only the ancestor chain of the changed node is touched: each ancestor is
//! refolded from its children, bottom-up, until a pinned ancestor or the root.
//! Cost is O(depth × branching), independent of total tree size.

use tracing::{debug, trace};

use crate::node::NodeId;
use crate::tree::NodeTree;

/// One ancestor recomputed during a ripple.
#[derive(Debug, Clone, PartialEq)]
pub struct RecalcStep {
    pub id: NodeId,
    /// Distance from the changed node (parent = 1).
    pub depth: usize,
    pub previous: f64,
    pub value: f64,
}

impl RecalcStep {
    pub fn changed(&self) -> bool {
        self.previous.to_bits() != self.value.to_bits()
    }
}

/// What a single `recalculate` call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecalcReport {
    /// The edited node, `None` if the id was not in the tree.
    pub changed: Option<NodeId>,

    /// Ancestors visited and refolded, nearest first. Ancestors that kept
    /// their value (inputs, childless derived nodes) are not listed.
    pub steps: Vec<RecalcStep>,

    /// The pinned ancestor that stopped the walk.
    pub stopped_at: Option<NodeId>,

    /// True if the walk processed the root.
    pub reached_root: bool,

    /// A parent id that named no node, ending the walk early.
    pub dangling_parent: Option<NodeId>,
}

impl RecalcReport {
    /// Ids of recomputed ancestors, nearest first.
    pub fn recomputed_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.steps.iter().map(|s| &s.id)
    }

    /// Number of ancestors whose value actually moved.
    pub fn values_changed(&self) -> usize {
        self.steps.iter().filter(|s| s.changed()).count()
    }

    /// Format as a one-line log entry.
    ///
    /// Format: `[recalc/ripple] D  2 ancestors  changed=2  stop=root`
    pub fn log_line(&self) -> String {
        let changed = self.changed.as_ref().map(NodeId::as_str).unwrap_or("?");
        let stop = match (&self.stopped_at, &self.dangling_parent) {
            (Some(pinned), _) => format!("pinned:{pinned}"),
            (None, Some(parent)) => format!("dangling:{parent}"),
            (None, None) if self.reached_root => "root".to_string(),
            (None, None) => "none".to_string(),
        };
        format!(
            "[recalc/ripple] {}  {} ancestors  changed={}  stop={}",
            changed,
            self.steps.len(),
            self.values_changed(),
            stop
        )
    }
}

/// Recompute the ancestors of `changed_id` and return the new tree.
///
/// Unknown ids and the root return the input unchanged. The input tree is
/// never mutated.
pub fn recalculate(tree: &NodeTree, changed_id: &str) -> NodeTree {
    recalculate_with_report(tree, changed_id).0
}

/// `recalculate`, plus a report of every ancestor it touched.
pub fn recalculate_with_report(tree: &NodeTree, changed_id: &str) -> (NodeTree, RecalcReport) {
    let mut report = RecalcReport::default();

    let Some(changed) = tree.get(changed_id) else {
        trace!(target: "drivertree::recalc", id = changed_id, "unknown node, nothing to recompute");
        return (tree.clone(), report);
    };
    report.changed = Some(changed.id.clone());

    let mut next = tree.clone();
    let mut cursor = changed.parent_id.clone();
    let mut depth = 0;

    while let Some(id) = cursor {
        depth += 1;
        // Malformed cyclic input: a tree walk never exceeds its node count
        if depth > tree.len() {
            debug!(target: "drivertree::recalc", id = %id, "ancestor walk exceeded tree size");
            break;
        }

        let Some(ancestor) = next.get(id.as_str()) else {
            report.dangling_parent = Some(id);
            break;
        };

        if ancestor.pinned {
            report.stopped_at = Some(id);
            break;
        }

        let previous = ancestor.value;
        let parent = ancestor.parent_id.clone();
        let folded = ancestor.compute_kind.fold(&next.child_values(id.as_str()));

        if let Some(value) = folded {
            next.set_value(id.as_str(), value);
            report.steps.push(RecalcStep { id: id.clone(), depth, previous, value });
        }

        if parent.is_none() {
            report.reached_root = true;
        }
        cursor = parent;
    }

    debug!(target: "drivertree::recalc", "{}", report.log_line());
    (next, report)
}
