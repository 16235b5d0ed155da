//! Canonical tree state with bounded undo/redo.
//!
//! `TreeSession` owns the node collection and every mutation of it. History
//! is about scenario numbers: only value edits push snapshots. Pin, collapse
//! and selection are view/structure toggles and bypass history, although an
//! undo restores the whole snapshot, flags included.
//!
//! Snapshots are `NodeTree` clones, which share all untouched nodes, so a
//! full undo stack costs pointers rather than copies of the tree.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::events::{EventCollector, TreeEvent};
use crate::node::NodeId;
use crate::ops::EditOp;
use crate::recalc::{self, RecalcReport};
use crate::ripple::{RippleConfig, RippleSchedule};
use crate::tree::NodeTree;

/// Maximum undo snapshots kept; the oldest is dropped first.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub struct TreeSession {
    nodes: NodeTree,
    undo_stack: VecDeque<NodeTree>,
    redo_stack: Vec<NodeTree>,
    max_entries: usize,
    selected: Option<NodeId>,
    ripple: RippleSchedule,
    events: EventCollector,
    revision: u64,
    last_recalc: Option<RecalcReport>,
}

impl Default for TreeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSession {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_LIMIT, RippleConfig::default())
    }

    pub fn with_limits(max_entries: usize, ripple: RippleConfig) -> Self {
        Self {
            nodes: NodeTree::default(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries,
            selected: None,
            ripple: RippleSchedule::new(ripple),
            events: EventCollector::new(),
            revision: 0,
            last_recalc: None,
        }
    }

    /// The canonical collection.
    pub fn nodes(&self) -> &NodeTree {
        &self.nodes
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn ripple(&self) -> &RippleSchedule {
        &self.ripple
    }

    pub fn ripple_mut(&mut self) -> &mut RippleSchedule {
        &mut self.ripple
    }

    /// Report of the most recent value edit's recalculation.
    pub fn last_recalc(&self) -> Option<&RecalcReport> {
        self.last_recalc.as_ref()
    }

    /// Undrained events, oldest first. Holds at most `DEFAULT_EVENT_LIMIT`.
    pub fn events(&self) -> impl ExactSizeIterator<Item = &TreeEvent> + '_ {
        self.events.events()
    }

    /// Events evicted because nobody drained them.
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped()
    }

    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.events.drain()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn history_limit(&self) -> usize {
        self.max_entries
    }

    /// Replace the canonical collection. Clears both stacks: loading a
    /// different tree is not undoable.
    pub fn set_nodes(&mut self, nodes: impl Into<NodeTree>) {
        self.nodes = nodes.into();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_recalc = None;
        self.ripple.cancel();
        if self.selected.as_ref().is_some_and(|id| !self.nodes.contains(id.as_str())) {
            self.selected = None;
        }
        self.revision += 1;
        debug!(target: "drivertree::history", nodes = self.nodes.len(), "tree loaded");
        self.events.push(TreeEvent::Loaded { revision: self.revision, nodes: self.nodes.len() });
    }

    /// Set a node's value and recompute its ancestors. Undoable.
    ///
    /// No-op returning false if the node is absent or the value is not finite.
    pub fn update_value(&mut self, id: &str, value: f64) -> bool {
        if !value.is_finite() {
            warn!(target: "drivertree::history", id, value, "rejected non-finite value");
            return false;
        }
        let Some(edited) = self.nodes.with_value(id, value) else {
            debug!(target: "drivertree::history", id, "update_value on unknown node ignored");
            return false;
        };

        let (next, report) = recalc::recalculate_with_report(&edited, id);

        let previous = std::mem::replace(&mut self.nodes, next);
        self.push_undo(previous);
        self.redo_stack.clear();

        self.ripple.start(&report);
        self.revision += 1;

        let mut ids = vec![NodeId::from(id)];
        ids.extend(report.recomputed_ids().cloned());
        self.events.push(TreeEvent::ValuesChanged { revision: self.revision, ids });
        self.last_recalc = Some(report);
        true
    }

    /// Flip `pinned`. Not recorded in history.
    pub fn toggle_pin(&mut self, id: &str) -> bool {
        let Some(next) = self.nodes.with_node(id, |n| n.pinned = !n.pinned) else {
            return false;
        };
        let pinned = next.get(id).is_some_and(|n| n.pinned);
        self.nodes = next;
        self.revision += 1;
        self.events.push(TreeEvent::PinToggled { revision: self.revision, id: id.into(), pinned });
        true
    }

    /// Flip `collapsed`. Not recorded in history.
    pub fn toggle_collapse(&mut self, id: &str) -> bool {
        let Some(next) = self.nodes.with_node(id, |n| n.collapsed = !n.collapsed) else {
            return false;
        };
        let collapsed = next.get(id).is_some_and(|n| n.collapsed);
        self.nodes = next;
        self.revision += 1;
        self.events.push(TreeEvent::CollapseToggled {
            revision: self.revision,
            id: id.into(),
            collapsed,
        });
        true
    }

    /// Select a node, or clear the selection with `None`.
    ///
    /// Selecting an unknown id is a no-op returning false.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let selected = match id {
            Some(id) if !self.nodes.contains(id) => return false,
            Some(id) => Some(NodeId::from(id)),
            None => None,
        };
        self.selected = selected.clone();
        self.events.push(TreeEvent::Selected { revision: self.revision, id: selected });
        true
    }

    /// Restore the most recent snapshot. No-op if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.nodes, snapshot);
        self.redo_stack.push(current);
        self.after_history_move();
        self.events.push(TreeEvent::Undone { revision: self.revision });
        true
    }

    /// Re-apply the most recently undone state. No-op if there is none.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.nodes, snapshot);
        self.push_undo(current);
        self.after_history_move();
        self.events.push(TreeEvent::Redone { revision: self.revision });
        true
    }

    /// Apply one edit operation. Returns whether it changed anything.
    pub fn apply(&mut self, op: &EditOp) -> bool {
        match op {
            EditOp::UpdateValue { id, value } => self.update_value(id.as_str(), *value),
            EditOp::TogglePin { id } => self.toggle_pin(id.as_str()),
            EditOp::ToggleCollapse { id } => self.toggle_collapse(id.as_str()),
            EditOp::Select { id } => self.select(id.as_ref().map(NodeId::as_str)),
            EditOp::Undo => self.undo(),
            EditOp::Redo => self.redo(),
        }
    }

    fn push_undo(&mut self, snapshot: NodeTree) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    fn after_history_move(&mut self) {
        self.ripple.cancel();
        self.last_recalc = None;
        self.revision += 1;
        debug!(
            target: "drivertree::history",
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "history moved"
        );
    }
}
