//! Change notifications from a `TreeSession`.
//!
//! Every settled mutation emits exactly one event tagged with the session
//! revision it produced. A persistence layer can drain these to decide when
//! to read the canonical collection again.

use std::collections::VecDeque;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    /// A new collection replaced the canonical state.
    Loaded { revision: u64, nodes: usize },

    /// A value edit settled. `ids` lists the edited node first, then every
    /// ancestor that was recomputed, nearest first.
    ValuesChanged { revision: u64, ids: Vec<NodeId> },

    PinToggled { revision: u64, id: NodeId, pinned: bool },

    CollapseToggled { revision: u64, id: NodeId, collapsed: bool },

    /// Selection changed. Does not bump the revision.
    Selected { revision: u64, id: Option<NodeId> },

    Undone { revision: u64 },

    Redone { revision: u64 },
}

impl TreeEvent {
    pub fn revision(&self) -> u64 {
        match self {
            TreeEvent::Loaded { revision, .. }
            | TreeEvent::ValuesChanged { revision, .. }
            | TreeEvent::PinToggled { revision, .. }
            | TreeEvent::CollapseToggled { revision, .. }
            | TreeEvent::Selected { revision, .. }
            | TreeEvent::Undone { revision }
            | TreeEvent::Redone { revision } => *revision,
        }
    }

    /// True for events after which the canonical collection should be saved.
    pub fn changes_nodes(&self) -> bool {
        !matches!(self, TreeEvent::Selected { .. })
    }
}

/// Undrained events kept before the oldest are dropped.
pub const DEFAULT_EVENT_LIMIT: usize = 256;

/// Bounded event buffer. A consumer that stops draining loses the oldest
/// events, never the newest.
#[derive(Debug)]
pub struct EventCollector {
    events: VecDeque<TreeEvent>,
    max_events: usize,
    dropped: u64,
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCollector {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_EVENT_LIMIT)
    }

    /// A limit of zero keeps nothing.
    pub fn with_limit(max_events: usize) -> Self {
        Self { events: VecDeque::new(), max_events, dropped: 0 }
    }

    pub fn push(&mut self, event: TreeEvent) {
        self.events.push_back(event);
        while self.events.len() > self.max_events {
            self.events.pop_front();
            self.dropped += 1;
        }
    }

    /// Undrained events, oldest first.
    pub fn events(&self) -> impl ExactSizeIterator<Item = &TreeEvent> + '_ {
        self.events.iter()
    }

    pub fn drain(&mut self) -> Vec<TreeEvent> {
        self.events.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.max_events
    }

    /// Events evicted unread since the collector was created.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Only ValuesChanged events, as their id lists.
    pub fn values_changed(&self) -> Vec<&[NodeId]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TreeEvent::ValuesChanged { ids, .. } => Some(ids.as_slice()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_filtering() {
        let mut collector = EventCollector::new();
        collector.push(TreeEvent::Loaded { revision: 1, nodes: 3 });
        collector.push(TreeEvent::ValuesChanged {
            revision: 2,
            ids: vec![NodeId::from("d"), NodeId::from("a")],
        });
        collector.push(TreeEvent::Selected { revision: 2, id: None });

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.values_changed().len(), 1);
        assert_eq!(collector.values_changed()[0][1].as_str(), "a");
        let events: Vec<&TreeEvent> = collector.events().collect();
        assert!(!events[2].changes_nodes());
        assert_eq!(events[1].revision(), 2);

        let drained = collector.drain();
        assert_eq!(drained.len(), 3);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_collector_drops_oldest_past_limit() {
        let mut collector = EventCollector::with_limit(3);
        for revision in 1..=10 {
            collector.push(TreeEvent::Undone { revision });
        }

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.dropped(), 7);
        let revisions: Vec<u64> = collector.events().map(TreeEvent::revision).collect();
        assert_eq!(revisions, vec![8, 9, 10]);

        collector.drain();
        collector.push(TreeEvent::Redone { revision: 11 });
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.dropped(), 7);
    }
}
