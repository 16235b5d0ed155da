//! Staggered ancestor emphasis after an edit.
//!
//! After a value edit the consumer highlights each recomputed ancestor in
//! turn, nearest first, then clears all highlights after a fixed delay. The
//! schedule is plain data owned by one session: the consumer drives it with
//! elapsed time and echoes the generation back when its clear timer fires.
//!
//! # Cancellation
//!
//! Starting a new ripple bumps the generation. A clear carrying an older
//! generation is ignored, so a pending clear from a previous edit can never
//! wipe the highlights of the current one.

use std::time::Duration;

use tracing::trace;

use crate::node::NodeId;
use crate::recalc::RecalcReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RippleConfig {
    /// Delay added per ancestor level.
    pub stagger: Duration,
    /// How long the last highlight stays before everything clears.
    pub clear_after: Duration,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            stagger: Duration::from_millis(80),
            clear_after: Duration::from_millis(1200),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub id: NodeId,
    /// Time after the edit at which this node lights up.
    pub delay: Duration,
}

/// The emphasis plan for one edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub generation: u64,
    pub highlights: Vec<Highlight>,
    /// Time after the edit at which every highlight clears.
    pub clear_at: Duration,
}

impl Ripple {
    /// Nodes lit at `elapsed` time since the edit.
    pub fn active_at(&self, elapsed: Duration) -> impl Iterator<Item = &NodeId> + '_ {
        let cleared = elapsed >= self.clear_at;
        self.highlights
            .iter()
            .filter(move |h| !cleared && h.delay <= elapsed)
            .map(|h| &h.id)
    }
}

#[derive(Debug, Default)]
pub struct RippleSchedule {
    config: RippleConfig,
    generation: u64,
    pending: Option<Ripple>,
}

impl RippleSchedule {
    pub fn new(config: RippleConfig) -> Self {
        Self { config, generation: 0, pending: None }
    }

    pub fn config(&self) -> RippleConfig {
        self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The ripple awaiting its clear, if any.
    pub fn pending(&self) -> Option<&Ripple> {
        self.pending.as_ref()
    }

    /// Plan emphasis for the ancestors a recalculation touched, replacing
    /// and cancelling any pending ripple.
    pub fn start(&mut self, report: &RecalcReport) -> &Ripple {
        self.generation += 1;

        let highlights: Vec<Highlight> = report
            .steps
            .iter()
            .map(|step| Highlight {
                id: step.id.clone(),
                delay: self.config.stagger * step.depth as u32,
            })
            .collect();
        let last = highlights.last().map(|h| h.delay).unwrap_or_default();

        trace!(
            target: "drivertree::ripple",
            generation = self.generation,
            nodes = highlights.len(),
            "ripple started"
        );

        self.pending.insert(Ripple {
            generation: self.generation,
            highlights,
            clear_at: last + self.config.clear_after,
        })
    }

    /// Clear the pending ripple if `generation` is still current.
    ///
    /// Returns false for stale generations and when nothing is pending.
    pub fn clear(&mut self, generation: u64) -> bool {
        match &self.pending {
            Some(ripple) if ripple.generation == generation => {
                self.pending = None;
                true
            }
            _ => {
                trace!(target: "drivertree::ripple", generation, "stale clear ignored");
                false
            }
        }
    }

    /// Drop any pending ripple regardless of generation.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }
}
