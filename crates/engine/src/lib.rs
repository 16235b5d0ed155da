//! `drivertree-engine`: incremental recalculation and history for driver trees.
//!
//! Pure engine crate: a driver tree decomposes one target number into
//! contributing nodes. Editing a node refolds its ancestors up to the first
//! pinned one, `TreeSession` keeps bounded undo/redo over those edits, and the
//! visibility queries resolve which nodes sit behind a collapsed ancestor.
//! No IO beyond JSON (de)serialization.

pub mod document;
pub mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod node;
pub mod ops;
pub mod recalc;
pub mod ripple;
pub mod status;
pub mod tree;
pub mod validation;
pub mod visibility;

pub use document::TreeDocument;
pub use error::TreeError;
pub use history::{TreeSession, DEFAULT_HISTORY_LIMIT};
pub use node::{ComputeKind, NodeId, TreeNode, ValueKind};
pub use ops::EditOp;
pub use recalc::{recalculate, recalculate_with_report, RecalcReport};
pub use status::Status;
pub use tree::NodeTree;
pub use visibility::{branch_node_ids, compute_visible};
