//! Serializable edit operations.
//!
//! One `EditOp` per session mutation, so scripted edits (e.g. a JSONL file)
//! go through exactly the same path as interactive ones.

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    UpdateValue { id: NodeId, value: f64 },
    TogglePin { id: NodeId },
    ToggleCollapse { id: NodeId },
    Select {
        #[serde(default)]
        id: Option<NodeId>,
    },
    Undo,
    Redo,
}

impl EditOp {
    /// Parse newline-delimited JSON. Blank lines and `#` comments are skipped.
    pub fn parse_jsonl(input: &str) -> Result<Vec<EditOp>, TreeError> {
        let mut ops = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let op = serde_json::from_str(trimmed).map_err(|e| TreeError::OpParse {
                line: idx + 1,
                message: e.to_string(),
            })?;
            ops.push(op);
        }
        Ok(ops)
    }

    /// True for operations recorded in undo history.
    pub fn is_undoable(&self) -> bool {
        matches!(self, EditOp::UpdateValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsonl() {
        let input = r#"
# bump expansion
{"op":"update_value","id":"D","value":10}
{"op":"toggle_pin","id":"A"}
{"op":"select","id":null}
{"op":"select"}
{"op":"undo"}
"#;
        let ops = EditOp::parse_jsonl(input).unwrap();
        assert_eq!(
            ops,
            vec![
                EditOp::UpdateValue { id: NodeId::from("D"), value: 10.0 },
                EditOp::TogglePin { id: NodeId::from("A") },
                EditOp::Select { id: None },
                EditOp::Select { id: None },
                EditOp::Undo,
            ]
        );
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"op\":\"undo\"}\n{\"op\":\"explode\"}\n";
        match EditOp::parse_jsonl(input) {
            Err(TreeError::OpParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected OpParse, got {other:?}"),
        }
    }

    #[test]
    fn test_only_value_edits_are_undoable() {
        assert!(EditOp::UpdateValue { id: "x".into(), value: 1.0 }.is_undoable());
        assert!(!EditOp::TogglePin { id: "x".into() }.is_undoable());
        assert!(!EditOp::Undo.is_undoable());
    }
}
