//! Tree document envelope.
//!
//! The shape a persistence layer stores: a tree id, a display name and the
//! node array. Bare node arrays (as produced by the generator) are accepted
//! too and get a placeholder id and name.

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::TreeNode;
use crate::tree::NodeTree;
use crate::validation;

pub const UNTITLED: &str = "untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub id: String,
    pub name: String,
    pub nodes: Vec<TreeNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentShape {
    Document(TreeDocument),
    Bare(Vec<TreeNode>),
}

impl TreeDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, nodes: Vec<TreeNode>) -> Self {
        Self { id: id.into(), name: name.into(), nodes }
    }

    /// Parse a document object or a bare node array.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        match serde_json::from_str::<DocumentShape>(json) {
            Ok(DocumentShape::Document(doc)) => Ok(doc),
            Ok(DocumentShape::Bare(nodes)) => Ok(Self::new(UNTITLED, UNTITLED, nodes)),
            // Untagged errors carry no detail; re-parse as the intended shape
            Err(_) => {
                let detail = if json.trim_start().starts_with('[') {
                    serde_json::from_str::<Vec<TreeNode>>(json).err()
                } else {
                    serde_json::from_str::<TreeDocument>(json).err()
                };
                Err(detail
                    .map(TreeError::from)
                    .unwrap_or_else(|| TreeError::Parse("unrecognized tree document".to_string())))
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        serde_json::to_string_pretty(self).map_err(TreeError::from)
    }

    /// Every field and shape violation.
    pub fn validate(&self) -> Vec<TreeError> {
        validation::validate_nodes(&self.nodes)
    }

    /// Validate and build the engine's tree.
    pub fn to_tree(&self) -> Result<NodeTree, TreeError> {
        NodeTree::try_from_nodes(self.nodes.clone())
    }

    /// Snapshot a tree back into a document.
    pub fn from_tree(id: impl Into<String>, name: impl Into<String>, tree: &NodeTree) -> Self {
        Self::new(id, name, tree.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "id": "t-1",
        "name": "FY26 ARR",
        "nodes": [
            {"id":"arr","parentId":null,"name":"ARR","value":150,"targetValue":160,
             "valueKind":"currency","computeKind":"sum","order":0},
            {"id":"new","parentId":"arr","name":"New","value":170,"targetValue":150,
             "valueKind":"currency","computeKind":"input","order":0},
            {"id":"churn","parentId":"arr","name":"Churn","value":-20,"targetValue":-10,
             "valueKind":"currency","computeKind":"input","order":1,"pinned":true}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = TreeDocument::from_json(DOC).unwrap();
        assert_eq!(doc.id, "t-1");
        assert_eq!(doc.nodes.len(), 3);
        assert!(doc.nodes[2].pinned);
        assert!(doc.validate().is_empty());
        assert_eq!(doc.to_tree().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{"id":"r","parentId":null,"name":"R","value":1,"targetValue":1,
                        "valueKind":"count","computeKind":"input","order":0}]"#;
        let doc = TreeDocument::from_json(json).unwrap();
        assert_eq!(doc.id, UNTITLED);
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = TreeDocument::from_json(r#"{"id":"x","name":"y"}"#).unwrap_err();
        assert!(matches!(err, TreeError::Parse(msg) if msg.contains("nodes")));
    }

    #[test]
    fn test_to_tree_rejects_invalid() {
        let mut doc = TreeDocument::from_json(DOC).unwrap();
        doc.nodes[1].parent_id = Some("ghost".into());
        assert!(matches!(doc.to_tree(), Err(TreeError::DanglingParent { .. })));
    }

    #[test]
    fn test_round_trip_through_tree() {
        let doc = TreeDocument::from_json(DOC).unwrap();
        let tree = doc.to_tree().unwrap();
        let back = TreeDocument::from_tree(doc.id.clone(), doc.name.clone(), &tree);
        assert_eq!(back, doc);
    }
}
