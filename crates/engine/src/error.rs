use std::fmt;

/// Boundary-layer errors: malformed documents and schema or shape
/// violations. Engine operations themselves never fail.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// JSON parse / deserialization error.
    Parse(String),
    /// Edit operation stream could not be parsed.
    OpParse { line: usize, message: String },
    /// More nodes than a tree may hold.
    TooManyNodes { count: usize, max: usize },
    /// A string field is empty or too long (lengths in chars).
    FieldLength { id: String, field: &'static str, len: usize, max: usize },
    /// A numeric field is NaN or infinite.
    NonFinite { id: String, field: &'static str },
    /// Sibling order outside the allowed range.
    OrderOutOfRange { id: String, order: u32, max: u32 },
    /// Two nodes share an id.
    DuplicateId(String),
    /// No node without a parent.
    MissingRoot,
    /// More than one node without a parent.
    MultipleRoots(Vec<String>),
    /// A parent id that names no node in the tree.
    DanglingParent { id: String, parent: String },
    /// The parent chain starting at this node loops.
    Cycle(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::OpParse { line, message } => write!(f, "line {line}: {message}"),
            Self::TooManyNodes { count, max } => {
                write!(f, "tree has {count} nodes, at most {max} allowed")
            }
            Self::FieldLength { id, field, len, max } => {
                write!(f, "node '{id}': {field} must be 1-{max} characters, got {len}")
            }
            Self::NonFinite { id, field } => write!(f, "node '{id}': {field} is not a finite number"),
            Self::OrderOutOfRange { id, order, max } => {
                write!(f, "node '{id}': order {order} outside 0-{max}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate node id '{id}'"),
            Self::MissingRoot => write!(f, "tree has no root node"),
            Self::MultipleRoots(ids) => write!(f, "tree has multiple roots: {}", ids.join(", ")),
            Self::DanglingParent { id, parent } => {
                write!(f, "node '{id}': parent '{parent}' does not exist")
            }
            Self::Cycle(id) => write!(f, "parent chain of node '{id}' forms a cycle"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
