//! Recoverable errors. Caller-contract violations panic instead.

use crate::model::{EdgeId, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node {0:?} appears more than once")]
    DuplicateNode(NodeId),

    #[error("edge {0:?} appears more than once")]
    DuplicateEdge(EdgeId),

    #[error("edge {edge:?} references unknown node {node:?}")]
    DanglingEdge { edge: EdgeId, node: NodeId },

    #[error("graph is inconsistent: {0}")]
    Inconsistent(String),

    #[error("invalid graph snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
