use crate::graph::{NodeId, NodeKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid node id: {0}")]
    InvalidId(NodeId),
    #[error("edge `{edge}` of node {node} is already set (old target {old}, new target {new})")]
    EdgeReassigned {
        node: NodeId,
        edge: &'static str,
        old: NodeId,
        new: NodeId,
    },
    #[error("node {node} has kind {kind:?}, which does not carry edge `{edge}`")]
    KindMismatch {
        node: NodeId,
        kind: NodeKind,
        edge: &'static str,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed graph file: {0}")]
    Format(String),
    #[error("file type mismatch: expected `{expected}`, found `{found}`")]
    FileType { expected: String, found: String },
    #[error("{which} version mismatch: expected `{expected}`, found `{found}`")]
    Version {
        which: &'static str,
        expected: String,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
