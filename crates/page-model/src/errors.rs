use thiserror::Error;

use crate::model::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Node id does not exist in this document
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Operation needs an element but the node is text
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Control has no native value setter to bypass to
    #[error("no native value setter on {0:?}")]
    NativeSetterUnavailable(NodeId),

    /// Snapshot could not be parsed
    #[error("invalid page snapshot: {0}")]
    InvalidSnapshot(String),
}
