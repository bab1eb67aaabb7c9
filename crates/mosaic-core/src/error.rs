//! Error types for the orchestrator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Dimension out of range: {0}")]
    DimensionOutOfRange(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Computation failure: {0}")]
    ComputationFailure(String),

    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable short name of the error kind, used in logs and RPC messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParent(_) => "InvalidParent",
            Self::DimensionOutOfRange(_) => "DimensionOutOfRange",
            Self::NodeNotFound(_) => "NodeNotFound",
            Self::ComputationFailure(_) => "ComputationFailure",
            Self::DuplicateNode(_) => "DuplicateNode",
            Self::InvalidNodeId(_) => "InvalidNodeId",
            Self::CapacityExceeded(_) => "CapacityExceeded",
            Self::Config(_) => "Config",
            Self::Json(_) => "Json",
            Self::Internal(_) => "Internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
