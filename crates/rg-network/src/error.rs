//! Network-subsystem error type.

use thiserror::Error;

use rg_core::NodeId;

/// Errors produced by `rg-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("no node named {0:?}")]
    UnknownNodeName(String),

    #[error("duplicate node name {0:?}")]
    DuplicateNodeName(String),

    #[error("track segment from {0} to itself")]
    SelfLoop(NodeId),

    #[error("track segment {a} – {b} has invalid length {length_m} m")]
    InvalidLength { a: NodeId, b: NodeId, length_m: f64 },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
