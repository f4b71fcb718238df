use rg_core::{EdgeId, NodeId, TrainId};
use rg_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    /// A second train tried to take a block.  Never expected: every entry is
    /// checked first, so this signals a broken invariant.
    #[error("occupancy conflict on {edge}: held by {holder}, claimed by {claimant}")]
    OccupancyConflict {
        edge:     EdgeId,
        holder:   TrainId,
        claimant: TrainId,
    },

    #[error("route of {train} steps from {from} to {to} with no track between them")]
    BrokenRoute { train: TrainId, from: NodeId, to: NodeId },

    #[error("routing failed: {0}")]
    Routing(#[from] NetworkError),
}

pub type MotionResult<T> = Result<T, MotionError>;
