use rg_core::{NodeId, RgError, TrainId};
use rg_motion::MotionError;
use rg_network::NetworkError;
use thiserror::Error;

use crate::SchedulerState;

/// Why a dispatch request was refused.  A rejected request changes nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("train id must not be empty")]
    EmptyTrainId,

    #[error("train {0} already exists")]
    DuplicateTrainId(TrainId),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("origin and destination are both {0}")]
    SameOriginDestination(NodeId),

    #[error("{what} override must be positive and finite, got {value}")]
    InvalidOverride { what: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] RgError),

    #[error("dispatch rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("world lock poisoned by a panicked thread")]
    LockPoisoned,

    #[error("scheduler cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state:  SchedulerState,
    },

    #[error("cannot spawn tick thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("tick thread panicked")]
    TickThreadPanicked,
}

pub type SimResult<T> = Result<T, SimError>;
