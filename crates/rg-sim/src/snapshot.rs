//! Owned, read-only copies of world state handed across the boundary.

use rg_core::{mps_to_kmh, EdgeId, NodeId, Tick, TrainId, TrainKind};
use rg_motion::{Train, TrainStatus};

/// One train as seen from outside.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainSnapshot {
    pub id:            TrainId,
    pub kind:          TrainKind,
    pub priority:      u8,
    pub status:        TrainStatus,
    pub speed_kmh:     f64,
    pub max_speed_kmh: f64,
    /// Supervisor ceiling applied on the last tick, if the train has moved.
    pub ceiling_kmh:   Option<f64>,
    /// Segment currently held, `None` when standing at a node or arrived.
    pub edge:          Option<EdgeId>,
    /// Node the train last left.
    pub from:          NodeId,
    /// Node the train is heading for (or standing at).
    pub to:            NodeId,
    pub progress_m:    f64,
    pub origin:        NodeId,
    pub destination:   NodeId,
    /// Remaining planned nodes, starting with `to`.
    pub route:         Vec<NodeId>,
    /// Segments the train will enter, one per step of `route` after `to`.
    pub route_edges:   Vec<EdgeId>,
    pub route_failed:  bool,
}

impl TrainSnapshot {
    pub fn of(train: &Train) -> Self {
        Self {
            id:            train.id.clone(),
            kind:          train.kind,
            priority:      train.priority,
            status:        train.status,
            speed_kmh:     mps_to_kmh(train.speed_mps),
            max_speed_kmh: mps_to_kmh(train.max_speed_mps),
            ceiling_kmh:   train.ceiling_mps.map(mps_to_kmh),
            edge:          train.edge,
            from:          train.tail,
            to:            train.head,
            progress_m:    train.progress_m,
            origin:        train.origin,
            destination:   train.destination,
            route:         train.planned_nodes(),
            route_edges:   train.planned_edges(),
            route_failed:  train.route_failed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyEntry {
    pub edge:  EdgeId,
    pub train: TrainId,
}

/// Full state after the most recent committed tick.
///
/// `trains` is in ascending id order and `occupancy` in ascending edge order,
/// so two snapshots of unchanged state compare equal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSnapshot {
    /// Ticks completed so far.
    pub tick:           Tick,
    pub unix_time_secs: i64,
    pub trains:         Vec<TrainSnapshot>,
    pub occupancy:      Vec<OccupancyEntry>,
}

impl StateSnapshot {
    pub fn train(&self, id: &str) -> Option<&TrainSnapshot> {
        self.trains.iter().find(|t| t.id.as_str() == id)
    }

    pub fn count_with(&self, status: TrainStatus) -> usize {
        self.trains.iter().filter(|t| t.status == status).count()
    }
}
