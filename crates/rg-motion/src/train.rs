//! Per-train movement record.

use std::collections::VecDeque;

use rg_core::{kmh_to_mps, EdgeId, NodeId, TrainId, TrainKind};
use rg_network::TrackNetwork;

/// Operating state reported for a train.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TrainStatus {
    /// Moving, or free to move, under the supervisor's ceiling.
    EnRoute,
    /// Stopped: held at a block boundary, or no route.
    #[default]
    Waiting,
    /// Reached its destination; no longer occupies track.
    Arrived,
    /// Current speed exceeded the safe ceiling this tick and was clamped.
    EmergencyBraking,
}

impl TrainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainStatus::EnRoute          => "EN_ROUTE",
            TrainStatus::Waiting          => "WAITING",
            TrainStatus::Arrived          => "ARRIVED",
            TrainStatus::EmergencyBraking => "EMERGENCY_BRAKING",
        }
    }
}

impl std::fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to put a new train on the network.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainSpec {
    pub id:          TrainId,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub kind:        TrainKind,
    /// Dispatch priority.  Informational; trains are stepped in id order.
    pub priority:    u8,
    /// Line-speed override in km/h; `None` uses the kind's profile.
    pub max_speed_kmh: Option<f64>,
    /// Braking deceleration override in m/s²; `None` uses the kind's profile.
    pub braking_rate:  Option<f64>,
}

impl TrainSpec {
    pub fn new(
        id:          impl Into<TrainId>,
        origin:      NodeId,
        destination: NodeId,
        kind:        TrainKind,
        priority:    u8,
    ) -> Self {
        Self {
            id: id.into(),
            origin,
            destination,
            kind,
            priority,
            max_speed_kmh: None,
            braking_rate:  None,
        }
    }

    pub fn with_max_speed_kmh(mut self, kmh: f64) -> Self {
        self.max_speed_kmh = Some(kmh);
        self
    }

    pub fn with_braking_rate(mut self, rate: f64) -> Self {
        self.braking_rate = Some(rate);
        self
    }
}

/// The movement state of one train.
///
/// A train either stands at a node (`edge == None`, `tail == head`) or is on
/// a segment running from `tail` towards `head`, `progress_m` metres in.
/// `route` holds the steps still to run *after* `head`, each the planned
/// segment and the node it leads to; its front is taken once `head` is
/// reached.
#[derive(Clone, Debug, PartialEq)]
pub struct Train {
    pub id:            TrainId,
    pub kind:          TrainKind,
    pub priority:      u8,
    /// Line speed in m/s.
    pub max_speed_mps: f64,
    /// Braking deceleration in m/s².
    pub braking_rate:  f64,

    pub speed_mps:  f64,
    pub edge:       Option<EdgeId>,
    pub tail:       NodeId,
    pub head:       NodeId,
    pub progress_m: f64,

    pub route:       VecDeque<(EdgeId, NodeId)>,
    pub origin:      NodeId,
    pub destination: NodeId,
    pub status:      TrainStatus,

    /// Set once the router reports the destination unreachable.  The graph
    /// never changes, so such a train is not re-planned again.
    pub route_failed: bool,

    /// Ceiling applied on the most recent tick.
    pub ceiling_mps: Option<f64>,
}

impl Train {
    /// A stationary train at `spec.origin` with no route yet.
    pub fn new(spec: TrainSpec) -> Self {
        let profile = spec.kind.profile();
        Self {
            max_speed_mps: kmh_to_mps(spec.max_speed_kmh.unwrap_or(profile.max_speed_kmh)),
            braking_rate:  spec.braking_rate.unwrap_or(profile.braking_rate),
            id:            spec.id,
            kind:          spec.kind,
            priority:      spec.priority,
            speed_mps:     0.0,
            edge:          None,
            tail:          spec.origin,
            head:          spec.origin,
            progress_m:    0.0,
            route:         VecDeque::new(),
            origin:        spec.origin,
            destination:   spec.destination,
            status:        TrainStatus::Waiting,
            route_failed:  false,
            ceiling_mps:   None,
        }
    }

    #[inline]
    pub fn is_arrived(&self) -> bool {
        self.status == TrainStatus::Arrived
    }

    /// Metres left to `head` on the current segment (0 at a node).
    pub fn remaining_on_edge(&self, network: &TrackNetwork) -> f64 {
        match self.edge {
            Some(e) => (network.edge_length(e) - self.progress_m).max(0.0),
            None    => 0.0,
        }
    }

    /// `true` when the train stands at `head`: either off-track at a node or
    /// at the end of its segment.
    pub fn at_boundary(&self, network: &TrackNetwork) -> bool {
        self.remaining_on_edge(network) <= 0.0
    }

    /// Segments still to be entered, in order.
    pub fn planned_edges(&self) -> Vec<EdgeId> {
        self.route.iter().map(|&(e, _)| e).collect()
    }

    /// The full remaining route starting with `head`.
    pub fn planned_nodes(&self) -> Vec<NodeId> {
        std::iter::once(self.head).chain(self.route.iter().map(|&(_, n)| n)).collect()
    }
}
