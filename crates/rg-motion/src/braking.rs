//! Braking envelope and speed supervision.
//!
//! # Model
//!
//! Constant deceleration `a`.  A train at speed `v` needs
//!
//! ```text
//! d_brake = v² / (2a)
//! ```
//!
//! metres to stop.  Inverting it for a hazard `d` metres ahead, less the
//! clearance buffer `b`, gives the highest speed from which the train can
//! still stop in time:
//!
//! ```text
//! v_safe = sqrt(max(0, 2a(d − b)))
//! ```
//!
//! A hazard is the first block on the route held by another train, or the end
//! of the route.  The buffer applies to occupied blocks only; the end of the
//! route is a planned stop at a platform, so trains brake to rest exactly at
//! it.

use rg_core::{EdgeId, NodeId, TrainId};
use rg_network::{EdgeOccupancy, TrackNetwork};

use crate::kinematics::MotionParams;
use crate::Train;

/// Comparison tolerance for speeds (m/s) and gaps (m).
const EPSILON: f64 = 1e-9;

/// Stopping distance in metres from `speed_mps` at `decel_mps2`.
///
/// A non-positive deceleration can never stop the train: infinite.
pub fn braking_distance(speed_mps: f64, decel_mps2: f64) -> f64 {
    if speed_mps <= 0.0 {
        return 0.0;
    }
    if decel_mps2 <= 0.0 {
        return f64::INFINITY;
    }
    speed_mps * speed_mps / (2.0 * decel_mps2)
}

/// Highest speed from which the train stops `buffer_m` short of a hazard
/// `distance_m` ahead.  Zero when the hazard is inside the buffer.
pub fn safe_speed(decel_mps2: f64, distance_m: f64, buffer_m: f64) -> f64 {
    let usable = distance_m - buffer_m;
    if usable <= 0.0 || decel_mps2 <= 0.0 {
        return 0.0;
    }
    (2.0 * decel_mps2 * usable).sqrt()
}

/// The nearest point ahead where a train must be able to stop.
#[derive(Clone, Debug, PartialEq)]
pub enum Hazard {
    /// `edge` is held by `holder`; its near end, `entry`, is `distance_m`
    /// ahead.
    Occupied {
        edge:       EdgeId,
        holder:     TrainId,
        entry:      NodeId,
        distance_m: f64,
    },
    /// The planned route ends at `node`, `distance_m` ahead.
    Terminus {
        node:       NodeId,
        distance_m: f64,
    },
}

impl Hazard {
    pub fn distance_m(&self) -> f64 {
        match *self {
            Hazard::Occupied { distance_m, .. } | Hazard::Terminus { distance_m, .. } => distance_m,
        }
    }

    /// Clearance to keep in front of this hazard.
    pub fn buffer_m(&self, safety_buffer_m: f64) -> f64 {
        match self {
            Hazard::Occupied { .. } => safety_buffer_m,
            Hazard::Terminus { .. } => 0.0,
        }
    }
}

/// Walk the train's planned segments from its current position and return the first
/// hazard within the lookahead horizon.
///
/// The distance is the rest of the current segment plus whole segments after
/// it, so it is always finite.  The horizon is the configured lookahead, but
/// never shorter than the train's stopping distance from line speed plus the
/// buffer and one tick of travel: a hazard the train could not stop for is
/// always seen.
pub fn find_hazard(
    train:     &Train,
    network:   &TrackNetwork,
    occupancy: &dyn EdgeOccupancy,
    params:    &MotionParams,
) -> Option<Hazard> {
    if train.is_arrived() {
        return None;
    }
    let horizon = params.lookahead_m.max(
        braking_distance(train.max_speed_mps, train.braking_rate)
            + params.safety_buffer_m
            + train.max_speed_mps * params.dt_secs,
    );

    let mut distance = train.remaining_on_edge(network);
    if distance > horizon {
        return None;
    }

    let mut at = train.head;
    for &(edge, next) in &train.route {
        if !network.joins(edge, at, next) {
            // Broken step: treat as the end of the usable route.
            return Some(Hazard::Terminus { node: at, distance_m: distance });
        }
        if let Some(holder) = occupancy.occupant(edge).filter(|&h| h != &train.id) {
            return Some(Hazard::Occupied { edge, holder: holder.clone(), entry: at, distance_m: distance });
        }
        distance += network.edge_length(edge);
        if distance > horizon {
            return None;
        }
        at = next;
    }

    Some(Hazard::Terminus { node: at, distance_m: distance })
}

/// Output of one supervision pass for one train.
#[derive(Clone, Debug, PartialEq)]
pub struct Supervision {
    /// Highest speed permitted on the next tick, never above line speed.
    pub ceiling_mps: f64,
    pub hazard:      Option<Hazard>,
    /// The current speed already exceeds `ceiling_mps`.
    pub emergency:   bool,
}

/// Compute the speed ceiling for `train` on the next tick.
pub fn supervise(
    train:     &Train,
    network:   &TrackNetwork,
    occupancy: &dyn EdgeOccupancy,
    params:    &MotionParams,
) -> Supervision {
    let hazard = find_hazard(train, network, occupancy, params);
    let ceiling_mps = match &hazard {
        Some(h) => safe_speed(train.braking_rate, h.distance_m(), h.buffer_m(params.safety_buffer_m))
            .min(train.max_speed_mps),
        None => train.max_speed_mps,
    };
    Supervision {
        ceiling_mps,
        emergency: train.speed_mps > ceiling_mps + EPSILON,
        hazard,
    }
}

/// A train inside another train's safety bubble: the gap to the train
/// holding the block ahead is shorter than that train's stopping distance
/// plus the buffer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafetyAlert {
    pub train:      TrainId,
    pub holder:     TrainId,
    pub edge:       EdgeId,
    pub required_m: f64,
    pub actual_m:   f64,
}

/// Metres from `train` to `holder`, which sits on the occupied block of
/// `hazard`.  Falls back to the distance to the block when `holder` is not on
/// it.
pub fn separation_m(hazard: &Hazard, holder: &Train, network: &TrackNetwork) -> Option<f64> {
    let Hazard::Occupied { edge, entry, distance_m, .. } = hazard else {
        return None;
    };
    let into_block = match holder.edge {
        Some(e) if e == *edge && holder.tail == *entry => holder.progress_m,
        Some(e) if e == *edge => network.edge_length(e) - holder.progress_m,
        _ => 0.0,
    };
    Some(distance_m + into_block.max(0.0))
}

/// Safety-bubble check of `train` against `holder`, the train on the
/// occupied block ahead of it.
///
/// The bubble reaches back from the holder by the holder's own stopping
/// distance plus the buffer.  The follower's speed does not matter: a train
/// standing inside the bubble is reported too.
pub fn check_separation(
    train:           &Train,
    hazard:          &Hazard,
    holder:          &Train,
    network:         &TrackNetwork,
    safety_buffer_m: f64,
) -> Option<SafetyAlert> {
    let Hazard::Occupied { edge, holder: holder_id, .. } = hazard else {
        return None;
    };
    if holder.id != *holder_id {
        return None;
    }
    let actual = separation_m(hazard, holder, network)?;
    let required = braking_distance(holder.speed_mps, holder.braking_rate) + safety_buffer_m;
    (actual + EPSILON < required).then(|| SafetyAlert {
        train:      train.id.clone(),
        holder:     holder.id.clone(),
        edge:       *edge,
        required_m: required,
        actual_m:   actual,
    })
}
