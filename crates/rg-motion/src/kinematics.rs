//! One train, one tick.

use log::{debug, info, warn};

use rg_core::{kmh_to_mps, EdgeId, NodeId, SimConfig};
use rg_network::{NetworkError, Router, TrackNetwork};

use crate::braking::Supervision;
use crate::{MotionError, MotionResult, OccupancyTable, Train, TrainStatus};

/// Physics constants for a run, derived from [`SimConfig`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionParams {
    /// Simulated seconds per tick.
    pub dt_secs:         f64,
    /// Speed gained per tick when unconstrained, in m/s.
    pub accel_step_mps:  f64,
    pub safety_buffer_m: f64,
    pub lookahead_m:     f64,
}

impl MotionParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            dt_secs:         config.tick_duration_secs as f64,
            accel_step_mps:  kmh_to_mps(config.accel_step_kmh),
            safety_buffer_m: config.safety_buffer_m,
            lookahead_m:     config.lookahead_m,
        }
    }
}

impl Default for MotionParams {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

/// What happened to a train during [`advance`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// Metres travelled this tick.
    pub moved_m:    f64,
    /// Segments entered this tick, in order.
    pub entered:    Vec<EdgeId>,
    /// The train reached its destination this tick.
    pub arrived:    bool,
    /// The train was held at this node because the next block is taken.
    pub blocked_at: Option<NodeId>,
}

/// Plan a route from the train's `head` to its destination around blocks
/// held by other trains, replacing `train.route`.
///
/// Returns `Ok(false)` when the destination is unreachable; the train is then
/// marked `route_failed`, its route cleared, and it is left waiting.
pub fn replan<R: Router + ?Sized>(
    train:     &mut Train,
    network:   &TrackNetwork,
    occupancy: &OccupancyTable,
    router:    &R,
) -> MotionResult<bool> {
    match router.route(network, train.head, train.destination, occupancy, Some(&train.id)) {
        Ok(route) => {
            let next: Vec<(EdgeId, NodeId)> =
                route.edges.into_iter().zip(route.nodes.into_iter().skip(1)).collect();
            if !train.route.iter().eq(next.iter()) {
                debug!(
                    "{} re-planned at {}: {} stops, cost {}{}",
                    train.id,
                    network.name(train.head),
                    next.len(),
                    route.total_cost,
                    if route.blocked_edges.is_empty() { "" } else { " (through occupied block)" },
                );
            }
            train.route = next.into();
            Ok(true)
        }
        Err(NetworkError::NoRoute { from, to }) => {
            warn!(
                "{}: no route from {} to {}; holding",
                train.id,
                network.name(from),
                network.name(to),
            );
            train.route.clear();
            train.route_failed = true;
            train.speed_mps = 0.0;
            train.status = TrainStatus::Waiting;
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Advance `train` by one tick under `supervision`.
///
/// 1. New speed = `max(0, min(v + accel_step, ceiling, v_max))`, taken
///    instantly.
/// 2. The train moves `speed × dt` metres.  At each node it crosses it either
///    arrives (destination), or re-plans and enters the next segment if that
///    block is free, carrying the leftover distance; otherwise it stops at
///    the boundary and waits.
///
/// Occupancy moves with the train via [`OccupancyTable::transfer`].
pub fn advance<R: Router + ?Sized>(
    train:       &mut Train,
    supervision: &Supervision,
    network:     &TrackNetwork,
    occupancy:   &mut OccupancyTable,
    router:      &R,
    params:      &MotionParams,
) -> MotionResult<StepOutcome> {
    let mut out = StepOutcome::default();
    if train.is_arrived() {
        return Ok(out);
    }

    let speed = (train.speed_mps + params.accel_step_mps)
        .min(supervision.ceiling_mps)
        .min(train.max_speed_mps)
        .max(0.0);
    train.speed_mps = speed;
    train.ceiling_mps = Some(supervision.ceiling_mps);

    let mut budget = speed * params.dt_secs;
    let mut crossed = false;

    loop {
        // ── Run along the current segment ─────────────────────────────────
        if let Some(edge) = train.edge {
            let remaining = network.edge_length(edge) - train.progress_m;
            if budget < remaining {
                train.progress_m += budget;
                out.moved_m += budget;
                break;
            }
            if remaining > 0.0 {
                train.progress_m = network.edge_length(edge);
                out.moved_m += remaining;
                budget -= remaining;
                crossed = true;
            }
        }

        // ── At node `head` ────────────────────────────────────────────────
        if train.head == train.destination {
            arrive(train, occupancy);
            out.arrived = true;
            break;
        }
        if budget <= 0.0 {
            break;
        }
        if crossed && !train.route_failed && !replan(train, network, occupancy, router)? {
            break;
        }
        let Some(&(next_edge, next)) = train.route.front() else {
            // End of a truncated route: hold here.
            train.speed_mps = 0.0;
            break;
        };
        if !network.joins(next_edge, train.head, next) {
            return Err(MotionError::BrokenRoute { train: train.id.clone(), from: train.head, to: next });
        }

        if !occupancy.is_free_for(next_edge, &train.id) {
            train.speed_mps = 0.0;
            out.blocked_at = Some(train.head);
            break;
        }
        occupancy.transfer(train.edge, next_edge, &train.id)?;
        train.edge = Some(next_edge);
        train.tail = train.head;
        train.head = next;
        train.progress_m = 0.0;
        train.route.pop_front();
        out.entered.push(next_edge);
        crossed = false;
    }

    train.status = if train.is_arrived() {
        TrainStatus::Arrived
    } else if supervision.emergency {
        TrainStatus::EmergencyBraking
    } else if train.speed_mps <= 0.0 {
        TrainStatus::Waiting
    } else {
        TrainStatus::EnRoute
    };
    Ok(out)
}

/// Park the train at its destination and free its block.
fn arrive(train: &mut Train, occupancy: &mut OccupancyTable) {
    if let Some(edge) = train.edge.take() {
        occupancy.release(edge, &train.id);
    }
    train.tail = train.head;
    train.progress_m = 0.0;
    train.speed_mps = 0.0;
    train.route.clear();
    train.status = TrainStatus::Arrived;
    info!("{} arrived at node {}", train.id, train.head);
}
