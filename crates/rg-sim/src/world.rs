//! The `World` struct and its tick loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, info, warn};

use rg_core::{NodeId, SimClock, SimConfig, Tick, TrainId, TrainKind};
use rg_motion::braking::{self, Supervision};
use rg_motion::kinematics;
use rg_motion::{Hazard, MotionError, MotionParams, OccupancyTable, SafetyAlert, Train, TrainSpec};
use rg_network::{EdgeOccupancy, NetworkView, Route, Router, TrackNetwork};

use crate::snapshot::{OccupancyEntry, StateSnapshot, TrainSnapshot};
use crate::{SimObserver, SimResult, ValidationError};

// ── Reports ───────────────────────────────────────────────────────────────────

/// What one committed tick did.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// Ticks completed, including this one.
    pub tick:             Tick,
    pub unix_time_secs:   i64,
    /// Trains not yet arrived after the tick.
    pub active_trains:    usize,
    /// Trains at speed zero after the tick: held, route-failed, or braked to a
    /// stand.
    pub waiting_trains:   usize,
    pub arrivals:         Vec<TrainId>,
    /// Trains whose speed was above their ceiling at the start of the tick.
    pub emergency_brakes: Vec<TrainId>,
    pub alerts:           Vec<SafetyAlert>,
}

/// Answer to [`World::plan_path`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathQuery {
    pub route:    Route,
    /// Blocks held at the time of the query.
    pub occupied: Vec<OccupancyEntry>,
}

// ── World ─────────────────────────────────────────────────────────────────────

/// All simulation state: the immutable network, the trains, and the block
/// occupancy table.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  Drive it directly with
/// [`tick`](World::tick) / [`run_ticks`](World::run_ticks), or hand it to a
/// [`Scheduler`][crate::Scheduler] for real-time stepping.
pub struct World {
    pub config: SimConfig,
    pub clock:  SimClock,

    network: Arc<TrackNetwork>,
    /// Export form of `network`, built once.
    view:    Arc<NetworkView>,
    router:  Arc<dyn Router>,
    params:  MotionParams,

    /// Keyed by id; iteration order is the processing order.
    trains:    BTreeMap<TrainId, Train>,
    occupancy: OccupancyTable,
}

impl World {
    pub(crate) fn new(config: SimConfig, network: TrackNetwork, router: Arc<dyn Router>) -> Self {
        let view = Arc::new(NetworkView::of(&network));
        Self {
            clock:     config.make_clock(),
            params:    MotionParams::from_config(&config),
            config,
            network:   Arc::new(network),
            view,
            router,
            trains:    BTreeMap::new(),
            occupancy: OccupancyTable::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn network(&self) -> &Arc<TrackNetwork> {
        &self.network
    }

    pub fn network_view(&self) -> Arc<NetworkView> {
        Arc::clone(&self.view)
    }

    pub fn train(&self, id: &TrainId) -> Option<&Train> {
        self.trains.get(id)
    }

    pub fn trains(&self) -> impl Iterator<Item = &Train> + '_ {
        self.trains.values()
    }

    pub fn train_count(&self) -> usize {
        self.trains.len()
    }

    pub fn occupancy(&self) -> &OccupancyTable {
        &self.occupancy
    }

    #[cfg(test)]
    pub(crate) fn occupancy_mut(&mut self) -> &mut OccupancyTable {
        &mut self.occupancy
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Put a new train on the network at `spec.origin` and plan its route.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] if the request is malformed; the world is left
    /// unchanged.  An unreachable destination is not an error: the train is
    /// added with `route_failed` set and stays waiting.
    pub fn dispatch(&mut self, spec: TrainSpec) -> SimResult<TrainId> {
        self.validate(&spec)?;

        let mut train = Train::new(spec);
        kinematics::replan(&mut train, &self.network, &self.occupancy, &*self.router)?;

        let id = train.id.clone();
        info!(
            "dispatched {} ({}) {} -> {}",
            id,
            train.kind,
            self.network.name(train.origin),
            self.network.name(train.destination),
        );
        self.trains.insert(id.clone(), train);
        Ok(id)
    }

    /// Dispatch with a generated id `"<Kind>_<n>"`, using the lowest `n ≥ 1`
    /// not already taken.
    pub fn dispatch_auto(
        &mut self,
        kind:        TrainKind,
        origin:      NodeId,
        destination: NodeId,
        priority:    u8,
    ) -> SimResult<TrainId> {
        let id = (1u32..)
            .map(|n| TrainId::new(format!("{}_{n}", kind.as_str())))
            .find(|id| !self.trains.contains_key(id))
            .unwrap_or_else(|| TrainId::new(kind.as_str()));
        self.dispatch(TrainSpec::new(id, origin, destination, kind, priority))
    }

    /// Remove every train and free every block.  The clock keeps its tick.
    pub fn reset(&mut self) {
        let removed = self.trains.len();
        self.trains.clear();
        self.occupancy.clear();
        info!("reset at {}: removed {removed} trains", self.clock.current_tick);
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tick:           self.clock.current_tick,
            unix_time_secs: self.clock.current_unix_secs(),
            trains:         self.trains.values().map(TrainSnapshot::of).collect(),
            occupancy:      occupancy_entries(&self.occupancy),
        }
    }

    /// Route `from → to` against current occupancy without changing anything.
    /// Every held block counts as occupied.
    pub fn plan_path(&self, from: NodeId, to: NodeId) -> SimResult<PathQuery> {
        let route = self.router.route(&self.network, from, to, &self.occupancy, None)?;
        Ok(PathQuery { route, occupied: occupancy_entries(&self.occupancy) })
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Run one tick and commit it.
    ///
    /// # Errors
    ///
    /// [`MotionError::OccupancyConflict`] (wrapped) if two trains would hold
    /// the same block.  Nothing is committed and the clock does not advance.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        let now = self.clock.current_tick;
        let mut trains = self.trains.clone();
        let mut occupancy = self.occupancy.clone();

        let mut report = match step(&mut trains, &mut occupancy, &self.network, &*self.router, &self.params) {
            Ok(r) => r,
            Err(e) => {
                error!("tick {now} aborted, state unchanged: {e}");
                return Err(e);
            }
        };

        self.trains = trains;
        self.occupancy = occupancy;
        self.clock.advance();
        report.tick = self.clock.current_tick;
        report.unix_time_secs = self.clock.current_unix_secs();
        Ok(report)
    }

    /// Run exactly `n` ticks, calling observer hooks around each.
    ///
    /// Useful for tests and batch runs.  Stops at the first failed tick.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            observer.on_tick_start(self.clock.current_tick);
            let report = self.tick()?;
            observer.on_tick_end(&report);
            if self.snapshot_due(report.tick) {
                observer.on_snapshot(report.tick, &self.snapshot());
            }
        }
        Ok(())
    }

    pub(crate) fn snapshot_due(&self, tick: Tick) -> bool {
        self.config.output_interval_ticks > 0 && tick.0.is_multiple_of(self.config.output_interval_ticks)
    }

    fn validate(&self, spec: &TrainSpec) -> Result<(), ValidationError> {
        if spec.id.is_empty() {
            return Err(ValidationError::EmptyTrainId);
        }
        if self.trains.contains_key(&spec.id) {
            return Err(ValidationError::DuplicateTrainId(spec.id.clone()));
        }
        for node in [spec.origin, spec.destination] {
            if !self.network.contains_node(node) {
                return Err(ValidationError::UnknownNode(node));
            }
        }
        if spec.origin == spec.destination {
            return Err(ValidationError::SameOriginDestination(spec.origin));
        }
        for (what, value) in [("max_speed_kmh", spec.max_speed_kmh), ("braking_rate", spec.braking_rate)] {
            if let Some(v) = value.filter(|v| !(v.is_finite() && *v > 0.0)) {
                return Err(ValidationError::InvalidOverride { what, value: v });
            }
        }
        Ok(())
    }
}

// ── Tick phases ───────────────────────────────────────────────────────────────

/// One tick over `trains` and `occupancy`, which the caller discards on error.
fn step(
    trains:    &mut BTreeMap<TrainId, Train>,
    occupancy: &mut OccupancyTable,
    network:   &TrackNetwork,
    router:    &dyn Router,
    params:    &MotionParams,
) -> SimResult<TickReport> {
    let mut report = TickReport::default();

    // ── Phase 1: re-plan trains standing at a node ────────────────────────
    for train in trains.values_mut() {
        if !train.is_arrived() && !train.route_failed && train.at_boundary(network) {
            kinematics::replan(train, network, occupancy, router)?;
        }
    }

    // ── Phase 2: supervision from tick-start state ────────────────────────
    let supervision = supervise_all(trains, network, occupancy, params);

    // ── Phase 3: safety-bubble monitor ────────────────────────────────────
    for (train, sup) in trains.values().zip(&supervision) {
        let Some(hazard) = &sup.hazard else { continue };
        let Hazard::Occupied { holder, .. } = hazard else { continue };
        let Some(holder) = trains.get(holder) else {
            continue;
        };
        if let Some(alert) = braking::check_separation(train, hazard, holder, network, params.safety_buffer_m) {
            warn!(
                "{} inside safety bubble of {}: needs {:.0} m, has {:.0} m",
                alert.train, alert.holder, alert.required_m, alert.actual_m,
            );
            report.alerts.push(alert);
        }
    }

    // ── Phase 4: advance, ascending TrainId ───────────────────────────────
    for (train, sup) in trains.values_mut().zip(&supervision) {
        if train.is_arrived() {
            continue;
        }
        let entry_speed = train.speed_mps;
        let out = kinematics::advance(train, sup, network, occupancy, router, params)?;
        if sup.emergency {
            warn!(
                "{} emergency braking: {:.1} m/s over ceiling {:.1} m/s",
                train.id, entry_speed, sup.ceiling_mps,
            );
            report.emergency_brakes.push(train.id.clone());
        }
        if out.arrived {
            report.arrivals.push(train.id.clone());
        }
    }

    verify_occupancy(trains, occupancy)?;

    for train in trains.values().filter(|t| !t.is_arrived()) {
        report.active_trains += 1;
        if train.speed_mps <= 0.0 {
            report.waiting_trains += 1;
        }
    }
    Ok(report)
}

fn supervise_all(
    trains:    &BTreeMap<TrainId, Train>,
    network:   &TrackNetwork,
    occupancy: &OccupancyTable,
    params:    &MotionParams,
) -> Vec<Supervision> {
    #[cfg(not(feature = "parallel"))]
    {
        trains
            .values()
            .map(|train| braking::supervise(train, network, occupancy, params))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let list: Vec<&Train> = trains.values().collect();
        list.par_iter()
            .map(|train| braking::supervise(train, network, occupancy, params))
            .collect()
    }
}

/// No train may sit on a segment recorded as another train's.
fn verify_occupancy(trains: &BTreeMap<TrainId, Train>, occupancy: &OccupancyTable) -> SimResult<()> {
    for train in trains.values() {
        let Some(edge) = train.edge else { continue };
        if let Some(holder) = occupancy.occupant(edge).filter(|&h| h != &train.id) {
            return Err(MotionError::OccupancyConflict {
                edge,
                holder:   holder.clone(),
                claimant: train.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn occupancy_entries(occupancy: &OccupancyTable) -> Vec<OccupancyEntry> {
    occupancy
        .iter()
        .map(|(edge, train)| OccupancyEntry { edge, train: train.clone() })
        .collect()
}
