//! Plain data row types written by output backends.

use rg_sim::{StateSnapshot, TickReport, TrainSnapshot};

/// One train's state at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSnapshotRow {
    pub tick:        u64,
    pub train_id:    String,
    pub kind:        &'static str,
    pub status:      &'static str,
    pub speed_kmh:   f64,
    /// Segment held; `u32::MAX` when standing at a node or arrived.
    pub edge:        u32,
    pub from_node:   u32,
    pub to_node:     u32,
    pub progress_m:  f64,
    pub destination: u32,
}

impl TrainSnapshotRow {
    pub fn from_snapshot(tick: u64, train: &TrainSnapshot) -> Self {
        Self {
            tick,
            train_id:    train.id.as_str().to_owned(),
            kind:        train.kind.as_str(),
            status:      train.status.as_str(),
            speed_kmh:   train.speed_kmh,
            edge:        train.edge.map_or(u32::MAX, |e| e.0),
            from_node:   train.from.0,
            to_node:     train.to.0,
            progress_m:  train.progress_m,
            destination: train.destination.0,
        }
    }

    /// One row per train, in id order.
    pub fn all(snapshot: &StateSnapshot) -> Vec<Self> {
        snapshot
            .trains
            .iter()
            .map(|t| Self::from_snapshot(snapshot.tick.0, t))
            .collect()
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:             u64,
    pub unix_time_secs:   i64,
    pub active_trains:    u64,
    pub waiting_trains:   u64,
    pub arrivals:         u64,
    pub emergency_brakes: u64,
    pub safety_alerts:    u64,
}

impl From<&TickReport> for TickSummaryRow {
    fn from(report: &TickReport) -> Self {
        Self {
            tick:             report.tick.0,
            unix_time_secs:   report.unix_time_secs,
            active_trains:    report.active_trains as u64,
            waiting_trains:   report.waiting_trains as u64,
            arrivals:         report.arrivals.len() as u64,
            emergency_brakes: report.emergency_brakes.len() as u64,
            safety_alerts:    report.alerts.len() as u64,
        }
    }
}
