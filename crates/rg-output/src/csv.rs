//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `train_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickSummaryRow, TrainSnapshotRow};

pub const SNAPSHOT_HEADERS: [&str; 10] = [
    "tick", "train_id", "kind", "status", "speed_kmh",
    "edge", "from_node", "to_node", "progress_m", "destination",
];

pub const SUMMARY_HEADERS: [&str; 7] = [
    "tick", "unix_time_secs", "active_trains", "waiting_trains",
    "arrivals", "emergency_brakes", "safety_alerts",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create (or truncate) the two CSV files in `dir` and write the header
    /// rows.  `dir` is created if missing.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join("train_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADERS)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADERS)?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[TrainSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            let edge = if row.edge == u32::MAX { String::new() } else { row.edge.to_string() };
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.train_id.clone(),
                row.kind.to_owned(),
                row.status.to_owned(),
                format!("{:.2}", row.speed_kmh),
                edge,
                row.from_node.to_string(),
                row.to_node.to_string(),
                format!("{:.2}", row.progress_m),
                row.destination.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.active_trains.to_string(),
            row.waiting_trains.to_string(),
            row.arrivals.to_string(),
            row.emergency_brakes.to_string(),
            row.safety_alerts.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
