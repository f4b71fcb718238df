//! `rg-output` — trace writers for the railguard simulator.
//!
//! | Backend | Files created                                   |
//! |---------|-------------------------------------------------|
//! | CSV     | `train_snapshots.csv`, `tick_summaries.csv`     |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `rg_sim::SimObserver`, so the same
//! observer works with `World::run_ticks` and with the real-time
//! `Scheduler`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rg_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! world.run_ticks(600, &mut obs)?;
//! obs.on_sim_end(world.clock.current_tick);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{TickSummaryRow, TrainSnapshotRow};
pub use writer::OutputWriter;
