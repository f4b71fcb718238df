//! The `OutputWriter` trait implemented by trace backends.

use crate::{OutputResult, TickSummaryRow, TrainSnapshotRow};

/// Sink for per-train snapshot rows and per-tick summaries.
///
/// Errors are returned here; [`SimOutputObserver`][crate::SimOutputObserver]
/// stores the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of train snapshots.
    fn write_snapshots(&mut self, rows: &[TrainSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
