//! Simulation observer trait for progress reporting and data collection.

use rg_core::Tick;

use crate::{StateSnapshot, TickReport};

/// Callbacks invoked by [`World::run_ticks`][crate::World::run_ticks] and the
/// [`Scheduler`][crate::Scheduler] tick thread.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  The scheduler calls them outside the
/// world lock: `on_tick_start` before the tick runs, the rest after it
/// commits.  Slow observers delay the next tick but never block readers.
///
/// # Example — arrival printer
///
/// ```rust,ignore
/// struct Arrivals;
///
/// impl SimObserver for Arrivals {
///     fn on_tick_end(&mut self, report: &TickReport) {
///         for id in &report.arrivals {
///             println!("{}: {id} arrived", report.tick);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before each tick with the tick about to be processed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after each successful tick.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called every `config.output_interval_ticks` ticks with the state just
    /// committed.
    fn on_snapshot(&mut self, _tick: Tick, _snapshot: &StateSnapshot) {}

    /// Called once when a run ends.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
