//! `rg-sim` — world state, tick loop, and the real-time scheduler for the
//! railguard simulator.
//!
//! # Tick phases
//!
//! ```text
//! every tick, trains visited in ascending TrainId order:
//!   ① Re-plan    — trains standing at a node get a fresh occupancy-aware
//!                  route from there.
//!   ② Supervise  — speed ceiling per train from tick-start state
//!                  (parallel with the `parallel` feature).
//!   ③ Monitor    — trains already inside another train's safety bubble
//!                  are reported as SafetyAlerts.
//!   ④ Advance    — speed update, movement, block entry, arrival.
//! ```
//!
//! A tick computes on a scratch copy of the trains and the occupancy table
//! and commits only if every phase succeeds.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`world`]     | `World`, `TickReport`, `PathQuery` — state and tick loop |
//! | [`snapshot`]  | `StateSnapshot`, `TrainSnapshot`, `OccupancyEntry`       |
//! | [`builder`]   | `SimBuilder`                                             |
//! | [`scheduler`] | `Scheduler`, `SchedulerState`, `SimHandle`               |
//! | [`observer`]  | `SimObserver`, `NoopObserver`                            |
//! | [`error`]     | `SimError`, `ValidationError`, `SimResult<T>`            |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                               |
//! |------------|------------------------------------------------------|
//! | `parallel` | Runs the supervision phase on Rayon's thread pool.   |
//! | `serde`    | Serde derives on snapshots, reports and the network. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rg_core::{SimConfig, TrainKind};
//! use rg_motion::TrainSpec;
//! use rg_sim::{Scheduler, SimBuilder};
//!
//! let world = SimBuilder::new(SimConfig::default(), network).build()?;
//! let mut scheduler = Scheduler::new(world);
//! let handle = scheduler.handle();
//! scheduler.start()?;
//! handle.dispatch(TrainSpec::new("Express_1", a, b, TrainKind::Express, 1))?;
//! let snapshot = handle.get_state_snapshot()?;
//! scheduler.stop()?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod snapshot;
pub mod world;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult, ValidationError};
pub use observer::{NoopObserver, SimObserver};
pub use scheduler::{Scheduler, SchedulerState, SimHandle};
pub use snapshot::{OccupancyEntry, StateSnapshot, TrainSnapshot};
pub use world::{PathQuery, TickReport, World};
