//! `rg-motion` — train state, block occupancy, braking supervision, and the
//! per-tick kinematics.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`train`]       | `Train`, `TrainStatus`, `TrainSpec`                           |
//! | [`occupancy`]   | `OccupancyTable` — `EdgeId → TrainId`, one occupant per edge  |
//! | [`braking`]     | braking distance, safe speed, hazard search, `supervise`      |
//! | [`kinematics`]  | `MotionParams`, `replan`, `advance` — one train, one tick     |
//! | [`error`]       | `MotionError`, `MotionResult<T>`                              |
//!
//! # Movement model
//!
//! Discrete time.  Each tick a train:
//!
//! 1. is re-planned if it stands at a node ([`kinematics::replan`]);
//! 2. gets a speed ceiling from the supervisor ([`braking::supervise`]);
//! 3. takes the new speed `min(v + accel_step, ceiling, v_max)` instantly and
//!    moves `v × dt` metres ([`kinematics::advance`]), crossing nodes into
//!    free blocks or stopping at the boundary of an occupied one.

pub mod braking;
pub mod error;
pub mod kinematics;
pub mod occupancy;
pub mod train;


pub use braking::{Hazard, SafetyAlert, Supervision};
pub use error::{MotionError, MotionResult};
pub use kinematics::{MotionParams, StepOutcome};
pub use occupancy::OccupancyTable;
pub use train::{Train, TrainSpec, TrainStatus};
