//! `rg-core` — foundational types for the `railguard` train simulator.
//!
//! This crate is a dependency of every other `rg-*` crate.  It has no `rg-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`, `TrainId`                           |
//! | [`geo`]       | `Point` (layout coordinates), euclidean distance        |
//! | [`time`]      | `Tick`, `SimClock`, `SimConfig`, `ResetPolicy`          |
//! | [`kind`]      | `TrainKind` and its default performance profile         |
//! | [`units`]     | km/h ↔ m/s conversion                                   |
//! | [`error`]     | `RgError`, `RgResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod kind;
pub mod time;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RgError, RgResult};
pub use geo::Point;
pub use ids::{EdgeId, NodeId, TrainId};
pub use kind::{KindProfile, TrainKind};
pub use time::{ResetPolicy, SimClock, SimConfig, Tick};
pub use units::{kmh_to_mps, mps_to_kmh};
