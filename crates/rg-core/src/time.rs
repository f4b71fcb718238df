//! Simulation time model and run configuration.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  `SimClock` maps ticks
//! to simulated seconds:
//!
//!   sim_time = start_unix_secs + tick * tick_duration_secs
//!
//! The default tick is one simulated second.  The wall-clock pacing of the
//! real-time scheduler (`tick_interval_ms`) is independent of the simulated
//! tick duration, so a run can be fast-forwarded without touching the physics.

use std::fmt;

use crate::{RgError, RgResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
///
/// The clock keeps counting across resets: a reset empties the world, it does
/// not rewind time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// Simulated seconds per tick.  Default: 1.
    pub tick_duration_secs: u32,
    /// The current tick — advanced once per completed tick.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Simulated seconds per tick as `f64`, for the kinematics.
    #[inline]
    pub fn dt_secs(&self) -> f64 {
        self.tick_duration_secs as f64
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// Elapsed time as (hours, minutes, seconds) since sim start.
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total = self.elapsed_secs().max(0) as u64;
        let hours = total / 3_600;
        let minutes = ((total % 3_600) / 60) as u32;
        let seconds = (total % 60) as u32;
        (hours, minutes, seconds)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} ({:02}:{:02}:{:02})", self.current_tick, h, m, s)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// What the scheduler does after a reset command.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResetPolicy {
    /// Keep ticking over the now-empty world.
    #[default]
    KeepRunning,
    /// Pause the tick thread until `resume` is called.
    Pause,
}

/// Top-level simulation configuration.
///
/// Typically built in code or deserialized (feature `serde`) by the
/// application and handed to `rg_sim::SimBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Simulated seconds per tick.  Default: 1.
    pub tick_duration_secs: u32,

    /// Wall-clock milliseconds between tick starts in the real-time
    /// scheduler.  Default: 1000.
    pub tick_interval_ms: u64,

    /// Speed gained per tick when unconstrained, in km/h.  Default: 10.
    pub accel_step_kmh: f64,

    /// Clearance kept in front of an occupied block beyond the braking
    /// distance, in metres.  Default: 200.
    pub safety_buffer_m: f64,

    /// How far ahead along its route the supervisor looks for hazards, in
    /// metres.  Beyond this no speed ceiling below line speed is imposed.
    pub lookahead_m: f64,

    /// Cost added by the router for an edge held by another train.  Must
    /// dwarf any real path cost.
    pub occupied_penalty: u64,

    /// Behaviour of the scheduler after a reset.
    pub reset_policy: ResetPolicy,

    /// Observer snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:       0,
            tick_duration_secs:    1,
            tick_interval_ms:      1_000,
            accel_step_kmh:        10.0,
            safety_buffer_m:       200.0,
            lookahead_m:           20_000.0,
            occupied_penalty:      1_000_000_000,
            reset_policy:          ResetPolicy::KeepRunning,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }

    /// Reject values that would break the kinematics or the scheduler.
    pub fn validate(&self) -> RgResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(RgError::Config("tick_duration_secs must be > 0".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(RgError::Config("tick_interval_ms must be > 0".into()));
        }
        if !(self.accel_step_kmh.is_finite() && self.accel_step_kmh >= 0.0) {
            return Err(RgError::Config(format!(
                "accel_step_kmh must be finite and >= 0, got {}",
                self.accel_step_kmh
            )));
        }
        if !(self.safety_buffer_m.is_finite() && self.safety_buffer_m >= 0.0) {
            return Err(RgError::Config(format!(
                "safety_buffer_m must be finite and >= 0, got {}",
                self.safety_buffer_m
            )));
        }
        if !(self.lookahead_m.is_finite() && self.lookahead_m > 0.0) {
            return Err(RgError::Config(format!(
                "lookahead_m must be finite and > 0, got {}",
                self.lookahead_m
            )));
        }
        if self.occupied_penalty == 0 {
            return Err(RgError::Config("occupied_penalty must be > 0".into()));
        }
        Ok(())
    }
}
