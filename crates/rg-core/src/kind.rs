//! Train kinds and their default performance envelope.
//!
//! Every dispatched train belongs to one kind.  The kind supplies a default
//! maximum speed and braking deceleration; a dispatch request may override
//! either value for an individual train.

use crate::units::kmh_to_mps;

/// Service category of a train.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrainKind {
    /// Fast long-distance passenger service.
    Express,
    /// Stopping passenger service.
    Local,
    /// Freight.  Default kind, matching the dispatch desk's fallback.
    #[default]
    Goods,
}

/// Default speed/braking figures for a [`TrainKind`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KindProfile {
    /// Line speed in km/h.
    pub max_speed_kmh: f64,
    /// Service braking deceleration in m/s².
    pub braking_rate: f64,
}

impl KindProfile {
    #[inline]
    pub fn max_speed_mps(&self) -> f64 {
        kmh_to_mps(self.max_speed_kmh)
    }
}

impl TrainKind {
    pub const ALL: [TrainKind; 3] = [TrainKind::Express, TrainKind::Local, TrainKind::Goods];

    pub fn profile(self) -> KindProfile {
        match self {
            TrainKind::Express => KindProfile { max_speed_kmh: 90.0, braking_rate: 0.8 },
            TrainKind::Local   => KindProfile { max_speed_kmh: 40.0, braking_rate: 0.8 },
            TrainKind::Goods   => KindProfile { max_speed_kmh: 30.0, braking_rate: 0.6 },
        }
    }

    /// Human-readable label, also the prefix of auto-generated train ids.
    pub fn as_str(self) -> &'static str {
        match self {
            TrainKind::Express => "Express",
            TrainKind::Local   => "Local",
            TrainKind::Goods   => "Goods",
        }
    }

    /// Case-insensitive parse of a category name (`"express"`, `"Goods"`…).
    pub fn parse(s: &str) -> Option<TrainKind> {
        TrainKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for TrainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
