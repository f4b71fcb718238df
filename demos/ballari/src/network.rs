//! Ballari–Hosapete corridor.
//!
//! Seven nodes: three stations on the main line, two intermediate signals,
//! a loop siding between Ballari Junction and Toranagallu, and the Hosapete
//! branch.  Positions are schematic, in kilometres.

use rg_core::{NodeId, Point};
use rg_network::{NetworkResult, NodeKind, TrackNetwork, TrackNetworkBuilder};

/// Named nodes of the corridor.
#[derive(Copy, Clone, Debug)]
pub struct Corridor {
    pub ballari:     NodeId,
    pub signal_blr:  NodeId,
    pub siding:      NodeId,
    pub toranagallu: NodeId,
    pub signal_tor:  NodeId,
    pub kudligi:     NodeId,
    pub hosapete:    NodeId,
}

/// `km` and `min` as on the working timetable.
fn track(b: &mut TrackNetworkBuilder, a: NodeId, z: NodeId, km: f64, min: u32) -> NetworkResult<()> {
    b.add_track(a, z, km * 1_000.0, min * 60)?;
    Ok(())
}

pub fn build_network() -> NetworkResult<(TrackNetwork, Corridor)> {
    let mut b = TrackNetworkBuilder::new();

    let c = Corridor {
        ballari:     b.add_node("Ballari Junction", NodeKind::Station,  Point::new(0.0, 0.0))?,
        signal_blr:  b.add_node("Signal_BLR_1",     NodeKind::Signal,   Point::new(10.0, 0.0))?,
        siding:      b.add_node("Siding_Entry",     NodeKind::Junction, Point::new(11.0, -6.0))?,
        toranagallu: b.add_node("Toranagallu",      NodeKind::Station,  Point::new(24.0, 0.0))?,
        signal_tor:  b.add_node("Signal_TOR_1",     NodeKind::Signal,   Point::new(29.0, 0.0))?,
        kudligi:     b.add_node("Kudligi",          NodeKind::Station,  Point::new(48.0, 0.0))?,
        hosapete:    b.add_node("Hosapete",         NodeKind::Station,  Point::new(36.0, -20.0))?,
    };

    // Main line.
    track(&mut b, c.ballari,     c.signal_blr,  10.0,  8)?;
    track(&mut b, c.signal_blr,  c.toranagallu, 15.0, 12)?;
    track(&mut b, c.toranagallu, c.signal_tor,   5.0,  4)?;
    track(&mut b, c.signal_tor,  c.kudligi,     20.0, 15)?;
    // Hosapete branch.
    track(&mut b, c.toranagallu, c.hosapete,    25.0, 20)?;
    // Loop through the siding, slower than the main line.
    track(&mut b, c.ballari,     c.siding,      12.0, 15)?;
    track(&mut b, c.siding,      c.toranagallu, 12.0, 15)?;

    Ok((b.build(), c))
}
