//! Ballari corridor run.
//!
//! Dispatches a staged sequence of Express, Local and Goods trains on the
//! Ballari–Hosapete corridor, steps the world until every train has arrived,
//! and writes:
//!
//! - `output/ballari/train_snapshots.csv` and `tick_summaries.csv`
//! - `output/ballari/network.json` (static layout)
//! - `output/ballari/state.json` (final snapshot)
//!
//! A short real-time segment then drives a fresh train from the tick thread
//! through a `SimHandle`, the way a UI or HTTP layer would.
//!
//! Run with:
//!   cargo run -p ballari --release

mod network;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use rg_core::{NodeId, ResetPolicy, SimConfig, Tick, TrainKind};
use rg_motion::TrainStatus;
use rg_output::{CsvWriter, SimOutputObserver};
use rg_sim::{SchedulerState, Scheduler, SimBuilder, SimObserver, StateSnapshot, TickReport, World};

use network::{build_network, Corridor};

// ── Simulation parameters ─────────────────────────────────────────────────────

/// 2024-01-01 06:00 IST.
const START_UNIX_SECS: i64 = 1_704_069_000;
/// Snapshot every simulated minute.
const OUTPUT_INTERVAL_TICKS: u64 = 60;
/// Simulated time between staged dispatches.
const DISPATCH_GAP_TICKS: u64 = 120;
/// Give up if the corridor has not cleared after this many ticks.
const MAX_TICKS: u64 = 4 * 3_600;
/// Wall-clock interval of the real-time segment.
const REALTIME_INTERVAL_MS: u64 = 20;
const REALTIME_RUN: Duration = Duration::from_secs(2);

const OUTPUT_DIR: &str = "output/ballari";

// ── Counting observer ─────────────────────────────────────────────────────────

/// Wraps `SimOutputObserver` and prints arrivals and safety events as they
/// happen.
struct CorridorObserver {
    inner:     SimOutputObserver<CsvWriter>,
    summaries: u64,
    snapshots: u64,
    arrivals:  u64,
    alerts:    u64,
    emergency: u64,
}

impl CorridorObserver {
    fn new(inner: SimOutputObserver<CsvWriter>) -> Self {
        Self { inner, summaries: 0, snapshots: 0, arrivals: 0, alerts: 0, emergency: 0 }
    }
}

impl SimObserver for CorridorObserver {
    fn on_tick_start(&mut self, tick: Tick) {
        self.inner.on_tick_start(tick);
    }

    fn on_tick_end(&mut self, report: &TickReport) {
        for id in &report.arrivals {
            println!("  [t={:>5}] {id} arrived", report.tick.0);
        }
        for alert in &report.alerts {
            println!(
                "  [t={:>5}] ALERT {} within {:.0} m of {} on edge {} (needs {:.0} m)",
                report.tick.0, alert.train, alert.actual_m, alert.holder, alert.edge.0, alert.required_m,
            );
        }
        self.summaries += 1;
        self.arrivals += report.arrivals.len() as u64;
        self.alerts += report.alerts.len() as u64;
        self.emergency += report.emergency_brakes.len() as u64;
        self.inner.on_tick_end(report);
    }

    fn on_snapshot(&mut self, tick: Tick, snapshot: &StateSnapshot) {
        self.snapshots += snapshot.trains.len() as u64;
        self.inner.on_snapshot(tick, snapshot);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Dispatch sequence ─────────────────────────────────────────────────────────

/// `(kind, origin, destination, priority)` in release order.
///
/// Every movement runs away from Ballari: the corridor is single line, and
/// two trains meeting head-on would each hold the block the other needs.
/// The second train leaves while the first still holds the main line out of
/// Ballari, so it is routed through the siding.
fn dispatch_sequence(c: &Corridor) -> [(TrainKind, NodeId, NodeId, u8); 6] {
    [
        (TrainKind::Express, c.ballari,     c.kudligi,     1),
        (TrainKind::Local,   c.ballari,     c.hosapete,    2),
        (TrainKind::Goods,   c.toranagallu, c.kudligi,     3),
        (TrainKind::Local,   c.ballari,     c.toranagallu, 2),
        (TrainKind::Express, c.ballari,     c.hosapete,    1),
        (TrainKind::Goods,   c.ballari,     c.kudligi,     3),
    ]
}

fn all_arrived(world: &World) -> bool {
    world.trains().all(|t| t.status == TrainStatus::Arrived || t.route_failed)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== Ballari corridor ===");
    println!();

    // 1. Network.
    let (net, corridor) = build_network()?;
    println!("Network: {} nodes, {} track segments", net.node_count(), net.edge_count());

    // 2. Config and world.
    let config = SimConfig {
        start_unix_secs:       START_UNIX_SECS,
        tick_interval_ms:      REALTIME_INTERVAL_MS,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        reset_policy:          ResetPolicy::KeepRunning,
        ..SimConfig::default()
    };
    let mut world = SimBuilder::new(config, net).build()?;

    // 3. Output.
    let out = Path::new(OUTPUT_DIR);
    let writer = CsvWriter::new(out)?;
    let mut obs = CorridorObserver::new(SimOutputObserver::new(writer));
    write_json(&out.join("network.json"), world.network_view().as_ref())?;

    // 4. Staged dispatches.
    let t0 = Instant::now();
    for (kind, origin, destination, priority) in dispatch_sequence(&corridor) {
        let id = world.dispatch_auto(kind, origin, destination, priority)?;
        let route = world.train(&id).map(|t| t.planned_nodes()).unwrap_or_default();
        let names: Vec<&str> = route.iter().map(|&n| world.network().name(n)).collect();
        println!(
            "[t={:>5}] dispatch {id}: {} -> {} via {}",
            world.clock.current_tick.0,
            world.network().name(origin),
            world.network().name(destination),
            names.join(", "),
        );
        world.run_ticks(DISPATCH_GAP_TICKS, &mut obs)?;
    }

    // 5. Run until the corridor clears.
    while !all_arrived(&world) {
        if world.clock.current_tick.0 >= MAX_TICKS {
            bail!("corridor not clear after {MAX_TICKS} ticks");
        }
        world.run_ticks(OUTPUT_INTERVAL_TICKS, &mut obs)?;
    }
    obs.on_sim_end(world.clock.current_tick);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    let (h, m, s) = world.clock.elapsed_hms();
    println!();
    println!("Corridor clear at tick {} ({h:02}:{m:02}:{s:02} simulated) in {:.3} s",
        world.clock.current_tick.0, elapsed.as_secs_f64());
    println!("  arrivals          : {}", obs.arrivals);
    println!("  safety alerts     : {}", obs.alerts);
    println!("  emergency brakes  : {}", obs.emergency);
    println!("  train_snapshots.csv : {} rows", obs.snapshots);
    println!("  tick_summaries.csv  : {} rows", obs.summaries);
    println!();

    let snapshot = world.snapshot();
    write_json(&out.join("state.json"), &snapshot)?;

    println!("{:<12} {:<8} {:<10} {:<18}", "Train", "Kind", "Status", "At");
    println!("{}", "-".repeat(50));
    for t in &snapshot.trains {
        println!(
            "{:<12} {:<8} {:<10} {:<18}",
            t.id.as_str(),
            t.kind.as_str(),
            t.status.as_str(),
            world.network().name(t.to),
        );
    }
    println!();

    // 7. Real-time segment.
    world.reset();
    let mut scheduler = Scheduler::new(world);
    let handle = scheduler.handle();
    scheduler.start()?;

    let id = handle.dispatch_auto(TrainKind::Local, corridor.ballari, corridor.signal_blr, 2)?;
    println!("Real-time: dispatched {id}, running {} s at {REALTIME_INTERVAL_MS} ms/tick",
        REALTIME_RUN.as_secs());
    thread::sleep(REALTIME_RUN);

    scheduler.pause()?;
    let snap = handle.get_state_snapshot()?;
    println!("  paused at tick {} ({})", snap.tick.0, scheduler.state());
    if let Some(t) = snap.train(id.as_str()) {
        println!("  {id}: {} at {:.0} km/h, {:.0} m along", t.status.as_str(), t.speed_kmh, t.progress_m);
    }
    println!("{}", serde_json::to_string(&snap)?);

    scheduler.stop()?;
    debug_assert_eq!(scheduler.state(), SchedulerState::Stopped);

    Ok(())
}
