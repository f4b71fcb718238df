//! Real-time tick thread and the shared-state handle.
//!
//! The [`Scheduler`] owns one background thread that ticks the shared
//! [`World`] every `config.tick_interval_ms`.  A tick is one critical section
//! on the world mutex; the thread then sleeps for the rest of the interval.
//! An overrunning tick delays the next one, never overlaps it.
//!
//! [`SimHandle`] is the cloneable boundary used by every other thread.  Each
//! call takes the same mutex for exactly its own state access and hands back
//! owned data.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info};

use rg_core::{NodeId, ResetPolicy, Tick, TrainId, TrainKind};
use rg_motion::TrainSpec;
use rg_network::NetworkView;

use crate::{NoopObserver, PathQuery, SimError, SimObserver, SimResult, StateSnapshot, World};

// ── Scheduler state ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Built, thread not started.
    Idle,
    Running,
    /// Thread alive, ticks suspended.
    Paused,
    /// Thread joined.  Terminal.
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerState::Idle    => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Paused  => "paused",
            SchedulerState::Stopped => "stopped",
        })
    }
}

/// Flags shared between the scheduler, its thread, and every handle.
#[derive(Default)]
struct Control {
    shutdown: AtomicBool,
    paused:   AtomicBool,
    /// The tick thread is live (started, not yet stopped).
    running:  AtomicBool,
}

// ── SimHandle ─────────────────────────────────────────────────────────────────

/// Cloneable access to the shared world.
///
/// Every method returns [`SimError::LockPoisoned`] if a thread panicked while
/// holding the world lock and the tick thread has not yet recovered it.
#[derive(Clone)]
pub struct SimHandle {
    pub(crate) world: Arc<Mutex<World>>,
    control:          Arc<Control>,
    view:             Arc<NetworkView>,
}

impl SimHandle {
    fn lock(&self) -> SimResult<MutexGuard<'_, World>> {
        self.world.lock().map_err(|_| SimError::LockPoisoned)
    }

    /// Owned copy of the state after the last committed tick.
    pub fn get_state_snapshot(&self) -> SimResult<StateSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// The static network.  Computed once; never takes the lock.
    pub fn get_network(&self) -> Arc<NetworkView> {
        Arc::clone(&self.view)
    }

    pub fn dispatch(&self, spec: TrainSpec) -> SimResult<TrainId> {
        self.lock()?.dispatch(spec)
    }

    pub fn dispatch_auto(
        &self,
        kind:        TrainKind,
        origin:      NodeId,
        destination: NodeId,
        priority:    u8,
    ) -> SimResult<TrainId> {
        self.lock()?.dispatch_auto(kind, origin, destination, priority)
    }

    /// Clear all trains and occupancy.  With [`ResetPolicy::Pause`] a running
    /// scheduler is paused until [`Scheduler::resume`]; one not yet started
    /// is left to start normally.
    pub fn reset(&self) -> SimResult<()> {
        let policy = {
            let mut world = self.lock()?;
            world.reset();
            world.config.reset_policy
        };
        if policy == ResetPolicy::Pause
            && self.control.running.load(Ordering::Acquire)
            && !self.control.paused.swap(true, Ordering::AcqRel)
        {
            info!("scheduler paused after reset");
        }
        Ok(())
    }

    pub fn plan_path(&self, from: NodeId, to: NodeId) -> SimResult<PathQuery> {
        self.lock()?.plan_path(from, to)
    }

    /// Ticks completed so far.
    pub fn current_tick(&self) -> SimResult<Tick> {
        Ok(self.lock()?.clock.current_tick)
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Drives a [`World`] in real time on a background thread.
///
/// ```text
/// Idle ──start──▶ Running ◀──resume── Paused
///                    │ ──pause/reset(Pause)──▶ │
///                    └────────stop────────────┴──▶ Stopped
/// ```
pub struct Scheduler {
    handle:   SimHandle,
    interval: Duration,
    thread:   Option<JoinHandle<()>>,
    stopped:  bool,
}

impl Scheduler {
    pub fn new(world: World) -> Self {
        let interval = Duration::from_millis(world.config.tick_interval_ms);
        let view = world.network_view();
        Self {
            handle: SimHandle {
                world:   Arc::new(Mutex::new(world)),
                control: Arc::new(Control::default()),
                view,
            },
            interval,
            thread:  None,
            stopped: false,
        }
    }

    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SchedulerState {
        if self.stopped {
            SchedulerState::Stopped
        } else if self.thread.is_none() {
            SchedulerState::Idle
        } else if self.handle.control.paused.load(Ordering::Acquire) {
            SchedulerState::Paused
        } else {
            SchedulerState::Running
        }
    }

    /// Start ticking with no observer.
    pub fn start(&mut self) -> SimResult<()> {
        self.start_with(NoopObserver)
    }

    /// Start the tick thread.  `observer` moves onto it and receives every
    /// tick report, the periodic snapshots, and `on_sim_end` at stop.
    pub fn start_with<O>(&mut self, observer: O) -> SimResult<()>
    where
        O: SimObserver + Send + 'static,
    {
        self.expect_state("start", &[SchedulerState::Idle])?;
        let world = Arc::clone(&self.handle.world);
        let control = Arc::clone(&self.handle.control);
        let interval = self.interval;
        let thread = thread::Builder::new()
            .name("rg-tick".into())
            .spawn(move || run_loop(&world, &control, interval, observer))?;
        self.thread = Some(thread);
        self.handle.control.running.store(true, Ordering::Release);
        info!("scheduler started, interval {} ms", interval.as_millis());
        Ok(())
    }

    pub fn pause(&mut self) -> SimResult<()> {
        self.expect_state("pause", &[SchedulerState::Running, SchedulerState::Paused])?;
        if !self.handle.control.paused.swap(true, Ordering::AcqRel) {
            info!("scheduler paused");
        }
        Ok(())
    }

    pub fn resume(&mut self) -> SimResult<()> {
        self.expect_state("resume", &[SchedulerState::Running, SchedulerState::Paused])?;
        if self.handle.control.paused.swap(false, Ordering::AcqRel) {
            info!("scheduler resumed");
            self.wake();
        }
        Ok(())
    }

    /// Stop and join the tick thread.  A tick in progress completes first.
    /// Stopping an idle scheduler just marks it stopped.
    pub fn stop(&mut self) -> SimResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.handle.control.running.store(false, Ordering::Release);
        self.handle.control.shutdown.store(true, Ordering::Release);
        self.wake();
        match self.thread.take() {
            Some(thread) => {
                thread.join().map_err(|_| SimError::TickThreadPanicked)?;
                info!("scheduler stopped");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Interrupt the inter-tick sleep.
    fn wake(&self) {
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }

    fn expect_state(&self, action: &'static str, allowed: &[SchedulerState]) -> SimResult<()> {
        let state = self.state();
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(SimError::InvalidTransition { action, state })
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("scheduler shutdown: {e}");
        }
    }
}

// ── Tick thread ───────────────────────────────────────────────────────────────

fn run_loop<O: SimObserver>(world: &Mutex<World>, control: &Control, interval: Duration, mut observer: O) {
    loop {
        if control.shutdown.load(Ordering::Acquire) {
            break;
        }
        let tick_start = Instant::now();

        if !control.paused.load(Ordering::Acquire) {
            tick_once(world, &mut observer);
        }

        // Sleep for the remaining budget; unpark cuts it short.
        let deadline = tick_start + interval;
        loop {
            if control.shutdown.load(Ordering::Acquire) {
                break;
            }
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else { break };
            if remaining.is_zero() {
                break;
            }
            thread::park_timeout(remaining);
        }
    }

    let final_tick = match world.lock() {
        Ok(w)         => w.clock.current_tick,
        Err(poisoned) => poisoned.into_inner().clock.current_tick,
    };
    observer.on_sim_end(final_tick);
}

/// One scheduled tick.  Observer hooks run outside the lock:
/// `on_tick_start` before the tick is taken, the rest after it commits.
///
/// A poisoned lock is logged and cleared and the tick skipped; the next
/// interval retries.  A failed tick has already been rolled back by
/// [`World::tick`].
pub(crate) fn tick_once<O: SimObserver>(world: &Mutex<World>, observer: &mut O) {
    // Only this thread advances the clock, so `now` holds until the tick.
    let Some(now) = lock_or_recover(world).map(|w| w.clock.current_tick) else { return };
    observer.on_tick_start(now);

    let outcome = {
        let Some(mut guard) = lock_or_recover(world) else { return };
        guard.tick().map(|report| {
            let snapshot = guard.snapshot_due(report.tick).then(|| guard.snapshot());
            (report, snapshot)
        })
    };

    match outcome {
        Ok((report, snapshot)) => {
            observer.on_tick_end(&report);
            if let Some(snapshot) = snapshot {
                observer.on_snapshot(report.tick, &snapshot);
            }
        }
        Err(e) => error!("tick {now} failed, retrying next interval: {e}"),
    }
}

fn lock_or_recover(world: &Mutex<World>) -> Option<MutexGuard<'_, World>> {
    match world.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            error!("world lock poisoned; skipping tick");
            world.clear_poison();
            None
        }
    }
}
