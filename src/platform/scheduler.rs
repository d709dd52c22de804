//! Fixed-cadence simulation scheduler
//!
//! One background thread ticks the shared engine, hands a snapshot and the
//! tick's events to a frame sink, then sleeps out the rest of the period.
//! Late frames proceed immediately; nothing is skipped or caught up.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::consts::{MAX_FRAME_DELTA, TARGET_FPS};
use crate::engine::{SharedEngine, Snapshot};
use crate::error::SchedulerError;
use crate::sim::{Dimensions, SimEvent};

/// How the scheduler computes the delta handed to the physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingPolicy {
    /// Always `1 / target_fps`. Reproducible; the default.
    #[default]
    Fixed,
    /// Monotonic wall-clock delta, clamped to `max_delta`
    Measured,
}

impl TimingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingPolicy::Fixed => "fixed",
            TimingPolicy::Measured => "measured",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub target_fps: u32,
    pub policy: TimingPolicy,
    /// Upper bound on a measured delta, so a stall does not become a jump
    pub max_delta: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            policy: TimingPolicy::Fixed,
            max_delta: Duration::from_secs_f32(MAX_FRAME_DELTA),
        }
    }
}

impl SchedulerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    fn delta(&self, since_last: Duration) -> f32 {
        match self.policy {
            TimingPolicy::Fixed => self.period().as_secs_f32(),
            TimingPolicy::Measured => since_last.min(self.max_delta).as_secs_f32(),
        }
    }
}

/// Render trigger, called once per tick outside the engine lock
pub trait FrameSink: Send + 'static {
    fn present(&mut self, snapshot: &Snapshot, events: &[SimEvent]);
}

impl<F> FrameSink for F
where
    F: FnMut(&Snapshot, &[SimEvent]) + Send + 'static,
{
    fn present(&mut self, snapshot: &Snapshot, events: &[SimEvent]) {
        self(snapshot, events)
    }
}

/// Handle to a running simulation loop. Dropping it detaches.
pub struct Scheduler {
    active: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl Scheduler {
    /// Lay out a match for `dims` and start ticking it.
    ///
    /// Invalid dimensions are rejected before any disc is placed or any
    /// thread is spawned.
    pub fn attach(
        engine: SharedEngine,
        dims: Dimensions,
        config: SchedulerConfig,
        sink: impl FrameSink,
    ) -> Result<Self, SchedulerError> {
        engine.lock().resize(dims)?;
        Self::start(engine, config, sink)
    }

    /// Start ticking an engine that is already set up
    pub fn start(
        engine: SharedEngine,
        config: SchedulerConfig,
        sink: impl FrameSink,
    ) -> Result<Self, SchedulerError> {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);
        log::info!(
            "Scheduler starting at {} Hz ({} timing)",
            config.target_fps,
            config.policy.as_str()
        );

        let handle = thread::Builder::new()
            .name("chapas-scheduler".into())
            .spawn(move || run_loop(engine, config, sink, flag))
            .map_err(SchedulerError::Spawn)?;

        Ok(Self {
            active,
            handle: Some(handle),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop the loop and wait for the thread to exit. Returns ticks run.
    pub fn detach(mut self) -> u64 {
        self.stop()
    }

    fn stop(&mut self) -> u64 {
        self.active.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.join() {
            Ok(ticks) => {
                log::info!("Scheduler stopped after {ticks} ticks");
                ticks
            }
            Err(_) => {
                log::error!("Scheduler thread panicked");
                0
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    engine: SharedEngine,
    config: SchedulerConfig,
    mut sink: impl FrameSink,
    active: Arc<AtomicBool>,
) -> u64 {
    let period = config.period();
    let mut last = Instant::now();
    let mut ticks = 0u64;

    while active.load(Ordering::Acquire) {
        let frame_start = Instant::now();
        let dt = config.delta(frame_start - last);
        last = frame_start;

        let (snapshot, events) = {
            let mut engine = engine.lock();
            engine.tick(dt);
            (engine.snapshot(), engine.drain_events())
        };
        sink.present(&snapshot, &events);
        ticks += 1;

        match period.checked_sub(frame_start.elapsed()) {
            Some(rest) => thread::sleep(rest),
            None if config.policy == TimingPolicy::Measured => {
                log::warn!("Frame {ticks} ran over the {period:?} budget");
            }
            None => log::trace!("Frame {ticks} ran late"),
        }
    }

    ticks
}
