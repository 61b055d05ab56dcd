//! Worker threads, the auto-stop timer and the start/stop lifecycle.

use chrono::{DateTime, Utc};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::config::{CycleTiming, SimulationConfig};
use super::status::SimulationStatus;
use crate::error::SimulationError;
use crate::monitor::DiningMonitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    /// Stop flag set, joins in progress. Still reported as running.
    Stopping,
    Stopped,
}

struct Lifecycle {
    phase: Phase,
    workers: Vec<JoinHandle<()>>,
    timer: Option<JoinHandle<()>>,
    started_at: Option<DateTime<Utc>>,
}

struct Inner {
    config: SimulationConfig,
    monitor: Arc<DiningMonitor>,
    stop_flag: Arc<AtomicBool>,
    lifecycle: Mutex<Lifecycle>,
    /// Notified on every phase change.
    changed: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) -> bool {
        let mut life = self.lock();
        let phase = life.phase;
        match phase {
            Phase::Created | Phase::Stopped => return false,
            Phase::Stopping => {
                // Someone else is joining; wait for them to finish.
                let _life = self
                    .changed
                    .wait_while(life, |l| l.phase == Phase::Stopping)
                    .unwrap_or_else(PoisonError::into_inner);
                return false;
            }
            Phase::Running => {}
        }

        life.phase = Phase::Stopping;
        self.stop_flag.store(true, Ordering::Release);
        let workers = mem::take(&mut life.workers);
        let timer = life.timer.take();
        self.changed.notify_all();
        drop(life);

        let started = Instant::now();
        for handle in workers {
            if handle.join().is_err() {
                warn!("philosopher thread panicked");
            }
        }
        if let Some(handle) = timer {
            // The timer thread calls stop() itself and must not join itself.
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                warn!("timer thread panicked");
            }
        }

        let mut life = self.lock();
        life.phase = Phase::Stopped;
        self.changed.notify_all();
        drop(life);

        info!(
            meals = self.monitor.snapshot().total_meals(),
            join_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "simulation stopped"
        );
        true
    }
}

/// A timed run of N philosopher threads against one [`DiningMonitor`].
///
/// Lifecycle is `Created -> Running -> Stopped`; a stopped simulation is
/// never restarted. Dropping a running simulation stops it and joins every
/// thread.
pub struct Simulation {
    inner: Arc<Inner>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        if config.duration.is_zero() {
            return Err(SimulationError::ZeroDuration);
        }
        let monitor = DiningMonitor::new(config.philosophers)?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                monitor: Arc::new(monitor),
                stop_flag: Arc::new(AtomicBool::new(false)),
                lifecycle: Mutex::new(Lifecycle {
                    phase: Phase::Created,
                    workers: Vec::new(),
                    timer: None,
                    started_at: None,
                }),
                changed: Condvar::new(),
            }),
        })
    }

    /// Spawn the philosopher threads and the auto-stop timer.
    ///
    /// # Returns
    /// `Ok(true)` if this call started the run, `Ok(false)` if it was already
    /// running or has already stopped.
    pub fn start(&self) -> Result<bool, SimulationError> {
        let inner = &self.inner;
        let mut life = inner.lock();
        if life.phase != Phase::Created {
            return Ok(false);
        }

        let n = inner.config.philosophers;
        let timing = inner.config.timing;
        for i in 0..n {
            match spawn_philosopher(i, &inner.monitor, &inner.stop_flag, timing) {
                Ok(handle) => life.workers.push(handle),
                Err(e) => {
                    // Unwind the partial start: stop and join what exists.
                    inner.stop_flag.store(true, Ordering::Release);
                    let workers = mem::take(&mut life.workers);
                    life.phase = Phase::Stopped;
                    drop(life);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    inner.changed.notify_all();
                    return Err(SimulationError::Spawn(e));
                }
            }
        }

        life.phase = Phase::Running;
        life.started_at = Some(Utc::now());

        let timer_inner = Arc::clone(inner);
        let timer = thread::Builder::new()
            .name("dining-timer".into())
            .spawn(move || run_timer(&timer_inner));
        match timer {
            Ok(handle) => life.timer = Some(handle),
            Err(e) => {
                drop(life);
                inner.stop();
                return Err(SimulationError::Spawn(e));
            }
        }

        info!(
            philosophers = n,
            duration_secs = inner.config.duration.as_secs(),
            "simulation started"
        );
        Ok(true)
    }

    /// Signal every thread to finish and join them.
    ///
    /// Philosophers notice the signal at the top of their next cycle, so this
    /// can take up to one full think + eat cycle. Concurrent callers block
    /// until the first one has finished joining.
    ///
    /// # Returns
    /// `true` if this call performed the stop.
    pub fn stop(&self) -> bool {
        self.inner.stop()
    }

    /// True from start until the last thread has been joined.
    pub fn is_running(&self) -> bool {
        matches!(self.inner.lock().phase, Phase::Running | Phase::Stopping)
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().phase == Phase::Stopped
    }

    pub fn status(&self) -> SimulationStatus {
        let (running, started_at) = {
            let life = self.inner.lock();
            (
                matches!(life.phase, Phase::Running | Phase::Stopping),
                life.started_at,
            )
        };
        SimulationStatus::from_snapshot(self.inner.monitor.snapshot(), running, started_at)
    }

    /// Block until the simulation has stopped or `timeout` elapses.
    ///
    /// # Returns
    /// `true` if the simulation is stopped.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let life = self.inner.lock();
        let (life, _) = self
            .inner
            .changed
            .wait_timeout_while(life, timeout, |l| l.phase != Phase::Stopped)
            .unwrap_or_else(PoisonError::into_inner);
        life.phase == Phase::Stopped
    }

    pub fn monitor(&self) -> &DiningMonitor {
        &self.inner.monitor
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.inner.config
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().started_at
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.inner.config)
            .field("phase", &self.inner.lock().phase)
            .finish()
    }
}

fn spawn_philosopher(
    i: usize,
    monitor: &Arc<DiningMonitor>,
    stop_flag: &Arc<AtomicBool>,
    timing: CycleTiming,
) -> std::io::Result<JoinHandle<()>> {
    let monitor = Arc::clone(monitor);
    let stop_flag = Arc::clone(stop_flag);
    thread::Builder::new()
        .name(format!("dining-philosopher-{i}"))
        .spawn(move || run_philosopher(i, &monitor, &stop_flag, timing))
}

/// Think, acquire, eat, release until the stop flag is seen.
fn run_philosopher(i: usize, monitor: &DiningMonitor, stop_flag: &AtomicBool, timing: CycleTiming) {
    let think = timing.think_delay(i);
    let eat = timing.eat_delay(i);
    debug!(philosopher = i, ?think, ?eat, "philosopher started");

    while !stop_flag.load(Ordering::Acquire) {
        thread::sleep(think);
        monitor.acquire(i);
        thread::sleep(eat);
        monitor.release(i);
    }

    debug!(philosopher = i, "philosopher exiting");
}

/// Sleep for the run duration, or until someone else stops the run.
fn run_timer(inner: &Inner) {
    let life = inner.lock();
    let (life, wait) = inner
        .changed
        .wait_timeout_while(life, inner.config.duration, |l| l.phase == Phase::Running)
        .unwrap_or_else(PoisonError::into_inner);
    let expired = wait.timed_out() && life.phase == Phase::Running;
    drop(life);

    if expired {
        info!(
            duration_secs = inner.config.duration.as_secs(),
            "duration elapsed, stopping simulation"
        );
        inner.stop();
    }
}
