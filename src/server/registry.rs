//! Owner of the one current simulation.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

use crate::error::ApiError;
use crate::simulation::{CycleTiming, Simulation, SimulationConfig, SimulationStatus};

/// What `/start` reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedRun {
    pub philosophers: usize,
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
}

/// Holds at most one simulation. A stopped simulation stays queryable until
/// the next start replaces it.
///
/// Lock order: registry, then the simulation's lifecycle, then its monitor.
pub struct SimulationRegistry {
    current: Mutex<Option<Simulation>>,
    timing: CycleTiming,
}

impl SimulationRegistry {
    pub fn new(timing: CycleTiming) -> Self {
        Self {
            current: Mutex::new(None),
            timing,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Simulation>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new simulation unless one is running.
    pub fn start(&self, philosophers: usize, duration: Duration) -> Result<StartedRun, ApiError> {
        let mut current = self.lock();
        if current.as_ref().is_some_and(Simulation::is_running) {
            return Err(ApiError::AlreadyRunning);
        }

        let config = SimulationConfig::new(philosophers, duration)?.with_timing(self.timing);
        let simulation = Simulation::new(config)?;
        simulation.start()?;
        let started_at = simulation.started_at().unwrap_or_else(Utc::now);

        // The previous run, if any, is already stopped; dropping it is cheap.
        *current = Some(simulation);
        info!(philosophers, duration_secs = duration.as_secs(), "registry started simulation");

        Ok(StartedRun {
            philosophers,
            duration,
            started_at,
        })
    }

    /// Stop the current simulation and wait for its threads.
    pub fn stop(&self) -> Result<(), ApiError> {
        let current = self.lock();
        let simulation = current.as_ref().ok_or(ApiError::NoSimulation)?;
        if !simulation.is_running() {
            return Err(ApiError::NotRunning);
        }
        simulation.stop();
        Ok(())
    }

    /// Status of the current simulation, if one was ever started.
    pub fn status(&self) -> Option<SimulationStatus> {
        self.lock().as_ref().map(Simulation::status)
    }

    pub fn is_running(&self) -> bool {
        self.lock().as_ref().is_some_and(Simulation::is_running)
    }

    /// Stop whatever is running. Used on server shutdown.
    pub fn shutdown(&self) -> bool {
        match self.lock().as_ref() {
            Some(simulation) => simulation.stop(),
            None => false,
        }
    }
}

impl Default for SimulationRegistry {
    fn default() -> Self {
        Self::new(CycleTiming::default())
    }
}
