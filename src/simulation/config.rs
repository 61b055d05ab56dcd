//! Simulation sizing and per-philosopher cycle timing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SimulationError;

/// How long each philosopher thinks and eats per cycle.
///
/// Philosopher `i` thinks for `think_base + i * think_step` and eats for
/// `eat_base + i * eat_step`, so neighbours drift out of phase. Stored as
/// milliseconds in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleTiming {
    #[serde(rename = "think_base_ms", with = "millis")]
    pub think_base: Duration,
    #[serde(rename = "think_step_ms", with = "millis")]
    pub think_step: Duration,
    #[serde(rename = "eat_base_ms", with = "millis")]
    pub eat_base: Duration,
    #[serde(rename = "eat_step_ms", with = "millis")]
    pub eat_step: Duration,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            think_base: Duration::from_millis(500),
            think_step: Duration::from_millis(100),
            eat_base: Duration::from_millis(800),
            eat_step: Duration::from_millis(100),
        }
    }
}

impl CycleTiming {
    /// Same delay for everyone, mostly useful for fast tests.
    pub fn uniform(think: Duration, eat: Duration) -> Self {
        Self {
            think_base: think,
            think_step: Duration::ZERO,
            eat_base: eat,
            eat_step: Duration::ZERO,
        }
    }

    pub fn think_delay(&self, i: usize) -> Duration {
        self.think_base + self.think_step.saturating_mul(step_factor(i))
    }

    pub fn eat_delay(&self, i: usize) -> Duration {
        self.eat_base + self.eat_step.saturating_mul(step_factor(i))
    }
}

fn step_factor(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

/// Everything needed to build a [`Simulation`](super::Simulation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub philosophers: usize,
    pub duration: Duration,
    pub timing: CycleTiming,
}

impl SimulationConfig {
    /// Validated config with default timing.
    pub fn new(philosophers: usize, duration: Duration) -> Result<Self, SimulationError> {
        if philosophers < 2 {
            return Err(SimulationError::TooFewPhilosophers { n: philosophers });
        }
        if duration.is_zero() {
            return Err(SimulationError::ZeroDuration);
        }
        Ok(Self {
            philosophers,
            duration,
            timing: CycleTiming::default(),
        })
    }

    pub fn with_timing(mut self, timing: CycleTiming) -> Self {
        self.timing = timing;
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
