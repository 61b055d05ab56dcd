//! Serialisable status report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::monitor::{MonitorSnapshot, PhilosopherState};

/// Monitor snapshot plus lifecycle information, in the JSON shape served by
/// `/status`.
///
/// `wait_time` is in nanoseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStatus {
    pub states: Vec<PhilosopherState>,
    pub wait_time: Vec<u64>,
    pub eat_count: Vec<u64>,
    pub priorities: Vec<i64>,
    pub running: bool,
    #[serde(default)]
    pub philosophers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl SimulationStatus {
    pub fn from_snapshot(
        snapshot: MonitorSnapshot,
        running: bool,
        started_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            philosophers: snapshot.len(),
            wait_time: snapshot
                .wait_time
                .iter()
                .map(|w| u64::try_from(w.as_nanos()).unwrap_or(u64::MAX))
                .collect(),
            states: snapshot.states,
            eat_count: snapshot.eat_count,
            priorities: snapshot.priorities,
            running,
            started_at,
        }
    }

    /// Cumulative wait of philosopher `i`.
    pub fn wait_duration(&self, i: usize) -> Duration {
        self.wait_time
            .get(i)
            .map_or(Duration::ZERO, |&ns| Duration::from_nanos(ns))
    }

    pub fn total_meals(&self) -> u64 {
        self.eat_count.iter().sum()
    }

    pub fn count_in(&self, state: PhilosopherState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }
}
