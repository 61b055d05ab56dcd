//! Priority-aware monitor for the dining philosophers ring.
//!
//! One mutex guards the whole table; each philosopher has its own condition
//! variable bound to that mutex, so a grant wakes exactly the philosopher it
//! was made for.

mod dining;
mod priority;
mod state;

#[cfg(test)]
mod tests;

pub use dining::{DiningMonitor, MonitorSnapshot};
pub use priority::{priority_number, MEAL_WEIGHT, WAIT_BONUS_UNIT_MS};
pub use state::PhilosopherState;
