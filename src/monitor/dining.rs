use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::priority::priority_number;
use super::state::PhilosopherState;
use crate::error::SimulationError;

/// Point-in-time copy of the monitor table, taken under the monitor lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub states: Vec<PhilosopherState>,
    /// Cumulative time each philosopher has spent hungry, folded in at grant.
    pub wait_time: Vec<Duration>,
    pub eat_count: Vec<u64>,
    pub priorities: Vec<i64>,
}

impl MonitorSnapshot {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// No two ring neighbours are eating.
    pub fn is_mutually_exclusive(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            self.states[i] != PhilosopherState::Eating
                || self.states[(i + 1) % n] != PhilosopherState::Eating
        })
    }

    /// Every hungry philosopher has at least one eating neighbour, i.e. no
    /// philosopher is left waiting for a grant nobody will evaluate.
    pub fn is_settled(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            self.states[i] != PhilosopherState::Hungry
                || self.states[(i + n - 1) % n] == PhilosopherState::Eating
                || self.states[(i + 1) % n] == PhilosopherState::Eating
        })
    }

    pub fn total_meals(&self) -> u64 {
        self.eat_count.iter().sum()
    }
}

/// Everything guarded by the monitor lock.
struct Table {
    state: Vec<PhilosopherState>,
    wait_start: Vec<Option<Instant>>,
    wait_time: Vec<Duration>,
    eat_count: Vec<u64>,
}

impl Table {
    fn new(n: usize) -> Self {
        Self {
            state: vec![PhilosopherState::Thinking; n],
            wait_start: vec![None; n],
            wait_time: vec![Duration::ZERO; n],
            eat_count: vec![0; n],
        }
    }

    fn len(&self) -> usize {
        self.state.len()
    }

    fn left(&self, i: usize) -> usize {
        (i + self.len() - 1) % self.len()
    }

    fn right(&self, i: usize) -> usize {
        (i + 1) % self.len()
    }

    fn priority(&self, i: usize) -> i64 {
        priority_number(self.eat_count[i], self.wait_time[i])
    }

    /// Total order over competitors: priority number first, index breaks ties.
    fn rank(&self, i: usize) -> (i64, usize) {
        (self.priority(i), i)
    }

    /// Hungry with neither neighbour eating.
    fn can_eat(&self, i: usize) -> bool {
        self.state[i] == PhilosopherState::Hungry
            && self.state[self.left(i)] != PhilosopherState::Eating
            && self.state[self.right(i)] != PhilosopherState::Eating
    }

    /// `i` can eat and ranks ahead of every neighbour that could eat too.
    fn should_grant(&self, i: usize) -> bool {
        if !self.can_eat(i) {
            return false;
        }
        let rank = self.rank(i);
        [self.left(i), self.right(i)]
            .into_iter()
            .all(|j| !self.can_eat(j) || rank < self.rank(j))
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            states: self.state.clone(),
            wait_time: self.wait_time.clone(),
            eat_count: self.eat_count.clone(),
            priorities: (0..self.len()).map(|i| self.priority(i)).collect(),
        }
    }
}

/// Monitor enforcing ring-adjacency mutual exclusion with priority grants.
///
/// `acquire` blocks until the caller is granted; `release` hands the shared
/// resources back and re-evaluates both neighbours. All bookkeeping happens
/// under one lock, so grant decisions always see a consistent table.
pub struct DiningMonitor {
    table: Mutex<Table>,
    seats: Vec<Condvar>,
}

impl DiningMonitor {
    /// Create a monitor for `n` philosophers, all thinking.
    pub fn new(n: usize) -> Result<Self, SimulationError> {
        if n < 2 {
            return Err(SimulationError::TooFewPhilosophers { n });
        }
        Ok(Self {
            table: Mutex::new(Table::new(n)),
            seats: (0..n).map(|_| Condvar::new()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Always `false`: construction rejects fewer than two philosophers.
    pub fn is_empty(&self) -> bool {
        false
    }

    // Critical sections never panic halfway through a mutation, so a
    // poisoned table is still consistent.
    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Philosopher `i` wants to eat. Returns once it is `EATING`.
    pub fn acquire(&self, i: usize) {
        let mut table = self.lock();

        table.state[i] = PhilosopherState::Hungry;
        table.wait_start[i] = Some(Instant::now());
        debug!(philosopher = i, "hungry");

        self.test(&mut table, i);

        let _table = self.seats[i]
            .wait_while(table, |t| t.state[i] != PhilosopherState::Eating)
            .unwrap_or_else(PoisonError::into_inner);

        debug!(philosopher = i, "entered critical section");
    }

    /// Philosopher `i` is done eating.
    ///
    /// Releasing a philosopher that is not eating changes nothing beyond
    /// re-evaluating its neighbours.
    pub fn release(&self, i: usize) {
        let mut table = self.lock();

        if table.state[i] == PhilosopherState::Eating {
            table.state[i] = PhilosopherState::Thinking;
            table.eat_count[i] += 1;
            debug!(
                philosopher = i,
                meals = table.eat_count[i],
                "left critical section"
            );
        } else {
            debug!(philosopher = i, state = %table.state[i], "release ignored, not eating");
        }

        let (left, right) = (table.left(i), table.right(i));
        self.test(&mut table, left);
        self.test(&mut table, right);
    }

    /// Grant `i` if it is hungry, unblocked and ahead of its competitors.
    fn test(&self, table: &mut Table, i: usize) -> bool {
        if !table.should_grant(i) {
            return false;
        }

        table.state[i] = PhilosopherState::Eating;
        if let Some(start) = table.wait_start[i].take() {
            table.wait_time[i] += start.elapsed();
        }
        info!(
            philosopher = i,
            priority = table.priority(i),
            eat_count = table.eat_count[i],
            wait_secs = table.wait_time[i].as_secs_f64(),
            "granted"
        );
        self.seats[i].notify_one();
        true
    }

    /// Current priority number of philosopher `i`.
    pub fn priority(&self, i: usize) -> i64 {
        self.lock().priority(i)
    }

    /// Consistent copy of the whole table.
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.lock().snapshot()
    }
}

impl std::fmt::Debug for DiningMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiningMonitor")
            .field("philosophers", &self.len())
            .finish_non_exhaustive()
    }
}
