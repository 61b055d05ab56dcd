//! Tests for the dining monitor.

use super::{DiningMonitor, PhilosopherState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use PhilosopherState::{Eating, Hungry, Thinking};

/// Poll snapshots until `pred` holds, panicking after two seconds.
fn wait_for(monitor: &DiningMonitor, what: &str, pred: impl Fn(&[PhilosopherState]) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let snap = monitor.snapshot();
        if pred(&snap.states) {
            return;
        }
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}: {:?}", snap.states);
        }
        thread::sleep(Duration::from_millis(2));
    }
}

fn spawn_acquire(monitor: &Arc<DiningMonitor>, i: usize) -> JoinHandle<()> {
    let monitor = Arc::clone(monitor);
    thread::spawn(move || monitor.acquire(i))
}

#[test]
fn test_new_rejects_single_philosopher() {
    assert!(DiningMonitor::new(0).is_err());
    assert!(DiningMonitor::new(1).is_err());
    assert!(DiningMonitor::new(2).is_ok());
}

#[test]
fn test_new_monitor_is_all_thinking() {
    let monitor = DiningMonitor::new(5).expect("monitor");
    let snap = monitor.snapshot();

    assert_eq!(snap.len(), 5);
    assert!(snap.states.iter().all(|s| *s == Thinking));
    assert!(snap.eat_count.iter().all(|&c| c == 0));
    assert!(snap.wait_time.iter().all(|w| w.is_zero()));
    assert!(snap.priorities.iter().all(|&p| p == 0));
}

#[test]
fn test_uncontended_acquire_and_release() {
    let monitor = DiningMonitor::new(5).expect("monitor");

    monitor.acquire(3);
    let snap = monitor.snapshot();
    assert_eq!(snap.states[3], Eating);
    assert_eq!(snap.eat_count[3], 0);

    monitor.release(3);
    let snap = monitor.snapshot();
    assert_eq!(snap.states[3], Thinking);
    assert_eq!(snap.eat_count[3], 1);
    assert_eq!(snap.priorities[3], 10_000);
}

#[test]
fn test_two_philosophers_take_turns() {
    let monitor = Arc::new(DiningMonitor::new(2).expect("monitor"));

    monitor.acquire(0);
    let second = spawn_acquire(&monitor, 1);
    wait_for(&monitor, "philosopher 1 hungry", |s| s[1] == Hungry);

    let snap = monitor.snapshot();
    assert_eq!(snap.states, vec![Eating, Hungry]);
    assert!(snap.is_settled());

    monitor.release(0);
    second.join().expect("acquire(1) thread");

    let snap = monitor.snapshot();
    assert_eq!(snap.states, vec![Thinking, Eating]);
    assert_eq!(snap.eat_count, vec![1, 0]);
}

#[test]
fn test_neighbours_wait_for_eater_in_five_ring() {
    let monitor = Arc::new(DiningMonitor::new(5).expect("monitor"));

    monitor.acquire(2);
    let left = spawn_acquire(&monitor, 1);
    let right = spawn_acquire(&monitor, 3);
    wait_for(&monitor, "1 and 3 hungry", |s| s[1] == Hungry && s[3] == Hungry);
    assert_eq!(monitor.snapshot().states[2], Eating);

    monitor.release(2);
    left.join().expect("acquire(1) thread");
    right.join().expect("acquire(3) thread");

    // 1 and 3 share no resource, so both get in once 2 is done.
    let snap = monitor.snapshot();
    assert_eq!(snap.states, vec![Thinking, Eating, Thinking, Eating, Thinking]);
    assert!(snap.is_mutually_exclusive());
}

#[test]
fn test_three_ring_grants_only_lower_priority() {
    let monitor = Arc::new(DiningMonitor::new(3).expect("monitor"));

    // Give philosopher 2 a meal so philosopher 1 ranks ahead of it.
    monitor.acquire(2);
    monitor.release(2);

    monitor.acquire(0);
    let one = spawn_acquire(&monitor, 1);
    let two = spawn_acquire(&monitor, 2);
    wait_for(&monitor, "1 and 2 hungry", |s| s[1] == Hungry && s[2] == Hungry);

    monitor.release(0);
    one.join().expect("acquire(1) thread");

    let snap = monitor.snapshot();
    assert_eq!(snap.states, vec![Thinking, Eating, Hungry]);
    assert!(snap.priorities[1] < snap.priorities[2]);
    assert!(snap.is_settled());

    monitor.release(1);
    two.join().expect("acquire(2) thread");
    assert_eq!(monitor.snapshot().states, vec![Thinking, Thinking, Eating]);
}

#[test]
fn test_priority_tie_goes_to_lower_index() {
    let monitor = Arc::new(DiningMonitor::new(3).expect("monitor"));

    monitor.acquire(0);
    let one = spawn_acquire(&monitor, 1);
    let two = spawn_acquire(&monitor, 2);
    wait_for(&monitor, "1 and 2 hungry", |s| s[1] == Hungry && s[2] == Hungry);

    // Neither has eaten or been granted yet, so both priorities are zero.
    assert_eq!(monitor.priority(1), monitor.priority(2));

    monitor.release(0);
    one.join().expect("acquire(1) thread");
    assert_eq!(monitor.snapshot().states, vec![Thinking, Eating, Hungry]);

    monitor.release(1);
    two.join().expect("acquire(2) thread");
}

#[test]
fn test_repeated_release_does_not_double_count() {
    let monitor = DiningMonitor::new(3).expect("monitor");

    monitor.acquire(0);
    monitor.release(0);
    monitor.release(0);
    monitor.release(0);

    let snap = monitor.snapshot();
    assert_eq!(snap.eat_count, vec![1, 0, 0]);
    assert!(snap.states.iter().all(|s| *s == Thinking));
}

#[test]
fn test_stray_release_still_wakes_neighbour() {
    let monitor = Arc::new(DiningMonitor::new(4).expect("monitor"));

    monitor.acquire(1);
    let waiter = spawn_acquire(&monitor, 0);
    wait_for(&monitor, "0 hungry", |s| s[0] == Hungry);

    // Releasing a thinking philosopher must not disturb the eater or the waiter.
    monitor.release(3);
    let snap = monitor.snapshot();
    assert_eq!(snap.states, vec![Hungry, Eating, Thinking, Thinking]);
    assert_eq!(snap.eat_count, vec![0, 0, 0, 0]);

    monitor.release(1);
    waiter.join().expect("acquire(0) thread");
    assert_eq!(monitor.snapshot().states[0], Eating);
}

#[test]
fn test_wait_time_accumulates_at_grant() {
    let monitor = Arc::new(DiningMonitor::new(2).expect("monitor"));

    monitor.acquire(0);
    let waiter = spawn_acquire(&monitor, 1);
    wait_for(&monitor, "1 hungry", |s| s[1] == Hungry);
    thread::sleep(Duration::from_millis(250));

    // Not folded in until the grant.
    assert!(monitor.snapshot().wait_time[1].is_zero());

    monitor.release(0);
    waiter.join().expect("acquire(1) thread");

    let snap = monitor.snapshot();
    assert!(snap.wait_time[1] >= Duration::from_millis(250));
    assert!(snap.priorities[1] <= -2);
    assert!(snap.wait_time[0] < Duration::from_millis(100));
}

#[test]
fn test_concurrent_cycles_keep_invariants() {
    const N: usize = 5;
    const CYCLES: u64 = 40;

    let monitor = Arc::new(DiningMonitor::new(N).expect("monitor"));
    let done = Arc::new(AtomicBool::new(false));

    let checker = {
        let monitor = Arc::clone(&monitor);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observed = 0;
            while !done.load(Ordering::Relaxed) {
                let snap = monitor.snapshot();
                assert!(snap.is_mutually_exclusive(), "{:?}", snap.states);
                assert!(snap.is_settled(), "{:?}", snap.states);
                observed += 1;
                thread::yield_now();
            }
            observed
        })
    };

    let workers: Vec<_> = (0..N)
        .map(|i| {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                for _ in 0..CYCLES {
                    thread::sleep(Duration::from_micros(200 + 50 * i as u64));
                    monitor.acquire(i);
                    thread::sleep(Duration::from_micros(300));
                    monitor.release(i);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker thread");
    }
    done.store(true, Ordering::Relaxed);
    let observed = checker.join().expect("checker thread");
    assert!(observed > 0);

    let snap = monitor.snapshot();
    assert!(snap.eat_count.iter().all(|&c| c == CYCLES));
    assert!(snap.states.iter().all(|s| *s == Thinking));
    assert_eq!(snap.total_meals(), CYCLES * N as u64);
}
