//! Start / stop / status lifecycle through the HTTP API

use super::helpers::{send, wait_until, TestServer};
use dining::simulation::SimulationStatus;
use serde_json::json;
use std::thread;
use std::time::Duration;

fn status(server: &TestServer) -> SimulationStatus {
    let response = send(server.addr, "GET", "/status");
    assert_eq!(response.status, 200);
    serde_json::from_str(&response.body).expect("status body")
}

#[test]
fn test_start_status_stop_cycle() {
    let server = TestServer::start();

    let response = send(server.addr, "POST", "/start?n=5&duration=60");
    assert_eq!(response.status, 200);
    assert_eq!(
        response.json(),
        json!({
            "status": "started",
            "philosophers": 5,
            "duration": "1m0s",
            "message": "Simulation started with 5 philosophers for 1m0s"
        })
    );

    assert!(wait_until(Duration::from_secs(5), || {
        status(&server).eat_count.iter().all(|&c| c > 0)
    }));

    let running = status(&server);
    assert!(running.running);
    assert_eq!(running.states.len(), 5);
    assert_eq!(running.wait_time.len(), 5);
    assert_eq!(running.priorities.len(), 5);

    let response = send(server.addr, "GET", "/start");
    assert_eq!(response.status, 409);

    let response = send(server.addr, "POST", "/stop");
    assert_eq!(response.status, 200);
    assert_eq!(response.json()["status"], json!("stopped"));

    // Frozen after stop.
    let before = status(&server);
    thread::sleep(Duration::from_millis(50));
    let after = status(&server);
    assert!(!after.running);
    assert_eq!(before.eat_count, after.eat_count);

    let response = send(server.addr, "POST", "/stop");
    assert_eq!(response.status, 409);
    assert_eq!(response.body, "Simulation is not running\n");
}

#[test]
fn test_restart_after_stop_replaces_run() {
    let server = TestServer::start();

    assert_eq!(send(server.addr, "GET", "/start?n=3").status, 200);
    assert_eq!(send(server.addr, "GET", "/stop").status, 200);
    assert_eq!(send(server.addr, "GET", "/start?n=7").status, 200);

    let current = status(&server);
    assert!(current.running);
    assert_eq!(current.philosophers, 7);
}

#[test]
fn test_concurrent_starts_admit_one() {
    let server = TestServer::start();
    let addr = server.addr;

    let statuses: Vec<u16> = thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| s.spawn(move || send(addr, "POST", "/start?n=4").status))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("request thread"))
            .collect()
    });

    assert_eq!(statuses.iter().filter(|&&s| s == 200).count(), 1);
    assert_eq!(statuses.iter().filter(|&&s| s == 409).count(), 5);
}

#[test]
fn test_server_shutdown_stops_simulation() {
    let mut server = TestServer::start();
    assert_eq!(send(server.addr, "GET", "/start?n=5").status, 200);
    assert!(server.registry.is_running());

    server.stop();
    assert!(!server.registry.is_running());
}

#[test]
fn test_status_snapshots_respect_exclusion() {
    let server = TestServer::start();
    assert_eq!(send(server.addr, "GET", "/start?n=6").status, 200);

    for _ in 0..25 {
        let snap = status(&server);
        let n = snap.states.len();
        for i in 0..n {
            let eating = |j: usize| snap.states[j] == dining::monitor::PhilosopherState::Eating;
            assert!(!(eating(i) && eating((i + 1) % n)), "{:?}", snap.states);
        }
        thread::sleep(Duration::from_millis(5));
    }
}
