//! Blocking client against a live control server

use super::helpers::TestServer;
use dining::client::{ControlClient, StatusReply};

#[test]
fn test_client_round_trip() {
    let server = TestServer::start();
    let client = ControlClient::new(&server.base_url()).expect("client");

    let health = client.health().expect("health");
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "dining-philosophers");

    match client.status().expect("status") {
        StatusReply::NoSimulation { message } => assert!(message.contains("/start")),
        other => panic!("expected no simulation, got {other:?}"),
    }

    let started = client.start(Some(4), Some(90)).expect("start");
    assert_eq!(started.philosophers, 4);
    assert_eq!(started.duration, "1m30s");

    match client.status().expect("status") {
        StatusReply::Snapshot(status) => {
            assert!(status.running);
            assert_eq!(status.philosophers, 4);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }

    let stopped = client.stop().expect("stop");
    assert_eq!(stopped.message, "Simulation stopped successfully");
}

#[test]
fn test_client_surfaces_server_errors() {
    let server = TestServer::start();
    let client = ControlClient::new(&server.base_url()).expect("client");

    let err = client.start(Some(500), None).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("HTTP 400"), "{message}");
    assert!(message.contains("maximum 100 philosophers allowed"), "{message}");

    let err = client.stop().unwrap_err();
    assert!(err.to_string().contains("No simulation exists"));
}
