//! Raw HTTP behaviour of the control endpoints

use super::helpers::{send, send_raw, TestServer};
use serde_json::json;

#[test]
fn test_health_over_tcp() {
    let server = TestServer::start();
    let response = send(server.addr, "GET", "/health");

    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(
        response.json(),
        json!({"status": "healthy", "service": "dining-philosophers"})
    );
}

#[test]
fn test_every_response_has_cors_headers() {
    let server = TestServer::start();
    for (method, path) in [("GET", "/health"), ("GET", "/nope"), ("PUT", "/start")] {
        let response = send(server.addr, method, path);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
        assert_eq!(response.header("Access-Control-Max-Age"), Some("3600"));
        assert_eq!(response.header("Connection"), Some("close"));
    }
}

#[test]
fn test_options_preflight() {
    let server = TestServer::start();
    let response = send(server.addr, "OPTIONS", "/start?n=5");

    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
    assert_eq!(response.header("Content-Length"), Some("0"));
    assert!(!server.registry.is_running());
}

#[test]
fn test_parameter_and_method_errors() {
    let server = TestServer::start();

    let response = send(server.addr, "GET", "/start?n=1");
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        "Invalid parameter 'n': must be at least 2 philosophers\n"
    );
    assert_eq!(
        response.header("Content-Type"),
        Some("text/plain; charset=utf-8")
    );

    let response = send(server.addr, "GET", "/start?n=5&duration=10");
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        "Invalid parameter 'duration': minimum 60 seconds\n"
    );

    let response = send(server.addr, "DELETE", "/stop");
    assert_eq!(response.status, 405);
    assert_eq!(response.body, "Method not allowed. Use GET or POST\n");

    let response = send(server.addr, "POST", "/status");
    assert_eq!(response.status, 405);
    assert_eq!(response.body, "Method not allowed. Use GET\n");

    assert!(server.registry.status().is_none());
}

#[test]
fn test_unknown_route() {
    let server = TestServer::start();
    let response = send(server.addr, "GET", "/philosophers");
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "404 page not found\n");
}

#[test]
fn test_malformed_request_line() {
    let server = TestServer::start();
    let response = send_raw(server.addr, b"HELLO\r\n\r\n");
    assert_eq!(response.status, 400);
}

#[test]
fn test_oversized_head_is_rejected() {
    let server = TestServer::start();
    let raw = format!(
        "GET /health HTTP/1.1\r\nX-Padding: {}\r\n\r\n",
        "x".repeat(dining::server::MAX_HEAD_BYTES)
    );
    let response = send_raw(server.addr, raw.as_bytes());
    assert_eq!(response.status, 431);
}

#[test]
fn test_post_with_body_is_handled() {
    let server = TestServer::start();
    let raw = b"POST /stop HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
    let response = send_raw(server.addr, raw);
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "No simulation exists\n");
}

#[test]
fn test_status_without_simulation() {
    let server = TestServer::start();
    let response = send(server.addr, "GET", "/status");
    assert_eq!(response.status, 200);
    assert_eq!(response.json()["status"], json!("no_simulation"));
}
