//! Shared test helpers for control server integration tests

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use dining::config::ServerConfig;
use dining::server::{ControlServer, ShutdownHandle, SimulationRegistry};
use dining::simulation::CycleTiming;

/// Control server on an ephemeral loopback port, shut down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<SimulationRegistry>,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server whose philosophers cycle in a few milliseconds.
    pub fn start() -> Self {
        let mut config = ServerConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.timing = CycleTiming::uniform(Duration::from_millis(2), Duration::from_millis(3));
        Self::with_config(config)
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let server = ControlServer::new(config);
        let listener: TcpListener = server.bind().expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let registry = server.registry();
        let shutdown = server.shutdown_handle();

        let thread = thread::spawn(move || {
            server.serve(listener).expect("Server loop failed");
        });

        Self {
            addr,
            registry,
            shutdown,
            thread: Some(thread),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request shutdown and wait for the accept loop to exit.
    pub fn stop(&mut self) {
        self.shutdown.shutdown();
        if let Some(handle) = self.thread.take() {
            handle.join().expect("Server thread panicked");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Parsed HTTP response.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

/// Send raw bytes and read the whole response (the server closes after one).
pub fn send_raw(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(30)))
        .expect("Failed to set read timeout");
    stream.write_all(raw).expect("Failed to send request");

    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .expect("Failed to read response");
    parse_response(&String::from_utf8_lossy(&bytes))
}

/// `METHOD target` with no body.
pub fn send(addr: SocketAddr, method: &str, target: &str) -> RawResponse {
    let raw = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\n\r\n");
    send_raw(addr, raw.as_bytes())
}

fn parse_response(text: &str) -> RawResponse {
    let (head, body) = text
        .split_once("\r\n\r\n")
        .expect("Response has no header terminator");
    let mut lines = head.split("\r\n");
    let status_line = lines.next().expect("Response has no status line");
    let status = status_line
        .split(' ')
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("Malformed status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}
