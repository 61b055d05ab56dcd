//! Control server lifecycle: bind, accept loop, per-connection handling.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::core::ControlServer;
use super::http::{read_request, RequestError, Response};
use super::registry::SimulationRegistry;
use super::routes;
use crate::config::Limits;

/// How long the accept loop sleeps when no connection is pending.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-connection socket timeouts.
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Decrements the connection count when the handler thread ends, panic or not.
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl ControlServer {
    /// Bind the configured address.
    pub fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.bind_address();
        TcpListener::bind(&addr).with_context(|| format!("Failed to bind {addr}"))
    }

    /// Bind and serve until shutdown is requested.
    pub fn run(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    /// Accept connections on `listener` until shutdown is requested, then
    /// stop the running simulation.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        // Non-blocking so the loop can observe the shutdown flag.
        listener
            .set_nonblocking(true)
            .context("Failed to set listener to non-blocking")?;

        let local = listener
            .local_addr()
            .context("Failed to read listener address")?;
        info!(addr = %local, "control server listening");

        let max_connections = self.config.max_connections;
        while !self.shutdown_flag.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    let current = self.connection_count.load(Ordering::Relaxed);
                    if current >= max_connections {
                        warn!(%peer, limit = max_connections, "connection limit reached, rejecting");
                        drop(stream);
                        continue;
                    }

                    self.connection_count.fetch_add(1, Ordering::Relaxed);
                    let guard = ConnectionGuard(Arc::clone(&self.connection_count));
                    let registry = Arc::clone(&self.registry);
                    let limits = self.config.limits;

                    let spawned = thread::Builder::new()
                        .name("dining-http".into())
                        .spawn(move || {
                            let _guard = guard;
                            if let Err(e) = handle_connection(stream, &registry, &limits) {
                                debug!(%peer, error = %e, "connection handler error");
                            }
                        });
                    if let Err(e) = spawned {
                        warn!(error = %e, "failed to spawn connection handler");
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        info!("control server shutting down");
        if self.registry.shutdown() {
            info!("stopped running simulation on shutdown");
        }
        Ok(())
    }
}

/// Read one request, write one response, close.
fn handle_connection(
    mut stream: TcpStream,
    registry: &SimulationRegistry,
    limits: &Limits,
) -> Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode.
    stream
        .set_nonblocking(false)
        .context("Failed to set stream to blocking")?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .context("Failed to set read timeout")?;
    stream
        .set_write_timeout(Some(WRITE_TIMEOUT))
        .context("Failed to set write timeout")?;

    let response = match read_request(&mut stream) {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "request");
            routes::handle(&request, registry, limits)
        }
        Err(RequestError::Closed) => return Ok(()),
        Err(RequestError::Io(e)) => return Err(e).context("Failed to read request"),
        Err(RequestError::Invalid(err)) => {
            debug!(error = %err, "rejecting malformed request");
            Response::error(&err)
        }
    };

    response
        .write_to(&mut stream)
        .context("Failed to write response")?;
    let _ = stream.shutdown(Shutdown::Write);
    Ok(())
}
