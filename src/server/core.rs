//! Core ControlServer struct and constructors.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::registry::SimulationRegistry;
use crate::config::ServerConfig;

/// Cloneable handle that asks a running server to shut down.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// HTTP server exposing start, stop and status of one simulation.
pub struct ControlServer {
    pub(super) config: ServerConfig,
    pub(super) registry: Arc<SimulationRegistry>,
    pub(super) shutdown_flag: Arc<AtomicBool>,
    pub(super) connection_count: Arc<AtomicUsize>,
}

impl ControlServer {
    /// Create a new control server.
    ///
    /// # Arguments
    /// * `config` - Bind address, connection limit, parameter limits and timing
    ///
    /// # Returns
    /// A new `ControlServer` with an empty registry
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(SimulationRegistry::new(config.timing));
        Self {
            config,
            registry,
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            connection_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<SimulationRegistry> {
        Arc::clone(&self.registry)
    }

    /// Number of connection handlers currently running.
    pub fn active_connections(&self) -> usize {
        self.connection_count.load(Ordering::Relaxed)
    }

    /// Request graceful shutdown of the server.
    pub fn shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::Relaxed);
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown_flag),
        }
    }
}
