//! JSON bodies exchanged with the control server.
//!
//! The `/status` body is [`SimulationStatus`](crate::simulation::SimulationStatus).

use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "dining-philosophers";

/// Body of a successful `/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    /// Human-readable run length, e.g. `1m0s`.
    pub duration: String,
    pub message: String,
    pub philosophers: usize,
    pub status: String,
}

/// Body of `/stop`, and of `/status` when nothing has been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            status: "healthy".to_string(),
        }
    }
}
