//! Error types shared across the crate.
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`SimulationError`] | monitor / simulation construction, `start` | bad sizing or thread spawn failure |
//! | [`ApiError`] | HTTP layer, registry | client-visible failure with an HTTP status |
//!
//! Configuration errors live next to the loader in [`crate::config`].

use thiserror::Error;

/// Failures of the simulation core.
///
/// The monitor operations themselves never fail; these only come out of
/// construction and from spawning worker threads.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A ring needs at least two philosophers.
    #[error("a simulation needs at least 2 philosophers, got {n}")]
    TooFewPhilosophers { n: usize },

    /// The run duration must be positive.
    #[error("simulation duration must be greater than zero")]
    ZeroDuration,

    /// The OS refused to spawn a worker or timer thread.
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Client-visible failure of an HTTP request.
///
/// `Display` is the message written to the response body; [`status_code`]
/// is the HTTP status it maps to.
///
/// [`status_code`]: ApiError::status_code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A query parameter failed to parse or was out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("A simulation is already running. Stop it first with /stop")]
    AlreadyRunning,

    #[error("No simulation exists")]
    NoSimulation,

    #[error("Simulation is not running")]
    NotRunning,

    /// Wrong method for a route; `allowed` reads like `GET or POST`.
    #[error("Method not allowed. Use {allowed}")]
    MethodNotAllowed { allowed: &'static str },

    #[error("404 page not found")]
    NotFound,

    /// The request line or headers could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request header fields too large")]
    HeaderTooLarge,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameter { .. } | Self::BadRequest(_) => 400,
            Self::NoSimulation | Self::NotFound => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::AlreadyRunning | Self::NotRunning => 409,
            Self::HeaderTooLarge => 431,
            Self::Internal(_) => 500,
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        Self::Internal(err.to_string())
    }
}
