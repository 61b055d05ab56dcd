//! Request routing for the control endpoints.

use tracing::{info, warn};

use super::http::{Request, Response};
use super::params::{format_duration, Query, StartParams};
use super::protocol::{HealthResponse, MessageResponse, StartResponse};
use super::registry::SimulationRegistry;
use crate::config::Limits;
use crate::error::ApiError;

const GET_OR_POST: &str = "GET or POST";
const GET: &str = "GET";

/// Produce the response for one request. Never fails; errors become
/// plain-text responses with the matching status.
pub fn handle(request: &Request, registry: &SimulationRegistry, limits: &Limits) -> Response {
    // Preflight for every path, known or not.
    if request.method == "OPTIONS" {
        return Response::empty(200);
    }

    let result = match request.path.as_str() {
        "/start" => start(request, registry, limits),
        "/stop" => stop(request, registry),
        "/status" => status(request, registry),
        "/health" => Ok(Response::json(200, &HealthResponse::healthy())),
        _ => Err(ApiError::NotFound),
    };

    result.unwrap_or_else(|err| {
        if err.status_code() >= 500 {
            warn!(path = %request.path, error = %err, "request failed");
        }
        Response::error(&err)
    })
}

fn require_method(request: &Request, allowed: &'static str) -> Result<(), ApiError> {
    let ok = match allowed {
        GET => request.method == "GET",
        _ => request.method == "GET" || request.method == "POST",
    };
    if ok {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed { allowed })
    }
}

fn start(
    request: &Request,
    registry: &SimulationRegistry,
    limits: &Limits,
) -> Result<Response, ApiError> {
    require_method(request, GET_OR_POST)?;
    // Validate before touching the registry lock.
    let params = StartParams::from_query(&Query::parse(&request.query), limits)?;

    let run = registry.start(params.philosophers, params.duration)?;
    let duration = format_duration(run.duration);
    info!(philosophers = run.philosophers, %duration, "simulation started via HTTP");

    Ok(Response::json(
        200,
        &StartResponse {
            message: format!(
                "Simulation started with {} philosophers for {}",
                run.philosophers, duration
            ),
            duration,
            philosophers: run.philosophers,
            status: "started".to_string(),
        },
    ))
}

fn stop(request: &Request, registry: &SimulationRegistry) -> Result<Response, ApiError> {
    require_method(request, GET_OR_POST)?;
    registry.stop()?;
    info!("simulation stopped via HTTP");

    Ok(Response::json(
        200,
        &MessageResponse {
            message: "Simulation stopped successfully".to_string(),
            status: "stopped".to_string(),
        },
    ))
}

fn status(request: &Request, registry: &SimulationRegistry) -> Result<Response, ApiError> {
    require_method(request, GET)?;

    Ok(match registry.status() {
        Some(status) => Response::json(200, &status),
        None => Response::json(
            200,
            &MessageResponse {
                message: "No simulation exists. Start one with /start?n=5&duration=60"
                    .to_string(),
                status: "no_simulation".to_string(),
            },
        ),
    })
}
