//! Blocking HTTP client for a running control server.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::server::protocol::{HealthResponse, MessageResponse, StartResponse};
use crate::simulation::SimulationStatus;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
// Stop joins every philosopher thread before answering.
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Result of `/status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    Snapshot(SimulationStatus),
    NoSimulation { message: String },
}

pub struct ControlClient {
    base_url: String,
    http: Client,
}

impl ControlClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("dining/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Start a simulation; `None` leaves the server default in place.
    pub fn start(
        &self,
        philosophers: Option<usize>,
        duration_secs: Option<u64>,
    ) -> Result<StartResponse> {
        let url = self.url(&start_path(philosophers, duration_secs));
        let response = self
            .http
            .post(&url)
            .send()
            .with_context(|| format!("Failed to reach {url}"))?;
        decode(response, "Failed to start simulation")
    }

    pub fn stop(&self) -> Result<MessageResponse> {
        let url = self.url("/stop");
        let response = self
            .http
            .post(&url)
            .send()
            .with_context(|| format!("Failed to reach {url}"))?;
        decode(response, "Failed to stop simulation")
    }

    pub fn status(&self) -> Result<StatusReply> {
        let url = self.url("/status");
        let response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("Failed to reach {url}"))?;
        let value: serde_json::Value = decode(response, "Failed to fetch status")?;

        if value.get("states").is_some() {
            let status = serde_json::from_value(value).context("Malformed status response")?;
            Ok(StatusReply::Snapshot(status))
        } else {
            let body: MessageResponse =
                serde_json::from_value(value).context("Malformed status response")?;
            Ok(StatusReply::NoSimulation {
                message: body.message,
            })
        }
    }

    pub fn health(&self) -> Result<HealthResponse> {
        let url = self.url("/health");
        let response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("Failed to reach {url}"))?;
        decode(response, "Health check failed")
    }
}

fn start_path(philosophers: Option<usize>, duration_secs: Option<u64>) -> String {
    let mut params = Vec::new();
    if let Some(n) = philosophers {
        params.push(format!("n={n}"));
    }
    if let Some(secs) = duration_secs {
        params.push(format!("duration={secs}"));
    }
    if params.is_empty() {
        "/start".to_string()
    } else {
        format!("/start?{}", params.join("&"))
    }
}

/// Fail on non-2xx with the server's message, otherwise parse the JSON body.
fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let message = body.trim();
        if message.is_empty() {
            bail!(
                "{context}: HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            );
        }
        bail!("{context}: HTTP {} - {message}", status.as_u16());
    }
    response
        .json()
        .with_context(|| format!("{context}: malformed response body"))
}
