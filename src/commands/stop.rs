//! Stop command - stops the running simulation on the control server

use anyhow::{Context, Result};
use colored::Colorize;

use crate::client::ControlClient;

/// Stop the simulation and wait for the server to join its threads.
pub fn execute(server: &str) -> Result<()> {
    let client = ControlClient::new(server)?;

    println!("{} Stopping simulation...", "→".cyan().bold());
    let stopped = client.stop().context("Failed to stop simulation")?;

    println!("{} {}", "✓".green().bold(), stopped.message);
    Ok(())
}
