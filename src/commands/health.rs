//! Health command - checks that a control server answers

use anyhow::Result;
use colored::Colorize;

use crate::client::ControlClient;

pub fn execute(server: &str) -> Result<()> {
    let client = ControlClient::new(server)?;
    let health = client.health()?;

    println!(
        "{} {} is {} at {}",
        "✓".green().bold(),
        health.service,
        health.status,
        client.base_url()
    );
    Ok(())
}
