//! Start command - asks the control server to begin a run

use anyhow::Result;
use colored::Colorize;

use crate::client::ControlClient;

/// Start a run; `None` lets the server pick its default.
pub fn execute(
    server: &str,
    philosophers: Option<usize>,
    duration_secs: Option<u64>,
) -> Result<()> {
    let client = ControlClient::new(server)?;
    let started = client.start(philosophers, duration_secs)?;

    println!("{} {}", "✓".green().bold(), started.message);
    println!(
        "  {} dining status --server {}",
        "Watch with:".dimmed(),
        client.base_url()
    );
    Ok(())
}
