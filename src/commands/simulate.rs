//! Simulate command - runs a simulation in-process without a server

use anyhow::{Context, Result};
use colored::Colorize;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::status::render_status;
use crate::simulation::{Simulation, SimulationConfig};

/// Run `philosophers` for `duration_secs`, printing the table every
/// `interval_ms`. Ctrl-C ends the run early.
pub fn execute(philosophers: usize, duration_secs: u64, interval_ms: u64) -> Result<()> {
    let config = SimulationConfig::new(philosophers, Duration::from_secs(duration_secs))?;
    let simulation = Simulation::new(config)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to set Ctrl-C handler")?;

    println!(
        "{} Simulating {philosophers} philosophers for {duration_secs}s (Ctrl-C to stop early)",
        "→".cyan().bold()
    );
    simulation.start()?;

    let interval = Duration::from_millis(interval_ms.max(1));
    loop {
        if simulation.wait_stopped(interval) {
            break;
        }
        if interrupted.load(Ordering::SeqCst) {
            println!("{} Interrupted, stopping...", "→".cyan().bold());
            simulation.stop();
            break;
        }
        println!();
        render_status(&mut io::stdout().lock(), &simulation.status())
            .context("Failed to write status")?;
    }

    let status = simulation.status();
    println!("\n{}", "Final state".bold());
    render_status(&mut io::stdout().lock(), &status).context("Failed to write status")?;

    let fewest = status.eat_count.iter().min().copied().unwrap_or_default();
    let most = status.eat_count.iter().max().copied().unwrap_or_default();
    println!(
        "{} {} meals, spread {}..={} per philosopher",
        "✓".green().bold(),
        status.total_meals(),
        fewest,
        most
    );
    Ok(())
}
