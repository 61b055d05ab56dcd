//! Status command - shows the current simulation table

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};

use crate::client::{ControlClient, StatusReply};
use crate::monitor::PhilosopherState;
use crate::simulation::SimulationStatus;

/// Fetch `/status` and print it as a table, or as raw JSON.
pub fn execute(server: &str, json: bool) -> Result<()> {
    let client = ControlClient::new(server)?;

    match client.status()? {
        StatusReply::Snapshot(status) if json => {
            let text =
                serde_json::to_string_pretty(&status).context("Failed to encode status")?;
            println!("{text}");
        }
        StatusReply::Snapshot(status) => {
            let mut stdout = io::stdout().lock();
            render_status(&mut stdout, &status).context("Failed to write status")?;
        }
        StatusReply::NoSimulation { message } => {
            println!("{} {message}", "─".dimmed());
        }
    }
    Ok(())
}

/// Render a header line plus one row per philosopher.
pub fn render_status<W: Write>(w: &mut W, status: &SimulationStatus) -> io::Result<()> {
    let state = if status.running {
        "running".green().bold()
    } else {
        "stopped".dimmed()
    };
    write!(w, "Simulation {state} with {} philosophers", status.philosophers)?;
    if let Some(started) = status.started_at {
        write!(w, ", started {}", started.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    writeln!(w)?;

    writeln!(
        w,
        "{}",
        format!("{:>3}  {:<9} {:>6} {:>9} {:>9}", "#", "STATE", "MEALS", "WAIT", "PRIORITY")
            .bold()
    )?;
    for (i, philosopher_state) in status.states.iter().enumerate() {
        let label = format!("{:<9}", philosopher_state.as_str());
        let label = match philosopher_state {
            PhilosopherState::Eating => label.green().bold(),
            PhilosopherState::Hungry => label.yellow(),
            PhilosopherState::Thinking => label.dimmed(),
        };
        writeln!(
            w,
            "{:>3}  {} {:>6} {:>9} {:>9}",
            i,
            label,
            status.eat_count.get(i).copied().unwrap_or_default(),
            format!("{:.1}s", status.wait_duration(i).as_secs_f64()),
            status.priorities.get(i).copied().unwrap_or_default(),
        )?;
    }

    writeln!(
        w,
        "{} meals | {} eating | {} hungry",
        status.total_meals(),
        status.count_in(PhilosopherState::Eating),
        status.count_in(PhilosopherState::Hungry)
    )
}
