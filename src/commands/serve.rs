//! Serve command - runs the HTTP control server in the foreground

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::ServerConfig;
use crate::server::ControlServer;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
}

/// Resolve the effective configuration for `serve`.
pub fn resolve_config(options: &ServeOptions) -> Result<ServerConfig> {
    let mut config = match &options.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::discover()?,
    };
    if let Some(host) = &options.host {
        config.host = host.clone();
    }
    if let Some(port) = options.port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

/// Run the control server until Ctrl-C.
pub fn execute(options: ServeOptions) -> Result<()> {
    let config = resolve_config(&options)?;
    let server = ControlServer::new(config);
    let listener = server.bind()?;
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;

    let handle = server.shutdown_handle();
    ctrlc::set_handler(move || handle.shutdown()).context("Failed to set Ctrl-C handler")?;

    let limits = server.config().limits;
    println!("{}", "Dining Philosophers Monitor".bold().blue());
    println!("{}", "=".repeat(50));
    println!("  Listening on http://{addr} (CORS enabled for all origins)");
    println!(
        "  GET/POST /start?n={}&duration={}",
        limits.default_philosophers, limits.default_duration_secs
    );
    println!("  GET/POST /stop");
    println!("  GET      /status");
    println!("  GET      /health");
    println!("{}", "=".repeat(50));
    println!("{} Press Ctrl-C to stop", "→".cyan().bold());

    server.serve(listener)?;

    println!("{} Server stopped", "✓".green().bold());
    Ok(())
}
