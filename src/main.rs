use anyhow::Result;
use clap::{Parser, Subcommand};
use dining::client::DEFAULT_SERVER_URL;
use dining::commands::serve::ServeOptions;
use dining::commands::{health, serve, simulate, start, status, stop};
use dining::logging;
use dining::validation::{clap_duration_validator, clap_philosophers_validator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dining")]
#[command(about = "Priority-aware dining philosophers monitor with an HTTP control service", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP control server in the foreground
    Serve {
        /// Address to bind (default from config, else 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default from config, else 8080)
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file (default: ./dining.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Start a simulation on a running server
    Start {
        /// Number of philosophers (server default: 5)
        #[arg(short = 'n', long)]
        philosophers: Option<usize>,

        /// Run length in seconds (server default: 60)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Control server URL
        #[arg(long, env = "DINING_SERVER", default_value = DEFAULT_SERVER_URL)]
        server: String,
    },

    /// Stop the running simulation
    Stop {
        /// Control server URL
        #[arg(long, env = "DINING_SERVER", default_value = DEFAULT_SERVER_URL)]
        server: String,
    },

    /// Show philosopher states, meals, waits and priorities
    Status {
        /// Control server URL
        #[arg(long, env = "DINING_SERVER", default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// Print the raw JSON snapshot
        #[arg(long)]
        json: bool,
    },

    /// Check that the control server is up
    Health {
        /// Control server URL
        #[arg(long, env = "DINING_SERVER", default_value = DEFAULT_SERVER_URL)]
        server: String,
    },

    /// Run a simulation in this process and print the table as it runs
    Simulate {
        /// Number of philosophers (2-100)
        #[arg(short = 'n', long, default_value = "5", value_parser = clap_philosophers_validator)]
        philosophers: usize,

        /// Run length in seconds (60-1200)
        #[arg(short, long, default_value = "60", value_parser = clap_duration_validator)]
        duration: u64,

        /// Milliseconds between table refreshes
        #[arg(short, long, default_value_t = 2000)]
        interval: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Serve { host, port, config } => serve::execute(ServeOptions { host, port, config }),
        Commands::Start {
            philosophers,
            duration,
            server,
        } => start::execute(&server, philosophers, duration),
        Commands::Stop { server } => stop::execute(&server),
        Commands::Status { server, json } => status::execute(&server, json),
        Commands::Health { server } => health::execute(&server),
        Commands::Simulate {
            philosophers,
            duration,
            interval,
        } => simulate::execute(philosophers, duration, interval),
    }
}
