//! Waypoint CLI - Resilient record lookup from the command line
//!
//! Usage:
//!   waypoint search [text] [--field k=v]   - Search; an outage prints no records
//!   waypoint view <id> [--max-retries N]   - Load one record, exit 1 on failure
//!   waypoint demo                          - Walk the retry and degradation paths
//!   waypoint burst <id>...                 - Concurrent lookups, one controller

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cli::commands::{BurstCommand, DemoCommand, SearchCommand, ViewCommand};
use cli::wiring::{load_config, App};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Waypoint - Layered record lookup with bounded retries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON, or YAML by extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search records
    Search(SearchCommand),
    /// Show one record with retries
    View(ViewCommand),
    /// Run the scripted walkthrough
    Demo(DemoCommand),
    /// Look up several records concurrently
    Burst(BurstCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search(cmd) => cmd.run(&App::from_config(config)?, cli.json),
        Commands::View(cmd) => cmd.run(&App::from_config(config)?, cli.json),
        Commands::Demo(cmd) => cmd.run(&config, cli.json),
        Commands::Burst(cmd) => cmd.run(&App::from_config(config)?, cli.json),
    }
}
