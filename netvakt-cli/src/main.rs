//! ## netvakt-cli
//! **Operator interface for the netvakt monitor**
//!
//! Runs a monitor over synthetic or replayed traffic, records scenarios and
//! exports the Prometheus counters.

use clap::Parser;
use netvakt_telemetry::EventLogger;

mod commands;
mod report;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    EventLogger::init(&config.telemetry);

    match cli.command {
        Commands::Monitor(args) => commands::run_monitor(config, args).await,
        Commands::Record(args) => commands::record_scenario(config, args),
        Commands::Metrics(args) => commands::export_metrics(config, args).await,
    }
}
