mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventcal_core::config::HarvestConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventcal")]
#[command(about = "Harvest the event listing into a CSV store and an .ics calendar")]
struct Cli {
    /// Config file (defaults to ./eventcal.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest, update the store and write the calendars (default)
    Run,
    /// Harvest and update the store only
    Harvest,
    /// Write the full calendar from the store, without fetching anything
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = HarvestConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config).await,
        Commands::Harvest => commands::harvest::run(config).await,
        Commands::Export => commands::export::run(config),
    }
}
