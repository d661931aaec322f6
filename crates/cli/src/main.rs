//! transit - command-line host for the offline worker.
//!
//! CLI entry point that dispatches to subcommands.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use transit_client::{FetchClient, FetchConfig, Worker, WorkerConfig};
use transit_core::{AppConfig, CacheDb};

mod args;
mod commands;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug; the `transit` prefix also matches transit_client and transit_core
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("transit=info"),
        _ => EnvFilter::new("transit=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = AppConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let worker = build_worker(&config).await?;

    let result = match cli.command {
        Commands::Install => commands::install(&worker).await,
        Commands::Activate => commands::activate(&worker).await,
        Commands::Fetch(args) => commands::fetch(&worker, args).await,
        Commands::Get(args) => commands::get(&worker, &args).await,
        Commands::Status => commands::status(&worker).await,
    };

    worker.flush().await;
    result
}

async fn build_worker(config: &AppConfig) -> Result<Worker> {
    let storage = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(config))?;
    let worker = Worker::new(WorkerConfig::from_app_config(config)?, Arc::new(storage), Arc::new(network))?;
    Ok(worker)
}
