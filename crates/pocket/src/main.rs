use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use ledger::LedgerStore;
use ledger_sync::{HttpLedger, SyncCoordinator};
use tracing_subscriber::EnvFilter;

use crate::{config::Cli, error::Result};

mod commands;
mod config;
mod error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let settings = cli.settings()?;

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pocket={level},ledger={level},ledger_sync={level}",
            level = settings.level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(base_url = %settings.base_url, "starting");
    let remote = HttpLedger::new(&settings.base_url, settings.timeout())?;
    let coordinator = SyncCoordinator::new(remote, settings.session_user(), LedgerStore::new());

    commands::run(&coordinator, cli.command, cli.json, Utc::now()).await
}
