//! foldersync - keep a replica directory identical to a source directory.
//!
//! Usage:
//!   foldersync --source SRC --replica DST --interval SECS --log FILE
//!
//! A full pass runs immediately and then every `--interval` seconds until
//! Ctrl-C. Every action is logged to `--log` and to stderr.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tokio_util::sync::CancellationToken;

use foldersync_core::SyncError;
use foldersync_sync::{Scheduler, SyncConfig, TracingObserver};

#[derive(Parser)]
#[command(
    name = "foldersync",
    version,
    about = "Periodic one-way folder synchronization",
    long_about = "foldersync keeps a replica directory identical to a source directory.\n\n\
                  Files and directories missing from the replica are copied, changed files \
                  are overwritten and anything absent from the source is deleted."
)]
struct Cli {
    /// Directory to mirror from
    #[arg(long)]
    source: PathBuf,

    /// Directory kept identical to the source (created if missing)
    #[arg(long)]
    replica: PathBuf,

    /// Seconds to wait between synchronization passes
    #[arg(long)]
    interval: u64,

    /// Log file, appended to (parent directories are created)
    #[arg(long)]
    log: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init(&cli.log).context("Failed to set up logging")?;

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("{error}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    // Startup and pass errors are already logged by the observer
    let mut scheduler = match Scheduler::start(config, Arc::new(TracingObserver::new())) {
        Ok(scheduler) => scheduler,
        Err(_) => return Ok(ExitCode::FAILURE),
    };

    match scheduler.run(shutdown).await {
        Ok(passes) => {
            tracing::debug!("Completed {passes} passes");
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn build_config(cli: Cli) -> Result<SyncConfig, SyncError> {
    SyncConfig::builder()
        .source(cli.source)
        .replica(cli.replica)
        .interval(Duration::from_secs(cli.interval))
        .build()
        .map_err(|e| SyncError::InvalidConfig {
            message: e.to_string(),
        })
}

/// Request a stop on the first Ctrl-C.
async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => shutdown.cancel(),
        Err(e) => tracing::error!("Unable to listen for Ctrl-C: {e}"),
    }
}
