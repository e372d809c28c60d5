//! MySQL Database Backup Tool
//!
//! Dumps every database on a MySQL-compatible server, bundles the dumps
//! into a timestamped bzip2 archive and maintains a "latest" pointer.

// mysqlbackuptool/src/main.rs
mod backup;
mod config;
mod errors;
mod utils;

use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

/// Main entry point for the backup tool
fn main() -> ExitCode {
    match run_app() {
        Ok(_) => {
            println!("✅ Backup completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run_app() -> Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::resolve(config_path.as_deref())
        .context("Failed to load configuration")?;
    init_logging(config.log_filename.as_deref());

    let archive_path = backup::run_backup_flow(&config).context("Backup process failed")?;
    info!("backup finished: {}", archive_path.display());
    Ok(())
}

/// Sets up the tracing subscriber, writing to the configured log file when
/// one is set. A log file that cannot be opened degrades to a stderr
/// warning rather than aborting the run.
fn init_logging(log_filename: Option<&Path>) {
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_filename {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not open log file {}: {e}; logging to stderr",
                    path.display()
                );
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
