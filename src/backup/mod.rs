pub(crate) mod archive;
pub(crate) mod db_dump;
pub(crate) mod latest;
mod logic;

use std::path::PathBuf;

use crate::config::Config;
use crate::errors::Result;

/// Public entry point for the backup process. Returns the path of the
/// archive created by a successful run.
pub fn run_backup_flow(config: &Config) -> Result<PathBuf> {
    logic::perform_backup(config)
}
