// mysqlbackuptool/src/backup/logic.rs
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{error, info, warn};

use super::{archive, db_dump, latest};
use crate::config::Config;
use crate::errors::{BackupError, Result};

/// Runs one backup: enumerate, dump, archive, repoint latest.
///
/// The scratch directory is removed after the dump/archive phase on
/// success and failure alike; the latest pointer is only touched once that
/// cleanup has succeeded. A pointer-update failure fails the run, but the
/// timestamped archive already on disk stays valid.
pub fn perform_backup(config: &Config) -> Result<PathBuf> {
    let scratch = TempDir::with_prefix("mysql-db-backup").map_err(BackupError::ScratchCreate)?;
    info!("scratch directory created at {}", scratch.path().display());

    let databases = db_dump::list_databases(config)?;
    info!("found {} database(s) to back up", databases.len());
    if !config.ignore.is_empty() {
        // parsed and reported, but not applied to the database list
        info!("configured ignore list: {:?}", config.ignore);
    }

    let archived = dump_and_archive(&databases, config, scratch.path());

    let scratch_path = scratch.path().to_path_buf();
    let cleanup = scratch.close();
    let archive_path = archived?;
    if let Err(e) = cleanup {
        warn!(
            "failed to remove scratch directory {}: {e}",
            scratch_path.display()
        );
        return Err(BackupError::Io(e));
    }

    if let Err(e) = latest::update_latest(&archive_path, config) {
        error!(
            "latest pointer update failed; archive remains valid at {}",
            archive_path.display()
        );
        return Err(e);
    }

    info!("backup archive created at {}", archive_path.display());
    Ok(archive_path)
}

fn dump_and_archive(databases: &[String], config: &Config, scratch_dir: &Path) -> Result<PathBuf> {
    db_dump::dump_all(databases, config, scratch_dir)?;
    archive::create_archive(databases, config, scratch_dir)
}
