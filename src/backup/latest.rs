// mysqlbackuptool/src/backup/latest.rs
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::errors::{BackupError, Result};

pub const LATEST_POINTER_NAME: &str = "mysql-db-backup-latest.tar.bz2";

/// Repoints the stable latest name at the newest archive.
///
/// The symlink targets the archive's base filename, not its absolute path,
/// so the backup directory stays relocatable as a whole. Replacement is
/// remove-then-create; a crash between the two steps leaves no pointer.
pub fn update_latest(archive_path: &Path, config: &Config) -> Result<()> {
    let pointer = config.backup_dir.join(LATEST_POINTER_NAME);
    let target = archive_path.file_name().ok_or_else(|| {
        BackupError::PointerUpdate(io::Error::new(
            io::ErrorKind::InvalidInput,
            "archive path has no file name",
        ))
    })?;

    // symlink_metadata also sees dangling links left by interrupted runs
    if pointer.symlink_metadata().is_ok() {
        fs::remove_file(&pointer).map_err(BackupError::PointerUpdate)?;
    }
    symlink(target, &pointer).map_err(BackupError::PointerUpdate)?;

    info!(
        "latest pointer now references {}",
        Path::new(target).display()
    );
    Ok(())
}
