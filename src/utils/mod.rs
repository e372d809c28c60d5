use std::path::PathBuf;

use which::which;

use crate::errors::{BackupError, Result};

/// Finds an executable in the system PATH.
pub fn locate_executable(name: &str) -> Result<PathBuf> {
    which(name).map_err(|_| BackupError::ExecutableNotFound(name.to_string()))
}
