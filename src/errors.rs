use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Executable '{0}' not found in PATH")]
    ExecutableNotFound(String),

    #[error("Database enumeration failed: {stderr}")]
    Query { stderr: String },

    #[error("Dump of database '{database}' failed: {stderr}")]
    Dump { database: String, stderr: String },

    #[error("Archive compression failed: {stderr}")]
    Compression { stderr: String },

    #[error("Backup path {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to create scratch directory: {0}")]
    ScratchCreate(#[source] std::io::Error),

    #[error("Failed to update latest pointer: {0}")]
    PointerUpdate(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;
