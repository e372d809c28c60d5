// mysqlbackuptool/src/config/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use crate::errors::{BackupError, Result};
use crate::utils::locate_executable;

/// Config file consulted when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/mysqlbackuptool.conf";

const DEFAULT_BACKUP_DIR: &str = "/backup";

/// Resolved program configuration, constructed once per run and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    pub backup_dir: PathBuf,
    pub mysql_bin: PathBuf,
    pub mysqldump_bin: PathBuf,
    pub tar_bin: PathBuf,
    pub db_user: Option<String>,
    pub db_passwd: Option<String>,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub ignore: Vec<String>,
    pub log_filename: Option<PathBuf>,
}

/// File-level overrides before defaults and PATH lookups are applied.
#[derive(Debug, Default)]
struct RawConfig {
    backup_dir: Option<PathBuf>,
    mysql_bin: Option<PathBuf>,
    mysqldump_bin: Option<PathBuf>,
    tar_bin: Option<PathBuf>,
    db_user: Option<String>,
    db_passwd: Option<String>,
    db_host: Option<String>,
    db_port: Option<String>,
    ignore: Option<Vec<String>>,
    log_filename: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from `path` (or the default file, when it
    /// exists) and finalizes unset executable paths through a PATH search.
    ///
    /// A path given explicitly must be readable and parseable; the default
    /// file is allowed to be absent, in which case built-in defaults apply.
    pub fn resolve(path: Option<&Path>) -> Result<Config> {
        let mut raw = RawConfig::default();
        match path {
            Some(declared) => raw.merge_file(declared)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    raw.merge_file(default_path)?;
                }
            }
        }
        raw.finalize()
    }
}

impl RawConfig {
    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let table: toml::Table = contents.parse().map_err(|e| {
            BackupError::Config(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        for (key, value) in &table {
            match value {
                Value::Table(section) => {
                    for (option, value) in section {
                        self.apply(option, value);
                    }
                }
                // tolerate section-less files
                other => self.apply(key, other),
            }
        }
        Ok(())
    }

    /// Applies a single option, matching names case-insensitively.
    /// Unrecognized options are skipped.
    fn apply(&mut self, option: &str, value: &Value) {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match option.to_uppercase().as_str() {
            "BACKUP_DIR" => self.backup_dir = Some(PathBuf::from(text)),
            "MYSQL_BIN" => self.mysql_bin = Some(PathBuf::from(text)),
            "MYSQLDUMP_BIN" => self.mysqldump_bin = Some(PathBuf::from(text)),
            "TAR_BIN" => self.tar_bin = Some(PathBuf::from(text)),
            "DB_USER" => self.db_user = Some(text),
            "DB_PASSWD" => self.db_passwd = Some(text),
            "DB_HOST" => self.db_host = Some(text),
            "DB_PORT" => self.db_port = Some(text),
            "IGNORE" => {
                self.ignore = Some(text.split_whitespace().map(str::to_string).collect())
            }
            "LOG_FILENAME" => self.log_filename = Some(PathBuf::from(text)),
            _ => {}
        }
    }

    fn finalize(self) -> Result<Config> {
        let mysql_bin = match self.mysql_bin {
            Some(path) => path,
            None => locate_executable("mysql")?,
        };
        let mysqldump_bin = match self.mysqldump_bin {
            Some(path) => path,
            None => locate_executable("mysqldump")?,
        };
        let tar_bin = match self.tar_bin {
            Some(path) => path,
            None => locate_executable("tar")?,
        };

        Ok(Config {
            backup_dir: self
                .backup_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR)),
            mysql_bin,
            mysqldump_bin,
            tar_bin,
            db_user: self.db_user,
            db_passwd: self.db_passwd,
            db_host: self.db_host,
            db_port: self.db_port,
            ignore: self.ignore.unwrap_or_default(),
            log_filename: self.log_filename,
        })
    }
}
