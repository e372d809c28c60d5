// mysqlbackuptool/src/backup/db_dump.rs
use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::Config;
use crate::errors::{BackupError, Result};

const LIST_DATABASES_QUERY: &str = "SELECT DISTINCT(SCHEMA_NAME) FROM SCHEMATA";

/// Connection flags mirrored from configuration, shared by the mysql
/// client and mysqldump invocations. Unset credentials emit no flag.
pub(crate) fn connection_args(config: &Config) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(user) = &config.db_user {
        args.push(format!("--user={user}"));
    }
    if let Some(passwd) = &config.db_passwd {
        args.push(format!("--password={passwd}"));
    }
    if let Some(host) = &config.db_host {
        args.push(format!("--host={host}"));
    }
    if let Some(port) = &config.db_port {
        args.push(format!("--port={port}"));
    }
    args
}

/// Queries the server's metadata catalog for the set of database names,
/// in server-reported order.
///
/// The configured ignore list is not applied here; callers receive the
/// list exactly as the server returned it.
pub fn list_databases(config: &Config) -> Result<Vec<String>> {
    debug!(
        "listing databases via {} against information_schema",
        config.mysql_bin.display()
    );
    let output = Command::new(&config.mysql_bin)
        .args(connection_args(config))
        .args(["-s", "-N", "information_schema", "-e", LIST_DATABASES_QUERY])
        .output()
        .map_err(|e| BackupError::Query {
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(BackupError::Query {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let databases = String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .map(str::to_string)
        .collect();
    Ok(databases)
}

/// Dumps each database, in the order supplied, to `<scratch>/<name>.sql`.
///
/// `--single-transaction` gives a consistent snapshot without locking the
/// whole server. The first failing dump aborts the run; databases after it
/// are never touched, and the failing database's partial file is removed.
pub fn dump_all(databases: &[String], config: &Config, scratch_dir: &Path) -> Result<()> {
    for database in databases {
        info!("dumping database {database}");
        let dump_path = scratch_dir.join(format!("{database}.sql"));
        let dump_file = File::create(&dump_path)?;

        let result = Command::new(&config.mysqldump_bin)
            .arg("--single-transaction")
            .args(connection_args(config))
            .arg(database)
            .stdout(Stdio::from(dump_file))
            .output();

        let failure = match &result {
            Ok(output) if output.status.success() => None,
            Ok(output) => Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(stderr) = failure {
            let _ = fs::remove_file(&dump_path);
            return Err(BackupError::Dump {
                database: database.clone(),
                stderr,
            });
        }
    }
    Ok(())
}
