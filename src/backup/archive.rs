// mysqlbackuptool/src/backup/archive.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;
use tracing::info;

use crate::config::Config;
use crate::errors::{BackupError, Result};

pub const ARCHIVE_PREFIX: &str = "mysql-db-backup_";

/// Bundles the per-database dump files into a bzip2-compressed tar archive
/// in the backup directory.
///
/// Members are named `<database>.sql` relative to the scratch directory,
/// so the archive carries no absolute paths. Returns the absolute path of
/// the created archive.
pub fn create_archive(
    databases: &[String],
    config: &Config,
    scratch_dir: &Path,
) -> Result<PathBuf> {
    if !config.tar_bin.is_file() {
        return Err(BackupError::ExecutableNotFound(
            config.tar_bin.display().to_string(),
        ));
    }
    if !config.backup_dir.exists() {
        fs::create_dir_all(&config.backup_dir)?;
    } else if !config.backup_dir.is_dir() {
        return Err(BackupError::NotADirectory(config.backup_dir.clone()));
    }

    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
    let archive_path =
        absolute(&config.backup_dir)?.join(format!("{ARCHIVE_PREFIX}{timestamp}.tar.bz2"));
    info!("compressing dumps to {}", archive_path.display());

    let mut command = Command::new(&config.tar_bin);
    command
        .arg("-cjf")
        .arg(&archive_path)
        .arg("-C")
        .arg(scratch_dir);
    if databases.is_empty() {
        // tar refuses to create an archive with zero members
        command.args(["--files-from", "/dev/null"]);
    }
    for database in databases {
        command.arg(format!("{database}.sql"));
    }

    let output = command.output().map_err(|e| BackupError::Compression {
        stderr: e.to_string(),
    })?;
    if !output.status.success() {
        // a partially written archive, if any, is left in place
        return Err(BackupError::Compression {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(archive_path)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    // stub tar that records its arguments next to itself and creates the
    // output file it was asked for ("$2" follows -cjf)
    const TAR_STUB: &str = "#!/bin/sh\n\
        d=$(dirname \"$0\")\n\
        printf '%s\\n' \"$@\" > \"$d/tar_args.txt\"\n\
        echo 'archive' > \"$2\"\n";

    fn stub_config(tar_bin: PathBuf, backup_dir: PathBuf) -> Config {
        Config {
            backup_dir,
            mysql_bin: PathBuf::from("/bin/sh"),
            mysqldump_bin: PathBuf::from("/bin/sh"),
            tar_bin,
            db_user: None,
            db_passwd: None,
            db_host: None,
            db_port: None,
            ignore: Vec::new(),
            log_filename: None,
        }
    }

    fn assert_archive_name(path: &Path) {
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(ARCHIVE_PREFIX), "unexpected name {name}");
        assert!(name.ends_with(".tar.bz2"), "unexpected name {name}");
        let stamp = &name[ARCHIVE_PREFIX.len()..name.len() - ".tar.bz2".len()];
        // YYYY-MM-DD_HHMMSS
        assert_eq!(stamp.len(), 17, "unexpected timestamp {stamp}");
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[7..8], "-");
        assert_eq!(&stamp[10..11], "_");
    }

    #[test]
    fn test_create_archive_names_members_relative_to_scratch() -> Result<()> {
        let stubs = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let tar = write_stub(stubs.path(), "tar", TAR_STUB);
        let config = stub_config(tar, backup.path().to_path_buf());

        let databases = vec!["app".to_string(), "logs".to_string()];
        let archive_path = create_archive(&databases, &config, scratch.path())?;

        assert!(archive_path.is_absolute());
        assert!(archive_path.is_file());
        assert_archive_name(&archive_path);

        let args = fs::read_to_string(stubs.path().join("tar_args.txt"))?;
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(args[0], "-cjf");
        assert_eq!(args[1], archive_path.to_str().unwrap());
        assert_eq!(args[2], "-C");
        assert_eq!(args[3], scratch.path().to_str().unwrap());
        assert_eq!(&args[4..], ["app.sql", "logs.sql"]);
        Ok(())
    }

    #[test]
    fn test_empty_database_list_still_produces_an_archive() -> Result<()> {
        let stubs = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let tar = write_stub(stubs.path(), "tar", TAR_STUB);
        let config = stub_config(tar, backup.path().to_path_buf());

        let archive_path = create_archive(&[], &config, scratch.path())?;
        assert!(archive_path.is_file());

        let args = fs::read_to_string(stubs.path().join("tar_args.txt"))?;
        assert!(args.lines().any(|a| a == "--files-from"));
        Ok(())
    }

    #[test]
    fn test_missing_backup_dir_is_created() -> Result<()> {
        let stubs = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let tar = write_stub(stubs.path(), "tar", TAR_STUB);
        let backup_dir = root.path().join("nested").join("backups");
        let config = stub_config(tar, backup_dir.clone());

        create_archive(&["app".to_string()], &config, scratch.path())?;
        assert!(backup_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_backup_path_that_is_a_file_is_fatal() {
        let stubs = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let tar = write_stub(stubs.path(), "tar", TAR_STUB);
        let backup_dir = root.path().join("backups");
        fs::write(&backup_dir, "not a directory").unwrap();
        let config = stub_config(tar, backup_dir);

        let result = create_archive(&["app".to_string()], &config, scratch.path());
        assert!(matches!(result, Err(BackupError::NotADirectory(_))));
    }

    #[test]
    fn test_nonexistent_tar_binary_is_fatal() {
        let backup = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let config = stub_config(
            PathBuf::from("/nonexistent/tar"),
            backup.path().to_path_buf(),
        );

        let result = create_archive(&["app".to_string()], &config, scratch.path());
        assert!(matches!(result, Err(BackupError::ExecutableNotFound(_))));
    }

    #[test]
    fn test_tar_failure_carries_stderr() {
        let stubs = tempfile::tempdir().unwrap();
        let backup = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let tar = write_stub(
            stubs.path(),
            "tar",
            "#!/bin/sh\necho 'tar: bzip2 not available' >&2\nexit 2\n",
        );
        let config = stub_config(tar, backup.path().to_path_buf());

        match create_archive(&["app".to_string()], &config, scratch.path()) {
            Err(BackupError::Compression { stderr }) => {
                assert!(stderr.contains("bzip2 not available"))
            }
            other => panic!("expected Compression error, got {other:?}"),
        }
    }
}
