use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::core_api::CoreError;

pub const BACKUP_SUFFIX: &str = ".bak";

/// `save.json` -> `save.json.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Byte-for-byte copy that keeps permissions and the modification time.
/// Only the copy itself can fail the backup; a lost timestamp is logged.
pub fn write_backup(path: &Path, backup: &Path) -> Result<(), CoreError> {
    fs::copy(path, backup).map_err(|e| {
        CoreError::io(
            format!("failed to back up {} to {}", path.display(), backup.display()),
            e,
        )
    })?;

    if let Err(e) = copy_modified_time(path, backup) {
        warn!(
            backup = %backup.display(),
            error = %e,
            "could not carry modification time over to backup"
        );
    }
    Ok(())
}

/// The backup may be read-only after `fs::copy`, so its handle is opened for
/// reading only. Setting explicit times needs ownership, not write access.
fn copy_modified_time(path: &Path, backup: &Path) -> io::Result<()> {
    let modified = fs::metadata(path)?.modified()?;
    File::open(backup)?.set_modified(modified)
}

/// Writes through a sibling temp file and renames it over `path`, so a failure
/// leaves the original untouched.
pub fn write_atomic(path: &Path, text: &str) -> Result<(), CoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map(|meta| meta.permissions()).ok();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        CoreError::io(format!("failed to create temp file in {}", dir.display()), e)
    })?;
    tmp.write_all(text.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| CoreError::io(format!("failed to write {}", tmp.path().display()), e))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions).map_err(|e| {
            CoreError::io(
                format!("failed to set permissions on {}", tmp.path().display()),
                e,
            )
        })?;
    }

    tmp.persist(path)
        .map_err(|e| CoreError::io(format!("failed to replace {}", path.display()), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("saves/slot1.json")),
            PathBuf::from("saves/slot1.json.bak")
        );
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn backup_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{\"cash\":1}\r\n").unwrap();
        let backup = backup_path(&path);
        write_backup(&path, &backup).unwrap();
        assert_eq!(fs::read(&backup).unwrap(), fs::read(&path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn backup_of_read_only_save_keeps_modification_time() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, SystemTime};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{\"cash\":1}").unwrap();
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        let backup = backup_path(&path);
        write_backup(&path, &backup).unwrap();

        let meta = fs::metadata(&backup).unwrap();
        assert_eq!(meta.modified().unwrap(), modified);
        assert_eq!(meta.permissions().mode() & 0o777, 0o444);
    }
}
