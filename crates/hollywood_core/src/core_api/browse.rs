use std::fs;
use std::path::{Path, PathBuf};

use super::error::CoreError;

const SAVE_EXTENSION: &str = "json";

/// Starting directory for picking a save file: the user's home directory.
pub fn default_browse_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// `*.json` files directly inside `dir`, sorted by name. Backups are skipped.
pub fn list_save_candidates(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| CoreError::io(format!("failed to list {}", dir.display()), e))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CoreError::io(format!("failed to list {}", dir.display()), e))?;
        let path = entry.path();
        let is_save = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SAVE_EXTENSION));
        if is_save {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
