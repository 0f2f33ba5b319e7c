//! Backup-before-mutate and restore-from-backup.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FixError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    Written,
    /// A backup already existed and `force` was off.
    Kept,
}

/// `movie.srt` -> `movie.srt.bkp`
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// `movie.srt.bkp` -> `movie.srt`, or `None` when `path` lacks the suffix.
pub fn original_path(path: &Path, suffix: &str) -> Option<PathBuf> {
    // a plain `.ext` suffix also works for names that are not UTF-8
    if let Some(ext) = suffix.strip_prefix('.').filter(|e| !e.is_empty() && !e.contains('.')) {
        if path.extension() == Some(OsStr::new(ext)) {
            return Some(path.with_extension(""));
        }
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let original = name.strip_suffix(suffix).filter(|s| !s.is_empty())?;
    Some(path.with_file_name(original))
}

/// Copies `path` to its backup sibling unless a backup exists and `force` is off.
pub fn backup(path: &Path, suffix: &str, force: bool) -> Result<BackupOutcome> {
    let target = backup_path(path, suffix);
    if !force && target.exists() {
        warn!(
            backup = %target.display(),
            "Backup already exists, keeping it (use --force to overwrite)"
        );
        return Ok(BackupOutcome::Kept);
    }
    fs::copy(path, &target).map_err(|e| FixError::io(path, e))?;
    debug!(file = %path.display(), backup = %target.display(), "Backed up");
    Ok(BackupOutcome::Written)
}

/// Moves a backup over its original path and returns that path.
pub fn restore(backup: &Path, suffix: &str) -> Result<PathBuf> {
    let original = original_path(backup, suffix)
        .ok_or_else(|| FixError::NotABackup(backup.to_path_buf()))?;
    fs::rename(backup, &original).map_err(|e| FixError::io(backup, e))?;
    Ok(original)
}
