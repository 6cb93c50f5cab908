//! Filesystem helpers shared across the workspace.
//!
//! Every persistent artifact the launcher writes goes through an atomic
//! write-to-temp + rename so a crash never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{IntoIoError, IoError};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `data` to `path` through a temporary file in the same directory,
/// renaming over the target once the write completed.
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), IoError> {
    let tmp = temp_path(path);
    fs::write(&tmp, data).await.path(&tmp)?;
    fs::rename(&tmp, path).await.path(path)?;
    Ok(())
}

/// Blocking twin of [`write_atomic`], for contexts that cannot await
/// (destructors flushing unsaved state).
pub fn write_atomic_sync(path: &Path, data: &[u8]) -> Result<(), IoError> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, data).path(&tmp)?;
    std::fs::rename(&tmp, path).path(path)?;
    Ok(())
}

pub async fn ensure_dir(dir: &Path) -> Result<(), IoError> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).await.path(dir)?;
    }
    Ok(())
}

/// Removes a file, treating "already gone" as success.
pub async fn remove_file_if_exists(path: &Path) -> Result<(), IoError> {
    if let Err(error) = fs::remove_file(path).await {
        if error.kind() != std::io::ErrorKind::NotFound {
            return Err(error).path(path);
        }
    }
    Ok(())
}
