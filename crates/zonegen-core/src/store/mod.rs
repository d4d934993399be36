//! Zone store implementations

pub mod file;
pub mod memory;

pub use file::FileZoneStore;
pub use memory::MemoryZoneStore;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;

/// Replace `path` with `contents` via a sibling temp file and rename
///
/// Readers see either the old file or the new one, never a partial write.
/// On failure the temp file is removed.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let temp_path = temp_path(path);

    let result = match write_temp(&temp_path, contents).await {
        Ok(()) => fs::rename(&temp_path, path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        }),
        Err(e) => Err(e),
    };

    if result.is_err() {
        discard(&temp_path).await;
    }
    result
}

async fn write_temp(temp_path: &Path, contents: &[u8]) -> Result<(), Error> {
    let mut file = fs::File::create(temp_path).await.map_err(|e| {
        Error::persistence(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    file.write_all(contents).await.map_err(|e| {
        Error::persistence(format!(
            "Failed to write to temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    file.sync_all().await.map_err(|e| {
        Error::persistence(format!(
            "Failed to sync temp file {}: {}",
            temp_path.display(),
            e
        ))
    })
}

/// Best-effort removal of a temp file left by a failed write
async fn discard(temp_path: &Path) {
    match fs::remove_file(temp_path).await {
        Ok(()) => tracing::debug!("Removed temp file {}", temp_path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove temp file {}: {}", temp_path.display(), e),
    }
}

/// Zone file names are full of dots ("db.192.168"), so the temp suffix is
/// appended rather than swapped in as an extension.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".zonegen-tmp");
    path.with_file_name(name)
}
