//! Run lock
//!
//! Two runs against the same snapshot directory would race on every file
//! they write. A run takes the lock by creating `<snapshot_dir>/.zonegen.lock`
//! exclusively and removes it when the guard is dropped.
//!
//! A lock left behind by a killed run blocks later runs until removed.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lock file name inside the snapshot directory
pub const LOCK_FILE: &str = ".zonegen.lock";

/// Guard for an exclusive run
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Take the lock in `dir`
    ///
    /// # Errors
    ///
    /// - [`Error::Locked`] if another run holds it
    /// - [`Error::Persistence`] if the lock file cannot be created
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&path).unwrap_or_default();
                return Err(Error::locked(format!(
                    "{} is held (pid {}); remove it if no other run is active",
                    path.display(),
                    holder.trim()
                )));
            }
            Err(e) => {
                return Err(Error::persistence(format!(
                    "Failed to create lock {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        // Holder pid is informational only
        let _ = writeln!(file, "{}", std::process::id());
        tracing::debug!("Acquired run lock {}", path.display());

        Ok(Self { path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release run lock {}: {}", self.path.display(), e);
        }
    }
}
