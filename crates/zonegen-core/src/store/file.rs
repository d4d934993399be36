// # File Zone Store
//
// File-based implementation of ZoneStore.
//
// ## Layout
//
// ```text
// <snapshot_dir>/<forward file>   unstamped, read back for change detection
// <snapshot_dir>/<reverse file>
// <live_dir>/<forward file>       stamped, loaded by the name server
// <live_dir>/<reverse file>
// ```
//
// File names are taken from the templates, so `templates/db.example.com`
// publishes `<live_dir>/db.example.com`.
//
// ## Crash Behavior
//
// - Every file is replaced by write-then-rename, so no file is ever torn
// - The snapshot/live pair is not transactional: a crash between the two
//   renames leaves a new snapshot next to the previous live file

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::config::ZonesConfig;
use crate::store::write_atomic;
use crate::traits::zone_store::ZoneStore;
use crate::zone::ZoneKind;

/// File-based zone store
///
/// # Example
///
/// ```rust,no_run
/// use zonegen_core::store::FileZoneStore;
/// use zonegen_core::traits::ZoneStore;
/// use zonegen_core::ZoneKind;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileZoneStore::new(
///         "/var/lib/zonegen",
///         "/etc/bind/zones",
///         "db.example.com",
///         "db.192.168",
///     )
///     .await?;
///
///     let previous = store.read_snapshot(ZoneKind::Forward).await?;
///     println!("{} bytes published last time", previous.len());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileZoneStore {
    snapshot_dir: PathBuf,
    live_dir: PathBuf,
    forward_name: OsString,
    reverse_name: OsString,
}

impl FileZoneStore {
    /// Create a file zone store
    ///
    /// The snapshot directory is created if it does not exist. The live
    /// directory belongs to the name server and must already exist.
    pub async fn new(
        snapshot_dir: impl Into<PathBuf>,
        live_dir: impl Into<PathBuf>,
        forward_name: impl Into<OsString>,
        reverse_name: impl Into<OsString>,
    ) -> Result<Self, Error> {
        let snapshot_dir = snapshot_dir.into();
        let live_dir = live_dir.into();

        if !fs::try_exists(&snapshot_dir).await.unwrap_or(false) {
            fs::create_dir_all(&snapshot_dir).await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create snapshot directory {}: {}",
                    snapshot_dir.display(),
                    e
                ))
            })?;
            tracing::info!("Created snapshot directory {}", snapshot_dir.display());
        }

        Ok(Self {
            snapshot_dir,
            live_dir,
            forward_name: forward_name.into(),
            reverse_name: reverse_name.into(),
        })
    }

    /// Create a store whose file names follow the configured templates
    pub async fn from_config(config: &ZonesConfig) -> Result<Self, Error> {
        let forward_name = template_file_name(&config.forward_template)?;
        let reverse_name = template_file_name(&config.reverse_template)?;

        Self::new(
            config.snapshot_dir.clone(),
            config.live_dir.clone(),
            forward_name,
            reverse_name,
        )
        .await
    }

    /// Path of the snapshot file for a zone
    pub fn snapshot_path(&self, kind: ZoneKind) -> PathBuf {
        self.snapshot_dir.join(self.file_name(kind))
    }

    /// Path of the live zone file for a zone
    pub fn live_path(&self, kind: ZoneKind) -> PathBuf {
        self.live_dir.join(self.file_name(kind))
    }

    fn file_name(&self, kind: ZoneKind) -> &OsString {
        match kind {
            ZoneKind::Forward => &self.forward_name,
            ZoneKind::Reverse => &self.reverse_name,
        }
    }
}

fn template_file_name(path: &Path) -> Result<OsString, Error> {
    path.file_name()
        .map(OsString::from)
        .ok_or_else(|| Error::config(format!("Template path has no file name: {}", path.display())))
}

#[async_trait]
impl ZoneStore for FileZoneStore {
    async fn read_snapshot(&self, kind: ZoneKind) -> Result<String, Error> {
        let path = self.snapshot_path(kind);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("No {} snapshot at {}, creating empty", kind, path.display());
            fs::write(&path, b"").await.map_err(|e| {
                Error::persistence(format!(
                    "Failed to create snapshot {}: {}",
                    path.display(),
                    e
                ))
            })?;
            return Ok(String::new());
        }

        let bytes = fs::read(&path).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        // A mangled snapshot just compares unequal and gets rewritten
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!("{} snapshot {} is not valid UTF-8", kind, path.display());
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    async fn write_snapshot(&self, kind: ZoneKind, text: &str) -> Result<(), Error> {
        let path = self.snapshot_path(kind);
        write_atomic(&path, text.as_bytes()).await?;
        tracing::trace!("Snapshot written: {}", path.display());
        Ok(())
    }

    async fn write_live(&self, kind: ZoneKind, text: &str) -> Result<(), Error> {
        let path = self.live_path(kind);
        write_atomic(&path, text.as_bytes()).await?;
        tracing::trace!("Live zone written: {}", path.display());
        Ok(())
    }
}
