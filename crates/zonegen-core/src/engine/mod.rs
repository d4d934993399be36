//! Zone sync engine
//!
//! The ZoneSync engine runs one pass of:
//! - Fetching hosts from the InventorySource
//! - Rendering the forward and reverse zones
//! - Comparing each zone against its snapshot
//! - Publishing changed zones and reloading the name server once
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ InventorySource │─── Vec<HostRecord> ───┐
//! └─────────────────┘                       │
//!                                           ▼
//!                                  ┌──────────────┐
//!                                  │   ZoneSync   │── ZoneRenderer
//!                                  └──────────────┘
//!                                           │
//!         ┌─────────────────────────────────┼──────────────────────┐
//!         │                                 │                      │
//!         ▼                                 ▼                      ▼
//! ┌──────────────────┐             ┌──────────────┐        ┌─────────────┐
//! │    ZoneStore     │             │ SerialSource │        │  Reloader   │
//! │ (snapshot, live) │             │   (stamp)    │        │  (once)     │
//! └──────────────────┘             └──────────────┘        └─────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. List hosts (failure: nothing touched)
//! 2. Render both zones (failure: nothing written, for either zone)
//! 3. For each zone whose text differs from its snapshot:
//!    draw the serial, write the snapshot, write the stamped live file
//! 4. If any zone was published, reload the name server exactly once
//!
//! A second run against an unchanged inventory writes nothing and does not
//! reload.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::config::{ZoneGenConfig, ZonesConfig};
use crate::error::{Error, Result};
use crate::render::ZoneRenderer;
use crate::serial::{SerialSource, stamp};
use crate::traits::{InventorySource, Reloader, ZoneStore};
use crate::zone::{ZoneDocument, ZoneKind};

/// Zone templates: the preamble (SOA, NS, `$TTL`, ...) of each zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    /// Forward zone preamble
    pub forward: String,
    /// Reverse zone preamble
    pub reverse: String,
}

impl Templates {
    /// Create templates from in-memory text
    pub fn new(forward: impl Into<String>, reverse: impl Into<String>) -> Self {
        Self {
            forward: forward.into(),
            reverse: reverse.into(),
        }
    }

    /// Read both templates from the configured paths
    pub async fn load(config: &ZonesConfig) -> Result<Self> {
        Ok(Self {
            forward: read_template(&config.forward_template).await?,
            reverse: read_template(&config.reverse_template).await?,
        })
    }

    /// Template for a zone
    pub fn get(&self, kind: ZoneKind) -> &str {
        match kind {
            ZoneKind::Forward => &self.forward,
            ZoneKind::Reverse => &self.reverse,
        }
    }
}

async fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).await.map_err(|e| {
        Error::config(format!(
            "Failed to read template {}: {}",
            path.display(),
            e
        ))
    })
}

/// What a run did with one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneOutcome {
    /// Rendering matched the snapshot; nothing written
    Unchanged,
    /// Snapshot and live file rewritten
    Published,
    /// Rendering differs, but dry-run mode skipped the writes
    WouldPublish,
}

impl ZoneOutcome {
    /// Whether the rendering differed from the snapshot
    pub fn is_changed(&self) -> bool {
        !matches!(self, ZoneOutcome::Unchanged)
    }
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Outcome for the forward zone
    pub forward: ZoneOutcome,
    /// Outcome for the reverse zone
    pub reverse: ZoneOutcome,
    /// Serial stamped into the published zones, if any were published
    pub serial: Option<u64>,
    /// Whether the name server was reloaded
    pub reloaded: bool,
    /// Number of hosts rendered
    pub host_count: usize,
}

impl SyncReport {
    /// Outcome for a zone
    pub fn outcome(&self, kind: ZoneKind) -> ZoneOutcome {
        match kind {
            ZoneKind::Forward => self.forward,
            ZoneKind::Reverse => self.reverse,
        }
    }

    /// Whether any zone differed from its snapshot
    pub fn changed(&self) -> bool {
        self.forward.is_changed() || self.reverse.is_changed()
    }
}

/// Zone sync engine
///
/// Holds everything one run needs. [`ZoneSync::run`] is a single sequential
/// pass; calling it again performs another pass against the same store.
///
/// ## Concurrency
///
/// Nothing inside a run happens concurrently. Two engines sharing one store
/// are not synchronized with each other; the binary guards the snapshot
/// directory with a [`crate::RunLock`].
pub struct ZoneSync {
    /// Source of hosts
    inventory: Box<dyn InventorySource>,

    /// Snapshot and live zone persistence
    store: Box<dyn ZoneStore>,

    /// Name server reload
    reloader: Box<dyn Reloader>,

    /// Serial numbers for live zones
    serial: Box<dyn SerialSource>,

    /// Zone preambles
    templates: Templates,

    /// Renders zone text
    renderer: ZoneRenderer,

    /// Compare only, never publish
    dry_run: bool,
}

impl ZoneSync {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `inventory`: Inventory source implementation
    /// - `store`: Zone store implementation
    /// - `reloader`: Name server reload implementation
    /// - `serial`: Serial source implementation
    /// - `templates`: Zone preambles
    /// - `config`: zonegen configuration (validated here)
    pub fn new(
        inventory: Box<dyn InventorySource>,
        store: Box<dyn ZoneStore>,
        reloader: Box<dyn Reloader>,
        serial: Box<dyn SerialSource>,
        templates: Templates,
        config: &ZoneGenConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inventory,
            store,
            reloader,
            serial,
            templates,
            renderer: ZoneRenderer::new(config.zones.reverse_prefix.clone()),
            dry_run: config.engine.dry_run,
        })
    }

    /// Run one sync pass
    ///
    /// # Returns
    ///
    /// - `Ok(SyncReport)`: What was published and whether a reload ran
    /// - `Err(Error)`: The first failure; see [`Error`] for how far the run got
    pub async fn run(&self) -> Result<SyncReport> {
        let hosts = self.inventory.list_hosts().await?;
        info!(
            "Fetched {} host(s) from {}",
            hosts.len(),
            self.inventory.source_name()
        );

        // Render everything up front so a bad record stops both zones
        let documents = ZoneKind::ALL
            .iter()
            .map(|&kind| self.renderer.render(self.templates.get(kind), &hosts, kind))
            .collect::<Result<Vec<ZoneDocument>>>()?;

        let mut serial = None;
        let mut outcomes = Vec::with_capacity(documents.len());

        for document in &documents {
            let outcome = self.sync_zone(document, &mut serial).await?;
            outcomes.push(outcome);
        }

        let published = outcomes.contains(&ZoneOutcome::Published);
        if published {
            self.reloader.reload().await?;
            info!("Name server reloaded");
        } else {
            debug!("Nothing published, skipping reload");
        }

        Ok(SyncReport {
            forward: outcomes[0],
            reverse: outcomes[1],
            serial,
            reloaded: published,
            host_count: hosts.len(),
        })
    }

    /// Compare one zone against its snapshot and publish it if it changed
    ///
    /// The serial is drawn on the first publish, before anything is written,
    /// and reused for the second zone, so both zones of a run carry the
    /// same serial.
    async fn sync_zone(
        &self,
        document: &ZoneDocument,
        serial: &mut Option<u64>,
    ) -> Result<ZoneOutcome> {
        let kind = document.kind();
        let previous = self.store.read_snapshot(kind).await?;

        if previous == document.text() {
            debug!("{} zone unchanged", kind);
            return Ok(ZoneOutcome::Unchanged);
        }

        if self.dry_run {
            info!("{} zone changed (dry run, not publishing)", kind);
            return Ok(ZoneOutcome::WouldPublish);
        }

        // Serial first: a failed draw must leave the snapshot untouched,
        // or the next run would see the zone as unchanged
        let serial = match *serial {
            Some(serial) => serial,
            None => {
                let next = self.serial.next_serial().await?;
                *serial = Some(next);
                next
            }
        };

        info!("Updating {} zone", kind);
        self.store.write_snapshot(kind, document.text()).await?;

        let stamped = stamp(document.text(), serial);
        debug!("{} zone with serial {}:\n{}", kind, serial, stamped);
        self.store.write_live(kind, &stamped).await?;

        Ok(ZoneOutcome::Published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_outcome_is_changed() {
        assert!(!ZoneOutcome::Unchanged.is_changed());
        assert!(ZoneOutcome::Published.is_changed());
        assert!(ZoneOutcome::WouldPublish.is_changed());
    }

    #[test]
    fn test_report_outcome_by_kind() {
        let report = SyncReport {
            forward: ZoneOutcome::Published,
            reverse: ZoneOutcome::Unchanged,
            serial: Some(1),
            reloaded: true,
            host_count: 3,
        };

        assert_eq!(report.outcome(ZoneKind::Forward), ZoneOutcome::Published);
        assert_eq!(report.outcome(ZoneKind::Reverse), ZoneOutcome::Unchanged);
        assert!(report.changed());
    }

    #[tokio::test]
    async fn test_templates_load() {
        let dir = tempdir().unwrap();
        let fwd = dir.path().join("db.example.com");
        let rev = dir.path().join("db.192.168");
        fs::write(&fwd, "$TTL 3600\n").await.unwrap();
        fs::write(&rev, "$TTL 7200\n").await.unwrap();

        let config = ZonesConfig::new(&fwd, &rev, dir.path(), dir.path());
        let templates = Templates::load(&config).await.unwrap();

        assert_eq!(templates.get(ZoneKind::Forward), "$TTL 3600\n");
        assert_eq!(templates.get(ZoneKind::Reverse), "$TTL 7200\n");
    }

    #[tokio::test]
    async fn test_templates_missing_file() {
        let dir = tempdir().unwrap();
        let config = ZonesConfig::new(
            dir.path().join("nope"),
            dir.path().join("nada"),
            dir.path(),
            dir.path(),
        );

        assert!(matches!(Templates::load(&config).await, Err(Error::Config(_))));
    }
}
