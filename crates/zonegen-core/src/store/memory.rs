// # Memory Zone Store
//
// In-memory implementation of ZoneStore.
//
// ## Purpose
//
// Holds snapshots and live zones in a map. Nothing survives the process,
// so every run against a fresh store is a first run. Useful for tests and
// for embedding the engine where zones are consumed in-process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::zone_store::ZoneStore;
use crate::zone::ZoneKind;

#[derive(Debug, Default)]
struct Zones {
    snapshots: HashMap<ZoneKind, String>,
    live: HashMap<ZoneKind, String>,
}

/// In-memory zone store
///
/// Clones share the same underlying zones and write counter.
///
/// # Example
///
/// ```rust
/// use zonegen_core::store::MemoryZoneStore;
/// use zonegen_core::traits::ZoneStore;
/// use zonegen_core::ZoneKind;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryZoneStore::new();
///
///     assert_eq!(store.read_snapshot(ZoneKind::Forward).await?, "");
///     store.write_snapshot(ZoneKind::Forward, "host1 IN A 192.168.1.10\n").await?;
///     assert_eq!(store.write_count(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryZoneStore {
    inner: Arc<RwLock<Zones>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryZoneStore {
    /// Create a new empty memory zone store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot for a zone, if one exists
    pub async fn snapshot(&self, kind: ZoneKind) -> Option<String> {
        self.inner.read().await.snapshots.get(&kind).cloned()
    }

    /// Current live zone text, if one was written
    pub async fn live(&self, kind: ZoneKind) -> Option<String> {
        self.inner.read().await.live.get(&kind).cloned()
    }

    /// Number of snapshot and live writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneStore for MemoryZoneStore {
    async fn read_snapshot(&self, kind: ZoneKind) -> Result<String, Error> {
        let mut zones = self.inner.write().await;
        Ok(zones.snapshots.entry(kind).or_default().clone())
    }

    async fn write_snapshot(&self, kind: ZoneKind, text: &str) -> Result<(), Error> {
        self.inner
            .write()
            .await
            .snapshots
            .insert(kind, text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_live(&self, kind: ZoneKind, text: &str) -> Result<(), Error> {
        self.inner.write().await.live.insert(kind, text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
