// # Inventory Source Trait
//
// Defines the interface for reading hosts out of an IPAM system.
//
// ## Implementations
//
// - phpIPAM: `zonegen-phpipam` crate
//
// ## Usage
//
// ```rust,ignore
// use zonegen_core::InventorySource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* InventorySource implementation */;
//
//     for host in source.list_hosts().await? {
//         println!("{} -> {}", host.hostname, host.address);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::zone::HostRecord;

/// Trait for inventory source implementations
///
/// The engine calls [`list_hosts`](InventorySource::list_hosts) exactly once
/// per run, before any file is read or written.
///
/// # Ordering
///
/// Records are rendered in the order returned. Implementations should return
/// them in a stable order, otherwise every run looks like a change.
///
/// # Failure
///
/// Unreachable servers, unsuccessful statuses and malformed payloads are all
/// reported as [`crate::Error::Inventory`]. Implementations must not retry;
/// a failed run is re-run by whatever scheduled it.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch every host/address pair in the configured network ranges
    async fn list_hosts(&self) -> Result<Vec<HostRecord>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
