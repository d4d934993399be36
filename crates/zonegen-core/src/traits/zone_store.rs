// # Zone Store Trait
//
// Defines the interface for persisting zone text.
//
// Each zone kind has two files:
//
// - **Snapshot**: the last published text, unstamped, kept only to detect
//   changes on the next run
// - **Live**: the same text with the serial stamped in, loaded by the name
//   server
//
// ## Usage
//
// ```rust,ignore
// use zonegen_core::{ZoneStore, ZoneKind};
//
// let previous = store.read_snapshot(ZoneKind::Forward).await?;
// if previous != rendered {
//     store.write_snapshot(ZoneKind::Forward, &rendered).await?;
//     store.write_live(ZoneKind::Forward, &stamped).await?;
// }
// ```

use async_trait::async_trait;

use crate::zone::ZoneKind;

/// Trait for zone store implementations
///
/// # Consistency
///
/// The engine writes the snapshot before the live file. Stores are not
/// required to make the pair transactional: an interrupted run may leave a
/// new snapshot next to an old live file. The next run then sees no change
/// for that zone, so operators recover by deleting the snapshot.
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// Read the snapshot for a zone
    ///
    /// A missing snapshot is created empty and reported as `""`, so any
    /// non-empty rendering counts as a change on the first run.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The snapshot contents
    /// - `Err(Error::Persistence)`: The snapshot could not be read or created
    async fn read_snapshot(&self, kind: ZoneKind) -> Result<String, crate::Error>;

    /// Replace the snapshot for a zone with unstamped text
    async fn write_snapshot(&self, kind: ZoneKind, text: &str) -> Result<(), crate::Error>;

    /// Replace the live zone file with stamped text
    async fn write_live(&self, kind: ZoneKind, text: &str) -> Result<(), crate::Error>;
}
