// # zonegen-core
//
// Core library for generating BIND zone files from an IPAM inventory.
//
// ## Architecture Overview
//
// - **InventorySource**: Trait supplying host/address pairs
// - **ZoneRenderer**: Builds forward (A) and reverse (PTR) zone text
// - **ZoneStore**: Trait persisting snapshots and live zone files
// - **SerialSource** / `stamp`: Serial numbers for live zones
// - **Reloader**: Trait telling the name server to reload
// - **ZoneSync**: Engine running one fetch → render → compare → publish pass
//
// ## Design Principles
//
// 1. **Change-driven**: Files are rewritten, and the name server reloaded,
//    only when rendered text differs from the last snapshot
// 2. **Fail before writing**: Inventory and rendering errors abort the run
//    before any file is touched
// 3. **One reload per run**: However many zones changed
// 4. **Library-First**: The binary only wires configuration to the engine

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod lock;
pub mod reload;
pub mod render;
pub mod serial;
pub mod store;
pub mod zone;

// Re-export core types for convenience
pub use traits::{InventorySource, Reloader, ZoneStore};
pub use engine::{SyncReport, Templates, ZoneOutcome, ZoneSync};
pub use config::{EngineConfig, InventoryConfig, ReloadConfig, SerialPolicy, ZoneGenConfig, ZonesConfig};
pub use error::{Error, Result};
pub use lock::RunLock;
pub use reload::CommandReloader;
pub use render::ZoneRenderer;
pub use serial::{MonotonicSerial, SerialSource, UnixTimestampSerial};
pub use store::{FileZoneStore, MemoryZoneStore};
pub use zone::{HostRecord, ZoneDocument, ZoneKind};
