//! Core traits for zonegen
//!
//! This module defines the seams between the sync engine and its I/O:
//!
//! - [`InventorySource`]: Supplies host/address pairs
//! - [`ZoneStore`]: Snapshot and live zone file persistence
//! - [`Reloader`]: Tells the name server to reload its zones

pub mod inventory_source;
pub mod zone_store;
pub mod reloader;

pub use inventory_source::InventorySource;
pub use zone_store::ZoneStore;
pub use reloader::Reloader;
