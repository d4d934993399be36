//! Zone data model
//!
//! - [`HostRecord`]: one (hostname, IPv4 address) pair from the inventory
//! - [`ZoneKind`]: forward (A) or reverse (PTR) zone
//! - [`ZoneDocument`]: the full rendered text of one zone

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// A host/address pair supplied by the inventory source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Short or fully qualified host name
    pub hostname: String,
    /// IPv4 address
    pub address: Ipv4Addr,
}

impl HostRecord {
    /// Create a new host record
    pub fn new(hostname: impl Into<String>, address: Ipv4Addr) -> Self {
        Self {
            hostname: hostname.into(),
            address,
        }
    }
}

impl fmt::Display for HostRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hostname, self.address)
    }
}

/// Which of the two managed zones a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Hostname to address (A records)
    Forward,
    /// Reversed address to hostname (PTR records)
    Reverse,
}

impl ZoneKind {
    /// Both kinds, in the order a run processes them
    pub const ALL: [ZoneKind; 2] = [ZoneKind::Forward, ZoneKind::Reverse];

    /// Lowercase name for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Forward => "forward",
            ZoneKind::Reverse => "reverse",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered zone text, built fresh every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDocument {
    kind: ZoneKind,
    text: String,
}

impl ZoneDocument {
    /// Wrap rendered text
    pub fn new(kind: ZoneKind, text: String) -> Self {
        Self { kind, text }
    }

    /// The zone this document renders
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Unstamped zone text
    pub fn text(&self) -> &str {
        &self.text
    }
}
