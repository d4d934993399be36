//! Test doubles and common utilities for sync contract tests
//!
//! Every double is cheap to clone and clones share their counters, so a
//! test can hand one copy to the engine and keep another for assertions.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use zonegen_core::config::{
    EngineConfig, InventoryConfig, ReloadConfig, ZoneGenConfig, ZonesConfig,
};
use zonegen_core::error::{Error, Result};
use zonegen_core::serial::SerialSource;
use zonegen_core::traits::{InventorySource, Reloader, ZoneStore};
use zonegen_core::{HostRecord, MemoryZoneStore, Templates, ZoneKind, ZoneSync};

pub const SERIAL: u64 = 1_700_000_000;

pub const FORWARD_TEMPLATE: &str = "$TTL 3600\n\
@ IN SOA ns1.example.com. hostmaster.example.com. ( $serial 3600 600 86400 3600 )\n\
@ IN NS ns1.example.com.\n";

pub const REVERSE_TEMPLATE: &str = "$TTL 3600\n\
@ IN SOA ns1.example.com. hostmaster.example.com. ( $serial 3600 600 86400 3600 )\n\
@ IN NS ns1.example.com.\n";

/// An inventory whose hosts the test can change between runs
#[derive(Clone, Default)]
pub struct ControlledInventory {
    hosts: Arc<Mutex<Vec<HostRecord>>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl ControlledInventory {
    pub fn new(hosts: Vec<HostRecord>) -> Self {
        Self {
            hosts: Arc::new(Mutex::new(hosts)),
            ..Self::default()
        }
    }

    /// Replace the hosts returned by the next run
    pub fn set_hosts(&self, hosts: Vec<HostRecord>) {
        *self.hosts.lock().unwrap() = hosts;
    }

    /// Make list_hosts() fail like an unreachable server
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get the number of times list_hosts() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InventorySource for ControlledInventory {
    async fn list_hosts(&self) -> Result<Vec<HostRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::inventory("connection refused"));
        }
        Ok(self.hosts.lock().unwrap().clone())
    }

    fn source_name(&self) -> &'static str {
        "controlled"
    }
}

/// A reloader that counts calls and can be told to fail
#[derive(Clone, Default)]
pub struct CountingReloader {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl CountingReloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reloader whose command always exits non-zero
    pub fn failing() -> Self {
        let reloader = Self::default();
        reloader.failing.store(true, Ordering::SeqCst);
        reloader
    }

    /// Get the number of times reload() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Reloader for CountingReloader {
    async fn reload(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::reload("rndc reload exited with status 1"));
        }
        Ok(())
    }
}

/// A serial source that always returns the same value and counts draws
#[derive(Clone)]
pub struct FixedSerial {
    serial: u64,
    draws: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

impl FixedSerial {
    pub fn new(serial: u64) -> Self {
        Self {
            serial,
            draws: Arc::new(AtomicUsize::new(0)),
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make the next draw fail like a corrupt serial state file
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Get the number of serials drawn
    pub fn draw_count(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SerialSource for FixedSerial {
    async fn next_serial(&self) -> Result<u64> {
        self.draws.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::persistence("Corrupt serial state in .serial"));
        }
        Ok(self.serial)
    }
}

/// A memory store whose live writes fail for one zone
#[derive(Clone)]
pub struct FailingLiveStore {
    pub inner: MemoryZoneStore,
    pub fail_kind: ZoneKind,
}

#[async_trait::async_trait]
impl ZoneStore for FailingLiveStore {
    async fn read_snapshot(&self, kind: ZoneKind) -> Result<String> {
        self.inner.read_snapshot(kind).await
    }

    async fn write_snapshot(&self, kind: ZoneKind, text: &str) -> Result<()> {
        self.inner.write_snapshot(kind, text).await
    }

    async fn write_live(&self, kind: ZoneKind, text: &str) -> Result<()> {
        if kind == self.fail_kind {
            return Err(Error::persistence("No space left on device"));
        }
        self.inner.write_live(kind, text).await
    }
}

pub fn host(hostname: &str, address: [u8; 4]) -> HostRecord {
    HostRecord::new(hostname, Ipv4Addr::from(address))
}

pub fn hosts() -> Vec<HostRecord> {
    vec![
        host("host1.example.com", [192, 168, 1, 10]),
        host("host2.example.com", [192, 168, 1, 11]),
        host("nas", [192, 168, 2, 5]),
    ]
}

pub fn templates() -> Templates {
    Templates::new(FORWARD_TEMPLATE, REVERSE_TEMPLATE)
}

/// Helper to create a minimal ZoneGenConfig for testing
pub fn minimal_config() -> ZoneGenConfig {
    ZoneGenConfig {
        zones: ZonesConfig::new(
            "/templates/db.example.com",
            "/templates/db.192.168",
            "/var/lib/zonegen",
            "/etc/bind/zones",
        ),
        inventory: InventoryConfig::Phpipam {
            base_url: "https://ipam.example.com/phpipam".to_string(),
            app_id: "zonegen".to_string(),
            subnet_ids: vec!["1".to_string()],
            timeout_secs: 30,
            enc_request: false,
        },
        reload: ReloadConfig::default(),
        engine: EngineConfig {
            dry_run: false,
            use_lock: false,
            ..EngineConfig::default()
        },
    }
}

/// Test handles kept alongside an engine
pub struct Harness {
    pub inventory: ControlledInventory,
    pub store: MemoryZoneStore,
    pub reloader: CountingReloader,
    pub serial: FixedSerial,
}

impl Harness {
    pub fn new(hosts: Vec<HostRecord>) -> Self {
        Self {
            inventory: ControlledInventory::new(hosts),
            store: MemoryZoneStore::new(),
            reloader: CountingReloader::new(),
            serial: FixedSerial::new(SERIAL),
        }
    }

    /// Build an engine over this harness's doubles
    pub fn engine(&self) -> ZoneSync {
        self.engine_with(templates(), &minimal_config())
    }

    pub fn engine_with(&self, templates: Templates, config: &ZoneGenConfig) -> ZoneSync {
        ZoneSync::new(
            Box::new(self.inventory.clone()),
            Box::new(self.store.clone()),
            Box::new(self.reloader.clone()),
            Box::new(self.serial.clone()),
            templates,
            config,
        )
        .expect("engine construction succeeds")
    }
}
