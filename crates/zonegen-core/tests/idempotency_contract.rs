//! Contract Test: Idempotency
//!
//! A run against an unchanged inventory must be a no-op.
//!
//! Constraints verified:
//! - Second run with the same inventory writes nothing and does not reload
//! - Snapshots on disk survive a process restart
//! - An inventory change after a restart publishes again
//!
//! If this test fails, every scheduled run would reload the name server.

mod common;

use common::*;
use tempfile::tempdir;
use tokio::fs;
use zonegen_core::{FileZoneStore, ZoneKind, ZoneOutcome, ZoneSync};

#[tokio::test]
async fn unchanged_inventory_does_not_rewrite_or_reload() {
    let harness = Harness::new(hosts());
    let engine = harness.engine();

    let first = engine.run().await.expect("first run succeeds");
    assert!(first.reloaded);
    let writes_after_first = harness.store.write_count();
    assert_eq!(writes_after_first, 4, "two snapshots and two live files");

    let second = engine.run().await.expect("second run succeeds");

    assert_eq!(second.forward, ZoneOutcome::Unchanged);
    assert_eq!(second.reverse, ZoneOutcome::Unchanged);
    assert!(!second.reloaded);
    assert_eq!(second.serial, None);
    assert_eq!(
        harness.store.write_count(),
        writes_after_first,
        "second run must not write"
    );
    assert_eq!(harness.reloader.call_count(), 1, "only the first run reloads");
    assert_eq!(harness.serial.draw_count(), 1);
}

#[tokio::test]
async fn rendering_is_deterministic_across_runs() {
    let harness = Harness::new(hosts());
    harness.engine().run().await.unwrap();
    let forward = harness.store.snapshot(ZoneKind::Forward).await.unwrap();
    let reverse = harness.store.snapshot(ZoneKind::Reverse).await.unwrap();

    // Fresh store, same inventory: byte-identical snapshots
    let other = Harness::new(hosts());
    other.engine().run().await.unwrap();

    assert_eq!(other.store.snapshot(ZoneKind::Forward).await.unwrap(), forward);
    assert_eq!(other.store.snapshot(ZoneKind::Reverse).await.unwrap(), reverse);
}

async fn file_engine(harness: &Harness, root: &std::path::Path) -> ZoneSync {
    let store = FileZoneStore::new(root.join("gen"), root.join("live"), "db.example.com", "db.192.168")
        .await
        .unwrap();

    ZoneSync::new(
        Box::new(harness.inventory.clone()),
        Box::new(store),
        Box::new(harness.reloader.clone()),
        Box::new(harness.serial.clone()),
        templates(),
        &minimal_config(),
    )
    .expect("engine construction succeeds")
}

#[tokio::test]
async fn restart_simulation_no_duplicate_publish() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("live")).await.unwrap();
    let live_forward = dir.path().join("live").join("db.example.com");

    // First "process"
    let harness = Harness::new(hosts());
    let report = file_engine(&harness, dir.path()).await.run().await.unwrap();
    assert!(report.reloaded);
    let published = fs::metadata(&live_forward).await.unwrap().modified().unwrap();

    // Second "process" over the same directories
    let restarted = Harness::new(hosts());
    let report = file_engine(&restarted, dir.path()).await.run().await.unwrap();

    assert!(!report.changed());
    assert_eq!(restarted.reloader.call_count(), 0, "restart must not reload");
    assert_eq!(
        fs::metadata(&live_forward).await.unwrap().modified().unwrap(),
        published,
        "live file must not be rewritten"
    );
}

#[tokio::test]
async fn inventory_change_after_restart_publishes() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("live")).await.unwrap();

    let harness = Harness::new(hosts());
    file_engine(&harness, dir.path()).await.run().await.unwrap();

    let mut changed = hosts();
    changed.push(host("printer.example.com", [192, 168, 3, 20]));
    let restarted = Harness::new(changed);
    let report = file_engine(&restarted, dir.path()).await.run().await.unwrap();

    assert_eq!(report.forward, ZoneOutcome::Published);
    assert_eq!(report.reverse, ZoneOutcome::Published);
    assert_eq!(restarted.reloader.call_count(), 1);

    let live = fs::read_to_string(dir.path().join("live").join("db.192.168"))
        .await
        .unwrap();
    assert!(live.ends_with("20.3 IN PTR printer.example.com.\n"));
}
