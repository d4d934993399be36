//! Contract Test: First Run
//!
//! With no snapshots on disk, everything rendered is new.
//!
//! Constraints verified:
//! - Missing snapshots are created empty before comparison
//! - Any non-empty rendering is published on the first run
//! - Exactly one reload happens after both zones are processed
//! - Snapshots hold the unstamped text; live files carry the serial

mod common;

use common::*;
use tempfile::tempdir;
use tokio::fs;
use zonegen_core::{FileZoneStore, Templates, ZoneOutcome, ZoneSync};

#[tokio::test]
async fn first_run_publishes_both_zones_and_reloads_once() {
    let dir = tempdir().unwrap();
    let gen_dir = dir.path().join("gen");
    let live_dir = dir.path().join("live");
    fs::create_dir_all(&live_dir).await.unwrap();

    let harness = Harness::new(hosts());
    let store = FileZoneStore::new(&gen_dir, &live_dir, "db.example.com", "db.192.168")
        .await
        .unwrap();
    let engine = ZoneSync::new(
        Box::new(harness.inventory.clone()),
        Box::new(store),
        Box::new(harness.reloader.clone()),
        Box::new(harness.serial.clone()),
        templates(),
        &minimal_config(),
    )
    .unwrap();

    let report = engine.run().await.expect("first run succeeds");

    assert_eq!(report.forward, ZoneOutcome::Published);
    assert_eq!(report.reverse, ZoneOutcome::Published);
    assert_eq!(report.serial, Some(SERIAL));
    assert_eq!(report.host_count, 3);
    assert!(report.reloaded);
    assert_eq!(harness.reloader.call_count(), 1, "one reload for two zones");

    let forward_snapshot = fs::read_to_string(gen_dir.join("db.example.com")).await.unwrap();
    assert_eq!(
        forward_snapshot,
        format!(
            "{}host1 IN A 192.168.1.10\nhost2 IN A 192.168.1.11\nnas IN A 192.168.2.5\n",
            FORWARD_TEMPLATE
        )
    );
    assert!(forward_snapshot.contains("$serial"), "snapshot stays unstamped");

    let reverse_live = fs::read_to_string(live_dir.join("db.192.168")).await.unwrap();
    assert!(!reverse_live.contains("$serial"));
    assert!(reverse_live.contains(&format!("( {} 3600", SERIAL)));
    assert!(reverse_live.ends_with(
        "10.1 IN PTR host1.example.com.\n11.1 IN PTR host2.example.com.\n5.2 IN PTR nas.\n"
    ));
}

#[tokio::test]
async fn live_zones_share_one_serial() {
    let harness = Harness::new(hosts());
    harness.engine().run().await.unwrap();

    let stamped = format!("( {} 3600", SERIAL);
    for kind in zonegen_core::ZoneKind::ALL {
        let live = harness.store.live(kind).await.unwrap();
        assert!(live.contains(&stamped), "{} zone carries the run serial", kind);
    }
    assert_eq!(harness.serial.draw_count(), 1, "serial drawn once per run");
}

#[tokio::test]
async fn empty_rendering_matches_new_empty_snapshot() {
    // Empty templates and no hosts render to "", same as a fresh snapshot
    let harness = Harness::new(Vec::new());
    let engine = harness.engine_with(Templates::new("", ""), &minimal_config());

    let report = engine.run().await.unwrap();

    assert!(!report.changed());
    assert!(!report.reloaded);
    assert_eq!(harness.store.write_count(), 0);
    assert_eq!(harness.reloader.call_count(), 0);
}

#[tokio::test]
async fn template_only_zone_is_published_on_first_run() {
    let harness = Harness::new(Vec::new());
    let report = harness.engine().run().await.unwrap();

    assert!(report.reloaded);
    assert_eq!(
        harness.store.snapshot(zonegen_core::ZoneKind::Forward).await.unwrap(),
        FORWARD_TEMPLATE
    );
}
