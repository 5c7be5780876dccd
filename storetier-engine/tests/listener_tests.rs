mod common;

use common::{engine, ids, platform, tx, unverified, verified};
use std::time::Duration;
use storetier_engine::{ListenerStats, UpdateListener};
use storetier_types::TransactionId;

#[tokio::test]
async fn processes_updates_until_stream_ends() {
    let platform = platform();
    platform.set_entitlements(vec![verified(tx(1, "idea")), verified(tx(2, "visual"))]);
    let engine = engine(&platform);
    engine.refresh_catalog().await.unwrap();

    let listener = UpdateListener::spawn(engine.clone());
    platform.push_update(verified(tx(1, "idea")));
    platform.push_update(verified(tx(2, "visual")));
    platform.close_updates();

    let stats = listener.join().await;
    assert_eq!(stats, ListenerStats { processed: 2, rejected: 0 });
    assert_eq!(ids(&engine.current_purchased_products()), vec!["idea", "visual"]);
    assert_eq!(
        platform.acknowledged(),
        vec![TransactionId::new(1), TransactionId::new(2)]
    );
}

#[tokio::test]
async fn unverified_update_is_skipped_and_later_ones_still_run() {
    let platform = platform();
    platform.set_entitlements(vec![verified(tx(3, "visual"))]);
    let engine = engine(&platform);
    engine.refresh_catalog().await.unwrap();

    let listener = UpdateListener::spawn(engine.clone());
    platform.push_update(unverified());
    platform.push_update(verified(tx(3, "visual")));
    platform.close_updates();

    let stats = listener.join().await;
    assert_eq!(stats, ListenerStats { processed: 1, rejected: 1 });
    assert_eq!(platform.acknowledged(), vec![TransactionId::new(3)]);
    assert!(engine.is_purchased("visual"));
}

#[tokio::test]
async fn updates_pushed_before_spawn_are_delivered() {
    let platform = platform();
    platform.set_entitlements(vec![verified(tx(4, "idea"))]);
    platform.push_update(verified(tx(4, "idea")));
    let engine = engine(&platform);
    engine.refresh_catalog().await.unwrap();

    let listener = UpdateListener::spawn(engine.clone());
    platform.close_updates();
    let stats = listener.join().await;
    assert_eq!(stats.processed, 1);
    assert!(engine.is_purchased("idea"));
}

#[tokio::test]
async fn shutdown_stops_an_idle_listener() {
    let platform = platform();
    let engine = engine(&platform);
    let listener = UpdateListener::spawn(engine);
    assert!(!listener.is_finished());

    let stats = listener.shutdown().await;
    assert_eq!(stats, ListenerStats::default());
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_in_flight_update() {
    let platform = platform();
    platform.set_entitlements(vec![verified(tx(7, "visual"))]);
    let engine = engine(&platform);
    engine.refresh_catalog().await.unwrap();

    platform.set_latency(Some(Duration::from_millis(50)));
    let listener = UpdateListener::spawn(engine.clone());
    platform.push_update(verified(tx(7, "visual")));

    // Let the listener pick the update up and block on the slow platform.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(platform.acknowledged().is_empty());

    let stats = listener.shutdown().await;
    assert_eq!(stats.processed, 1);
    assert!(engine.is_purchased("visual"));
    assert_eq!(platform.acknowledged(), vec![TransactionId::new(7)]);
}

#[tokio::test]
async fn dropped_handle_keeps_listening_until_stream_ends() {
    let platform = platform();
    platform.set_entitlements(vec![verified(tx(8, "idea"))]);
    let engine = engine(&platform);
    engine.refresh_catalog().await.unwrap();
    let mut changes = engine.subscribe();

    drop(UpdateListener::spawn(engine.clone()));
    platform.push_update(verified(tx(8, "idea")));

    changes.changed().await.unwrap();
    assert!(changes.borrow_and_update().is_purchased("idea"));
    platform.close_updates();
}
