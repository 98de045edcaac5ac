//! Scheduler integration tests
//!
//! The composed drivers run on paused tokio time: the startup hospital
//! pass fires immediately, the one-second scan resolves expired reaction
//! windows, and a shutdown signal stops the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use vitalis::combat::{AttackKind, ScriptedRoller};
use vitalis::core::config::VitalisConfig;
use vitalis::economy::EconomyLedger;
use vitalis::core::types::{ManualClock, UserId};
use vitalis::notify::CollectingSink;
use vitalis::service::Service;
use vitalis::vitality::VitalityStore;

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

fn running_service(combat_rolls: Vec<i32>) -> (Service, Arc<ManualClock>, Arc<CollectingSink>) {
    let clock = Arc::new(ManualClock::new(0));
    let sink = Arc::new(CollectingSink::new());
    let service = Service::with_parts(
        VitalisConfig::default(),
        clock.clone(),
        sink.clone(),
        Box::new(ScriptedRoller::new(combat_rolls)),
        Box::new(ScriptedRoller::new([])),
    );
    service.directory.register_player(ALICE, "Alice");
    service.directory.register_player(BOB, "Bob");
    (service, clock, sink)
}

#[tokio::test(start_paused = true)]
async fn startup_pass_rescues_stranded_patients() {
    let (service, _, sink) = running_service(vec![]);
    let mut downed = service.vitality.get_or_create(ALICE).unwrap();
    downed.health = -2;
    service.vitality.put(downed).unwrap();
    service.ledger.deposit_cash(ALICE, 10_000).unwrap();

    let scheduler = service.scheduler();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    // Let the immediate hospital pass run without advancing any timer.
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    assert_eq!(service.vitality.get(ALICE).unwrap().unwrap().health, 1);
    assert_eq!(sink.titled("Hospital cycle").len(), 1);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn timer_scan_fires_automatic_retaliation() {
    // Alice misses (5); the scan later fires Bob's counter (15, damage 3).
    let (service, clock, _) = running_service(vec![5, 15, 3]);
    service.vitality.get_or_create(ALICE).unwrap();
    service.vitality.get_or_create(BOB).unwrap();

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(service.windows.get(BOB).is_some());

    let scheduler = service.scheduler();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    // The window expires on the manual clock; the next one-second scan
    // picks it up.
    clock.advance(7);
    tokio::time::advance(Duration::from_secs(2)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    assert!(service.windows.get(BOB).is_none());
    let alice = service.vitality.get(ALICE).unwrap().unwrap();
    assert_eq!(alice.health, alice.max_health() - 3);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_signal_stops_the_loop() {
    let (service, _, _) = running_service(vec![]);
    let scheduler = service.scheduler();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
}
