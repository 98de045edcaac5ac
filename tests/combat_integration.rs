//! Combat engine integration tests
//!
//! End-to-end attack resolution: validation, d20 rules, reaction
//! windows, automatic retaliation, and the hand-off to stabilization
//! when a defender goes down.

use std::sync::Arc;

use vitalis::combat::{AttackKind, ScriptedRoller};
use vitalis::core::config::VitalisConfig;
use vitalis::core::error::VitalError;
use vitalis::core::types::{Clock, ManualClock, UserId};
use vitalis::notify::CollectingSink;
use vitalis::service::Service;
use vitalis::vitality::{Vitality, VitalityStore};

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

/// Service with a manual clock and scripted combat dice.
///
/// Both fighters are level-1 with all-10 stats: attack bonus 0, AC 10,
/// 10 max HP. A scripted roll of 15 hits, 5 misses.
fn arena(combat_rolls: Vec<i32>) -> (Service, Arc<ManualClock>, Arc<CollectingSink>) {
    let clock = Arc::new(ManualClock::new(1_000));
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
    service.vitality.get_or_create(ALICE).unwrap();
    service.vitality.get_or_create(BOB).unwrap();
    (service, clock, sink)
}

fn set_health(service: &Service, user: UserId, health: i32) {
    let mut v = service.vitality.get_or_create(user).unwrap();
    v.health = health;
    service.vitality.put(v).unwrap();
}

#[tokio::test]
async fn self_attack_is_rejected() {
    let (service, _, _) = arena(vec![]);
    let err = service
        .combat
        .attack(ALICE, ALICE, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::Validation(_)));
}

#[tokio::test]
async fn bots_cannot_be_attacked() {
    let (service, _, _) = arena(vec![]);
    let market = UserId(99);
    service.directory.register_bot(market, "MarketBot");

    let err = service
        .combat
        .attack(ALICE, market, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::Validation(_)));
}

#[tokio::test]
async fn unconscious_attackers_cannot_act() {
    let (service, _, _) = arena(vec![]);
    set_health(&service, ALICE, 0);

    let err = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::Validation(_)));
}

#[tokio::test]
async fn admitted_patients_cannot_attack() {
    // A patient healed back to positive health is still under care until
    // discharged, and care and combat never overlap.
    let (service, clock, _) = arena(vec![]);
    set_health(&service, ALICE, 1);
    service.admissions.admit(ALICE, clock.now());

    let err = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::StateConflict(_)));
    // No window opened: being in hospital and in combat stay exclusive.
    assert!(service.windows.get(BOB).is_none());
    assert!(service.admissions.get(ALICE).unwrap().in_hospital);
}

#[tokio::test]
async fn hospitalized_targets_are_off_limits() {
    let (service, clock, _) = arena(vec![]);
    service.admissions.admit(BOB, clock.now());

    let err = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::Validation(_)));
}

#[tokio::test]
async fn hit_applies_damage_and_sets_cooldown() {
    // d20=15 hits AC 10; damage die 4 + str mod 0 = 4.
    let (service, _, _) = arena(vec![15, 4]);

    let report = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(report.hit);
    assert_eq!(report.damage, 4);
    assert_eq!(report.defender_health, 6);
    assert!(report.window_opened);

    // Immediately attacking again trips the cooldown.
    let err = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, VitalError::StateConflict(_)));
}

#[tokio::test]
async fn natural_one_always_misses() {
    let (service, _, _) = arena(vec![1]);
    // Even a huge bonus cannot rescue a natural 1.
    let mut v = service.vitality.get_or_create(ALICE).unwrap();
    v.strength = 20;
    v.level = 10;
    service.vitality.put(v).unwrap();

    let report = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(!report.hit);
    assert!(report.fumble);
    assert_eq!(report.damage, 0);
    // A miss still leaves the defender a reaction window.
    assert!(report.window_opened);
}

#[tokio::test]
async fn natural_twenty_beats_any_armor_and_doubles_damage() {
    let (service, _, _) = arena(vec![20, 3]);
    let mut v = service.vitality.get_or_create(BOB).unwrap();
    v.dexterity = 30; // AC 20
    service.vitality.put(v).unwrap();

    let report = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(report.hit);
    assert!(report.critical);
    assert_eq!(report.damage, 6); // (3 + 0) * 2
}

#[tokio::test]
async fn downing_a_defender_starts_stabilization_and_opens_no_window() {
    // Scenario: defender at 5 HP takes a 7-damage hit and lands on -2.
    let (service, _, sink) = arena(vec![15, 7]);
    set_health(&service, BOB, 5);

    let report = service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(report.hit);
    assert_eq!(report.defender_health, -2);
    assert!(report.defender_downed);
    assert!(!report.window_opened);
    assert!(service.windows.get(BOB).is_none());

    let status = service.stabilization_store.get(BOB).unwrap();
    assert!(status.unstable);
    assert_eq!(status.successes, 0);
    assert_eq!(status.failures, 0);

    assert!(!sink.titled("Combat").is_empty());
}

#[tokio::test]
async fn hitting_a_downed_defender_worsens_their_saves() {
    let (service, clock, _) = arena(vec![15, 2, 20, 2]);
    set_health(&service, BOB, -1);
    service.stabilization.start(BOB).unwrap();

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert_eq!(service.stabilization_store.get(BOB).unwrap().failures, 1);

    // A critical against a downed target counts two failures: 1 + 2 >= 3
    // rolls over into a lost hit point and a counter reset.
    clock.advance(10);
    let before = service.vitality.get(BOB).unwrap().unwrap().health;
    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    let status = service.stabilization_store.get(BOB).unwrap();
    assert!(status.unstable);
    assert_eq!(status.failures, 0);
    let after = service.vitality.get(BOB).unwrap().unwrap().health;
    // Crit damage (2 + 0) * 2 plus the threshold's extra -1.
    assert_eq!(after, before - 4 - 1);
}

#[tokio::test]
async fn retreat_clears_the_window_once() {
    let (service, _, _) = arena(vec![5]);

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(service.windows.get(BOB).is_some());

    service.combat.retreat(BOB).await.unwrap();
    assert!(service.windows.get(BOB).is_none());

    let err = service.combat.retreat(BOB).await.unwrap_err();
    assert!(matches!(err, VitalError::StateConflict(_)));
}

#[tokio::test]
async fn manual_retaliation_resolves_the_window() {
    // Alice misses Bob (5), then Bob retaliates and misses (5).
    let (service, clock, _) = arena(vec![5, 5]);

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    assert!(service.windows.get(BOB).is_some());

    clock.advance(1);
    let report = service
        .combat
        .attack(BOB, ALICE, AttackKind::Manual)
        .await
        .unwrap();
    // Bob's window is gone; Alice now holds one instead.
    assert!(service.windows.get(BOB).is_none());
    assert!(report.window_opened);
    assert!(service.windows.get(ALICE).is_some());
}

#[tokio::test]
async fn expired_window_fires_an_automatic_counter_attack() {
    // Alice misses (5); Bob's auto-retaliation hits (15, damage 3).
    let (service, clock, _) = arena(vec![5, 15, 3]);

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();

    clock.advance(7); // past the 6s window
    let resolved = service.combat.resolve_expired().await;
    assert_eq!(resolved, 1);

    let alice = service.vitality.get(ALICE).unwrap().unwrap();
    assert_eq!(alice.health, alice.max_health() - 3);

    // The retaliation was automatic: no cascading window for Alice, and
    // Bob's cooldown was still set.
    assert!(service.windows.get(ALICE).is_none());
    assert!(service.windows.get(BOB).is_none());
    assert!(service.combat.cooldown_remaining(BOB) > 0);
}

#[tokio::test]
async fn expired_window_lapses_for_an_unconscious_defender() {
    let (service, clock, _) = arena(vec![5]);

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    set_health(&service, BOB, -1);

    clock.advance(7);
    let resolved = service.combat.resolve_expired().await;
    assert_eq!(resolved, 0);
    assert!(service.windows.get(BOB).is_none());
}

#[tokio::test]
async fn a_new_hit_supersedes_the_old_window() {
    let (service, clock, _) = arena(vec![5, 5]);
    let carol = UserId(3);
    service.directory.register_player(carol, "Carol");
    service.vitality.put(Vitality::new(carol)).unwrap();

    service
        .combat
        .attack(ALICE, BOB, AttackKind::Manual)
        .await
        .unwrap();
    clock.advance(2);
    service
        .combat
        .attack(carol, BOB, AttackKind::Manual)
        .await
        .unwrap();

    let window = service.windows.get(BOB).unwrap();
    assert_eq!(window.attacker, carol);
}
