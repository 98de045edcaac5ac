//! Death saves and natural recovery
//!
//! While a character is unstable the roll driver makes one d20 save per
//! interval: 10 or better succeeds. Three successes end tracking without
//! reviving; three failures cost 1 HP and reset both counters. A natural
//! 20 also heals (+1 at exactly 0 HP, +2 below), a natural 1 also costs
//! 2 HP. Separately, anyone stable at exactly 0 HP regains 1 HP per
//! natural-recovery interval, the only free path back to consciousness.

use crate::combat::dice::DiceRoller;
use crate::core::config::VitalisConfig;
use crate::core::error::Result;
use crate::core::gate::UserGates;
use crate::core::types::{Clock, Severity, Timestamp, UserId};
use crate::identity::IdentityProvider;
use crate::notify::NotificationSink;
use crate::stabilization::status::{StabilizationStatus, StabilizationStore};
use crate::vitality::VitalityStore;
use std::sync::{Arc, Mutex};

/// What one death save did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollOutcome {
    /// Counted a success, still tracking
    Success,
    /// Counted a failure, still tracking
    Failure,
    /// Third failure: 1 HP lost, counters reset, still unstable
    Worsened,
    /// Third success: tracking cleared, health untouched
    Stabilized,
    /// Natural 20 healing brought the character above zero
    Revived,
    /// Status no longer applied once inside the gate
    Skipped,
}

#[derive(Debug, Default, Clone)]
pub struct RollPassSummary {
    pub rolled: usize,
    pub stabilized: Vec<UserId>,
    pub revived: Vec<UserId>,
    pub worsened: usize,
    pub errors: usize,
}

pub struct StabilizationEngine {
    vitality: Arc<dyn VitalityStore>,
    store: Arc<StabilizationStore>,
    identity: Arc<dyn IdentityProvider>,
    gates: Arc<UserGates>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    roller: Mutex<Box<dyn DiceRoller>>,
    config: VitalisConfig,
}

impl StabilizationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vitality: Arc<dyn VitalityStore>,
        store: Arc<StabilizationStore>,
        identity: Arc<dyn IdentityProvider>,
        gates: Arc<UserGates>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        roller: Box<dyn DiceRoller>,
        config: VitalisConfig,
    ) -> Self {
        Self {
            vitality,
            store,
            identity,
            gates,
            clock,
            sink,
            roller: Mutex::new(roller),
            config,
        }
    }

    /// Begin (or restart) tracking for a freshly downed character.
    ///
    /// Caller holds the user's gate. Counters reset; the recovery stamp
    /// survives so repeated knockouts cannot farm the natural tick.
    pub fn start(&self, user: UserId) -> Result<()> {
        let now = self.clock.now();
        let last_recovery = self.store.get(user).and_then(|s| s.last_recovery);
        self.store.put(StabilizationStatus {
            user_id: user,
            unstable: true,
            successes: 0,
            failures: 0,
            next_roll: now + self.config.stabilization_roll_interval_s as i64,
            last_recovery,
        });
        tracing::debug!(user = %user, "stabilization tracking started");
        Ok(())
    }

    /// Record damage taken while already down.
    ///
    /// Caller holds the user's gate. Not yet tracked means taking damage
    /// at or below zero always (re)enters tracking instead.
    pub fn add_failure(&self, user: UserId, count: u8) -> Result<RollOutcome> {
        let Some(mut status) = self.store.get(user).filter(|s| s.unstable) else {
            self.start(user)?;
            return Ok(RollOutcome::Failure);
        };

        status.failures = status.failures.saturating_add(count);
        let outcome = if status.failures >= 3 {
            self.vitality.apply_delta(user, -1)?;
            status.successes = 0;
            status.failures = 0;
            RollOutcome::Worsened
        } else {
            RollOutcome::Failure
        };
        self.store.put(status);
        Ok(outcome)
    }

    /// Driver entry: one death save for every user whose roll is due.
    pub async fn run_roll_pass(&self) -> RollPassSummary {
        let now = self.clock.now();
        let mut summary = RollPassSummary::default();

        for user in self.store.due(now) {
            let _guard = self.gates.lock(user).await;
            match self.roll_once(user, now) {
                Ok(RollOutcome::Skipped) => {}
                Ok(outcome) => {
                    summary.rolled += 1;
                    match outcome {
                        RollOutcome::Stabilized => summary.stabilized.push(user),
                        RollOutcome::Revived => summary.revived.push(user),
                        RollOutcome::Worsened => summary.worsened += 1,
                        _ => {}
                    }
                }
                Err(e) => {
                    summary.errors += 1;
                    tracing::warn!(user = %user, error = %e, "death save failed to process");
                }
            }
        }
        summary
    }

    /// One death save; caller holds the user's gate.
    fn roll_once(&self, user: UserId, now: Timestamp) -> Result<RollOutcome> {
        let Some(mut status) = self.store.get(user) else {
            return Ok(RollOutcome::Skipped);
        };
        if !status.unstable || status.next_roll > now {
            return Ok(RollOutcome::Skipped);
        }

        let vit = self.vitality.get_or_create(user)?;
        if vit.health > 0 {
            // Healed since the last pass; tracking a conscious character
            // would violate the unstable-implies-down rule.
            self.store.clear(user);
            return Ok(RollOutcome::Skipped);
        }

        let natural = self.roller.lock().expect("roller poisoned").d20();
        let success = natural >= 10;

        if natural == 20 {
            let heal = if vit.health < 0 { 2 } else { 1 };
            let updated = self.vitality.apply_delta(user, heal)?;
            if updated.health > 0 {
                self.store.clear(user);
                self.sink.notify(
                    "Stabilization",
                    &format!(
                        "{} surged back to consciousness ({} HP)",
                        self.identity.display_name(user),
                        updated.health
                    ),
                    Severity::Info,
                    now,
                );
                return Ok(RollOutcome::Revived);
            }
        } else if natural == 1 {
            self.vitality.apply_delta(user, -2)?;
        }

        let outcome = if success {
            status.successes += 1;
            if status.successes >= 3 {
                // Stabilized, not revived: health stays where it is.
                self.store.clear(user);
                self.sink.notify(
                    "Stabilization",
                    &format!("{} has stabilized", self.identity.display_name(user)),
                    Severity::Info,
                    now,
                );
                tracing::info!(user = %user, natural, "stabilized after three successes");
                return Ok(RollOutcome::Stabilized);
            }
            RollOutcome::Success
        } else {
            status.failures += 1;
            if status.failures >= 3 {
                self.vitality.apply_delta(user, -1)?;
                status.successes = 0;
                status.failures = 0;
                tracing::info!(user = %user, natural, "three failed saves, condition worsened");
                RollOutcome::Worsened
            } else {
                RollOutcome::Failure
            }
        };

        status.next_roll = now + self.config.stabilization_roll_interval_s as i64;
        self.store.put(status);
        tracing::debug!(user = %user, natural, ?outcome, "death save rolled");
        Ok(outcome)
    }

    /// Driver entry: the hourly free +1 HP for anyone stable at exactly
    /// 0 HP. Negative health never recovers naturally.
    pub async fn run_recovery_pass(&self) -> usize {
        let now = self.clock.now();
        let interval = self.config.natural_recovery_interval_s as i64;
        let candidates = match self.vitality.all() {
            Ok(all) => all,
            Err(e) => {
                tracing::warn!(error = %e, "natural recovery scan failed");
                return 0;
            }
        };

        let mut recovered = 0;
        for record in candidates.into_iter().filter(|v| v.health == 0) {
            let user = record.user_id;
            let _guard = self.gates.lock(user).await;

            // Re-check inside the gate; another driver may have moved them.
            let still_zero = matches!(self.vitality.get(user), Ok(Some(v)) if v.health == 0);
            if !still_zero {
                continue;
            }
            if self.store.get(user).map(|s| s.unstable).unwrap_or(false) {
                continue;
            }
            let due = self
                .store
                .get(user)
                .and_then(|s| s.last_recovery)
                .map_or(true, |t| now - t >= interval);
            if !due {
                continue;
            }

            match self.vitality.apply_delta(user, 1) {
                Ok(updated) => {
                    self.store.stamp_recovery(user, now);
                    recovered += 1;
                    self.sink.notify(
                        "Recovery",
                        &format!(
                            "{} came around naturally ({} HP)",
                            self.identity.display_name(user),
                            updated.health
                        ),
                        Severity::Info,
                        now,
                    );
                }
                Err(e) => {
                    tracing::warn!(user = %user, error = %e, "natural recovery failed");
                }
            }
        }
        recovered
    }

    /// End tracking without judgement (hospital healing brought the
    /// character above zero). Caller holds the user's gate.
    pub fn clear(&self, user: UserId) {
        self.store.clear(user);
    }

    pub fn status(&self, user: UserId) -> Option<StabilizationStatus> {
        self.store.get(user)
    }
}
