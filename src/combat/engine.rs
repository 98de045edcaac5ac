//! Attack resolution
//!
//! d20 + attack bonus against 10 + dex modifier. Natural 20 always hits
//! and doubles damage; natural 1 always misses. Damage is applied first,
//! then the zero-crossing is detected and stabilization signalled, all
//! inside the attacker/defender gate scope, so a defender is never left
//! at or below zero without a stabilization record.

use crate::combat::dice::{DiceRoller, DAMAGE_DIE};
use crate::core::config::VitalisConfig;
use crate::core::error::{Result, VitalError};
use crate::core::gate::UserGates;
use crate::core::types::{Clock, Severity, Timestamp, UserId};
use crate::hospital::admission::AdmissionQuery;
use crate::identity::IdentityProvider;
use crate::notify::NotificationSink;
use crate::stabilization::StabilizationEngine;
use crate::timers::{CooldownTracker, ReactionWindows, WindowState};
use crate::vitality::VitalityStore;
use std::sync::{Arc, Mutex};

/// How an attack was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    /// A user command; subject to cooldown, may open a reaction window
    Manual,
    /// Timed-out reaction window retaliation; never opens another window
    Auto,
}

#[derive(Debug, Clone)]
pub struct AttackReport {
    pub attacker: UserId,
    pub defender: UserId,
    pub attacker_name: String,
    pub defender_name: String,
    pub natural: i32,
    pub attack_total: i32,
    pub target_ac: i32,
    pub hit: bool,
    pub critical: bool,
    pub fumble: bool,
    pub damage: i32,
    pub defender_health: i32,
    /// Defender crossed from conscious to unconscious on this hit
    pub defender_downed: bool,
    pub window_opened: bool,
    pub automatic: bool,
}

pub struct CombatEngine {
    vitality: Arc<dyn VitalityStore>,
    stabilization: Arc<StabilizationEngine>,
    cooldowns: Arc<CooldownTracker>,
    windows: Arc<ReactionWindows>,
    admissions: Arc<dyn AdmissionQuery>,
    identity: Arc<dyn IdentityProvider>,
    gates: Arc<UserGates>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    roller: Mutex<Box<dyn DiceRoller>>,
    config: VitalisConfig,
}

impl CombatEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vitality: Arc<dyn VitalityStore>,
        stabilization: Arc<StabilizationEngine>,
        cooldowns: Arc<CooldownTracker>,
        windows: Arc<ReactionWindows>,
        admissions: Arc<dyn AdmissionQuery>,
        identity: Arc<dyn IdentityProvider>,
        gates: Arc<UserGates>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        roller: Box<dyn DiceRoller>,
        config: VitalisConfig,
    ) -> Self {
        Self {
            vitality,
            stabilization,
            cooldowns,
            windows,
            admissions,
            identity,
            gates,
            clock,
            sink,
            roller: Mutex::new(roller),
            config,
        }
    }

    /// Resolve one attack
    pub async fn attack(
        &self,
        attacker: UserId,
        defender: UserId,
        kind: AttackKind,
    ) -> Result<AttackReport> {
        if attacker == defender {
            return Err(VitalError::Validation(
                "you cannot attack yourself".to_string(),
            ));
        }
        if !self.identity.is_player(defender) {
            return Err(VitalError::Validation(format!(
                "{} is not a player",
                self.identity.display_name(defender)
            )));
        }

        let _guards = self.gates.lock_pair(attacker, defender).await;
        self.attack_locked(attacker, defender, kind)
    }

    /// Core resolution; caller holds both users' gates
    fn attack_locked(
        &self,
        attacker: UserId,
        defender: UserId,
        kind: AttackKind,
    ) -> Result<AttackReport> {
        let now = self.clock.now();

        let atk = self.vitality.get_or_create(attacker)?;
        if atk.health <= 0 {
            return Err(VitalError::Validation(
                "you are unconscious and cannot act".to_string(),
            ));
        }
        // An admitted patient cannot fight from a hospital bed, even
        // once healed; they must be discharged first.
        if self.admissions.in_hospital(attacker) {
            return Err(VitalError::StateConflict(
                "you are under hospital care".to_string(),
            ));
        }
        if self.admissions.in_hospital(defender) {
            return Err(VitalError::Validation(format!(
                "{} is under hospital care",
                self.identity.display_name(defender)
            )));
        }
        if kind == AttackKind::Manual && self.cooldowns.active(attacker, now) {
            return Err(VitalError::StateConflict(format!(
                "action on cooldown for {}s",
                self.cooldowns.remaining(attacker, now)
            )));
        }

        let def_before = self.vitality.get_or_create(defender)?;

        // A manual attack while holding an open window is the retaliation
        // that resolves it.
        if kind == AttackKind::Manual && self.windows.get(attacker).is_some() {
            self.windows.resolve(attacker, WindowState::ResolvedManual);
        }

        let natural = self.roller.lock().expect("roller poisoned").d20();

        let attack_total = natural + atk.attack_bonus();
        let target_ac = def_before.armor_class();
        let critical = natural == 20;
        let fumble = natural == 1;
        let hit = critical || (!fumble && attack_total >= target_ac);

        let mut damage = 0;
        let mut def_after = def_before.clone();
        if hit {
            let base_damage = self.roller.lock().expect("roller poisoned").roll(DAMAGE_DIE);
            damage = base_damage + atk.strength_modifier();
            if critical {
                damage *= 2;
            }
            damage = damage.max(1);
            def_after = self.vitality.apply_delta(defender, -damage)?;
        }

        // Every resolved attack sets the actor's cooldown, automatic ones
        // included.
        self.cooldowns
            .arm(attacker, now + self.config.action_cooldown_duration_s as i64);

        let defender_downed = def_before.health > 0 && def_after.health <= 0;
        if defender_downed {
            self.stabilization.start(defender)?;
            self.sink.notify(
                "Combat",
                &format!(
                    "{} knocked {} unconscious ({} HP)",
                    self.identity.display_name(attacker),
                    self.identity.display_name(defender),
                    def_after.health
                ),
                Severity::Warning,
                now,
            );
        } else if hit && def_before.health <= 0 {
            // Hitting someone already down worsens their death saves.
            self.stabilization
                .add_failure(defender, if critical { 2 } else { 1 })?;
        }

        let window_opened = kind == AttackKind::Manual && def_after.health > 0;
        if window_opened {
            self.windows.open(
                defender,
                attacker,
                now,
                now + self.config.reaction_window_duration_s as i64,
            );
        }

        let report = AttackReport {
            attacker,
            defender,
            attacker_name: self.identity.display_name(attacker),
            defender_name: self.identity.display_name(defender),
            natural,
            attack_total,
            target_ac,
            hit,
            critical,
            fumble,
            damage,
            defender_health: def_after.health,
            defender_downed,
            window_opened,
            automatic: kind == AttackKind::Auto,
        };

        tracing::debug!(
            attacker = %report.attacker_name,
            defender = %report.defender_name,
            natural,
            attack_total,
            target_ac,
            hit,
            damage,
            defender_health = report.defender_health,
            automatic = report.automatic,
            "attack resolved"
        );

        Ok(report)
    }

    /// Clear the caller's reaction window by fleeing
    pub async fn retreat(&self, user: UserId) -> Result<()> {
        let _guard = self.gates.lock(user).await;
        match self.windows.resolve(user, WindowState::Retreated) {
            Some(window) => {
                tracing::debug!(
                    defender = %user,
                    attacker = %window.attacker,
                    "retreated from reaction window"
                );
                Ok(())
            }
            None => Err(VitalError::StateConflict(
                "no reaction window to retreat from".to_string(),
            )),
        }
    }

    /// Driver entry: auto-resolve every expired reaction window.
    ///
    /// An unconscious defender's window just lapses. Each retaliation runs
    /// in its own failure boundary; one bad window never stalls the scan.
    pub async fn resolve_expired(&self) -> usize {
        let now = self.clock.now();
        let mut resolved = 0;
        for mut window in self.windows.take_expired(now) {
            window.state = WindowState::ResolvedAuto;
            let conscious = matches!(
                self.vitality.get(window.defender),
                Ok(Some(v)) if v.health > 0
            );
            if !conscious {
                tracing::debug!(
                    defender = %window.defender,
                    "reaction window lapsed while defender unconscious"
                );
                continue;
            }
            match self
                .attack(window.defender, window.attacker, AttackKind::Auto)
                .await
            {
                Ok(report) => {
                    resolved += 1;
                    tracing::info!(
                        defender = %report.attacker_name,
                        attacker = %report.defender_name,
                        hit = report.hit,
                        "automatic retaliation fired"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        defender = %window.defender,
                        attacker = %window.attacker,
                        error = %e,
                        "automatic retaliation failed"
                    );
                }
            }
        }
        resolved
    }

    /// Seconds left on a user's action cooldown
    pub fn cooldown_remaining(&self, user: UserId) -> i64 {
        self.cooldowns.remaining(user, self.clock.now())
    }

    /// Live opponent, if the user is inside a reaction window
    pub fn opponent_of(&self, user: UserId) -> Option<UserId> {
        self.windows.opponent_of(user, self.clock.now())
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }
}
