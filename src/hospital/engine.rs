//! Hospital operations
//!
//! Transport is a flat-fee admission, healing is an iterative paid loop
//! that stops at 1 HP or empty pockets, and the periodic cycle sweeps
//! every downed character through transport, healing, and discharge.
//! Per-user work happens inside that user's gate; one patient's failure
//! never stops the rest of the cycle.

use crate::combat::query::CombatStatusQuery;
use crate::core::config::VitalisConfig;
use crate::core::error::{Result, VitalError};
use crate::core::gate::UserGates;
use crate::core::types::{Clock, Severity, UserId};
use crate::economy::EconomyLedger;
use crate::hospital::admission::{AdmissionQuery, AdmissionStore};
use crate::hospital::audit::{HospitalAction, HospitalActionLog};
use crate::hospital::billing::max_affordable_healing;
use crate::identity::IdentityProvider;
use crate::notify::NotificationSink;
use crate::stabilization::status::StabilizationStore;
use crate::vitality::VitalityStore;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DischargeMode {
    /// End-of-cycle discharge of recovered patients
    Auto,
    /// Patient walked out; requires positive health
    Voluntary,
    /// Staff override; allowed regardless of consciousness
    Admin,
}

impl std::fmt::Display for DischargeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DischargeMode::Auto => write!(f, "automatic"),
            DischargeMode::Voluntary => write!(f, "voluntary"),
            DischargeMode::Admin => write!(f, "admin"),
        }
    }
}

/// Outcome of one healing run for one patient
#[derive(Debug, Clone, Default)]
pub struct HealingReport {
    pub sessions: u32,
    pub hp_restored: i32,
    pub total_cost: i64,
    pub final_health: i32,
    /// Reached at least 1 HP
    pub stabilized: bool,
}

/// Aggregate result of one full hospital cycle
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub transported: usize,
    /// Patients who received at least one healing session
    pub healed: usize,
    pub sessions: usize,
    pub discharged: usize,
    /// Skipped because they were mid-fight
    pub blocked: usize,
    pub total_cost: i64,
    pub duration_ms: u64,
    /// Display names of patients billing could not cover
    pub underfunded: Vec<String>,
    pub errors: usize,
}

pub struct HospitalEngine {
    vitality: Arc<dyn VitalityStore>,
    ledger: Arc<dyn EconomyLedger>,
    admissions: Arc<AdmissionStore>,
    stabilization: Arc<StabilizationStore>,
    log: Arc<HospitalActionLog>,
    combat: Arc<dyn CombatStatusQuery>,
    identity: Arc<dyn IdentityProvider>,
    gates: Arc<UserGates>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    config: VitalisConfig,
}

impl HospitalEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vitality: Arc<dyn VitalityStore>,
        ledger: Arc<dyn EconomyLedger>,
        admissions: Arc<AdmissionStore>,
        stabilization: Arc<StabilizationStore>,
        log: Arc<HospitalActionLog>,
        combat: Arc<dyn CombatStatusQuery>,
        identity: Arc<dyn IdentityProvider>,
        gates: Arc<UserGates>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        config: VitalisConfig,
    ) -> Self {
        Self {
            vitality,
            ledger,
            admissions,
            stabilization,
            log,
            combat,
            identity,
            gates,
            clock,
            sink,
            config,
        }
    }

    /// Paid ambulance ride into care
    pub async fn transport(&self, user: UserId) -> Result<()> {
        let _guard = self.gates.lock(user).await;
        self.transport_locked(user)
    }

    fn transport_locked(&self, user: UserId) -> Result<()> {
        let now = self.clock.now();
        if self.combat.in_combat(user, now) {
            return Err(VitalError::StateConflict(
                "cannot transport a combatant mid-fight".to_string(),
            ));
        }
        if self.admissions.in_hospital(user) {
            return Err(VitalError::StateConflict(
                "already under hospital care".to_string(),
            ));
        }

        let vit = self.vitality.get_or_create(user)?;
        match self.ledger.charge(user, self.config.transport_cost) {
            Ok(method) => {
                self.admissions.admit(user, now);
                self.log.record(
                    user,
                    HospitalAction::Transport,
                    0,
                    self.config.transport_cost,
                    Some(method),
                    true,
                    vit.health,
                    vit.health,
                    now,
                    "transported to hospital".to_string(),
                );
                tracing::info!(user = %user, cost = self.config.transport_cost, "patient transported");
                Ok(())
            }
            Err(e @ VitalError::InsufficientFunds { .. }) => {
                self.log.record(
                    user,
                    HospitalAction::Transport,
                    0,
                    self.config.transport_cost,
                    None,
                    false,
                    vit.health,
                    vit.health,
                    now,
                    format!("transport billing failed: {}", e),
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Heal an admitted, unconscious patient back to 1 HP, one paid
    /// session at a time, until stabilized or funds run out.
    pub async fn heal_to_stabilization(&self, user: UserId) -> Result<HealingReport> {
        let _guard = self.gates.lock(user).await;
        self.heal_locked(user)
    }

    fn heal_locked(&self, user: UserId) -> Result<HealingReport> {
        if !self.admissions.in_hospital(user) {
            return Err(VitalError::StateConflict(
                "not under hospital care".to_string(),
            ));
        }
        let vit = self.vitality.get_or_create(user)?;
        if vit.health > 0 {
            return Err(VitalError::StateConflict(
                "patient does not need stabilization care".to_string(),
            ));
        }

        let mut report = HealingReport {
            final_health: vit.health,
            ..Default::default()
        };

        loop {
            let now = self.clock.now();
            let vit = self.vitality.get_or_create(user)?;
            report.final_health = vit.health;
            let needed = 1 - vit.health;
            if needed <= 0 {
                report.stabilized = true;
                break;
            }

            let account = self.ledger.balance(user)?;
            let quote = max_affordable_healing(
                &account,
                vit.health,
                vit.max_health(),
                self.config.healing_cost_per_hp,
            );
            let grant = quote.hp.min(needed);
            if grant <= 0 {
                self.log.record(
                    user,
                    HospitalAction::HealingSession,
                    needed,
                    0,
                    None,
                    false,
                    vit.health,
                    vit.health,
                    now,
                    "insufficient funds for healing".to_string(),
                );
                break;
            }
            let cost = if grant == quote.hp {
                quote.cost
            } else {
                grant as i64 * self.config.healing_cost_per_hp
            };

            let method = match self.ledger.charge(user, cost) {
                Ok(method) => method,
                Err(e @ VitalError::InsufficientFunds { .. }) => {
                    // Balance moved under us between quote and charge.
                    self.log.record(
                        user,
                        HospitalAction::HealingSession,
                        grant,
                        cost,
                        None,
                        false,
                        vit.health,
                        vit.health,
                        now,
                        format!("healing billing failed: {}", e),
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            let updated = self.vitality.apply_delta(user, grant)?;
            self.admissions.touch_healing(user, now);
            self.log.record(
                user,
                HospitalAction::HealingSession,
                grant,
                cost,
                Some(method),
                true,
                vit.health,
                updated.health,
                now,
                format!("healing session via {}", method),
            );

            report.sessions += 1;
            report.hp_restored += grant;
            report.total_cost += cost;
            report.final_health = updated.health;
        }

        if report.final_health >= 1 {
            // Conscious again; death-save tracking must not outlive that.
            self.stabilization.clear(user);
        }

        tracing::info!(
            user = %user,
            sessions = report.sessions,
            hp = report.hp_restored,
            cost = report.total_cost,
            stabilized = report.stabilized,
            "healing run finished"
        );
        Ok(report)
    }

    /// Release a patient
    pub async fn discharge(&self, user: UserId, mode: DischargeMode) -> Result<()> {
        let _guard = self.gates.lock(user).await;
        self.discharge_locked(user, mode)
    }

    fn discharge_locked(&self, user: UserId, mode: DischargeMode) -> Result<()> {
        if !self.admissions.in_hospital(user) {
            return Err(VitalError::StateConflict(
                "not under hospital care".to_string(),
            ));
        }
        let vit = self.vitality.get_or_create(user)?;
        if mode != DischargeMode::Admin && vit.health <= 0 {
            return Err(VitalError::StateConflict(
                "patient is still unconscious".to_string(),
            ));
        }

        let now = self.clock.now();
        self.admissions.discharge(user);
        self.log.record(
            user,
            HospitalAction::Discharge,
            0,
            0,
            None,
            true,
            vit.health,
            vit.health,
            now,
            format!("{} discharge", mode),
        );
        tracing::info!(user = %user, %mode, health = vit.health, "patient discharged");
        Ok(())
    }

    /// Driver entry: one full hospital pass.
    ///
    /// Sweeps every downed character (transport where needed, then heal),
    /// then discharges every admitted patient back above zero health.
    pub async fn run_cycle(&self) -> CycleSummary {
        let started = Instant::now();
        let mut summary = CycleSummary::default();

        let down = match self.vitality.unconscious() {
            Ok(down) => down,
            Err(e) => {
                tracing::warn!(error = %e, "hospital cycle could not scan vitality");
                summary.errors += 1;
                return summary;
            }
        };

        for record in down {
            let user = record.user_id;
            let _guard = self.gates.lock(user).await;
            if let Err(e) = self.process_downed(user, &mut summary) {
                summary.errors += 1;
                tracing::warn!(user = %user, error = %e, "hospital cycle item failed");
            }
        }

        for user in self.admissions.admitted() {
            let _guard = self.gates.lock(user).await;
            let recovered = matches!(self.vitality.get(user), Ok(Some(v)) if v.health > 0);
            if !recovered {
                continue;
            }
            match self.discharge_locked(user, DischargeMode::Auto) {
                Ok(()) => summary.discharged += 1,
                Err(e) => {
                    summary.errors += 1;
                    tracing::warn!(user = %user, error = %e, "auto discharge failed");
                }
            }
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        self.emit_summary(&summary);
        summary
    }

    /// One downed character's cycle step; caller holds their gate.
    fn process_downed(&self, user: UserId, summary: &mut CycleSummary) -> Result<()> {
        // Re-check inside the gate; a death save or heal may have moved them.
        let still_down = matches!(self.vitality.get(user), Ok(Some(v)) if v.health <= 0);
        if !still_down {
            return Ok(());
        }

        let now = self.clock.now();
        if self.combat.in_combat(user, now) {
            summary.blocked += 1;
            tracing::debug!(user = %user, "cycle blocked: patient in combat");
            return Ok(());
        }

        if !self.admissions.in_hospital(user) {
            match self.transport_locked(user) {
                Ok(()) => {
                    summary.transported += 1;
                    summary.total_cost += self.config.transport_cost;
                }
                Err(VitalError::InsufficientFunds { .. }) => {
                    summary.underfunded.push(self.identity.display_name(user));
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        let report = self.heal_locked(user)?;
        if report.sessions > 0 {
            summary.healed += 1;
            summary.sessions += report.sessions as usize;
            summary.total_cost += report.total_cost;
        }
        if !report.stabilized {
            summary.underfunded.push(self.identity.display_name(user));
        }
        Ok(())
    }

    fn emit_summary(&self, summary: &CycleSummary) {
        let now = self.clock.now();
        let body = format!(
            "transported {}, healed {} ({} sessions), discharged {}, blocked {}, cost {}, {} ms{}",
            summary.transported,
            summary.healed,
            summary.sessions,
            summary.discharged,
            summary.blocked,
            summary.total_cost,
            summary.duration_ms,
            if summary.underfunded.is_empty() {
                String::new()
            } else {
                format!("; underfunded: {}", summary.underfunded.join(", "))
            }
        );
        let severity = if summary.underfunded.is_empty() && summary.errors == 0 {
            Severity::Info
        } else {
            Severity::Warning
        };
        self.sink.notify("Hospital cycle", &body, severity, now);
        tracing::info!(
            transported = summary.transported,
            healed = summary.healed,
            discharged = summary.discharged,
            blocked = summary.blocked,
            cost = summary.total_cost,
            errors = summary.errors,
            "hospital cycle complete"
        );
    }

    pub fn admission(&self, user: UserId) -> Option<crate::hospital::admission::HospitalAdmission> {
        self.admissions.get(user)
    }
}
