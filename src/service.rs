//! Service wiring
//!
//! Builds every store and engine with its constructor-injected
//! collaborators. Tests use `with_parts` to supply a manual clock,
//! scripted dice, and a collecting sink.

use crate::combat::dice::{DiceRoller, RngRoller};
use crate::combat::{CombatEngine, CombatStatusQuery};
use crate::core::config::VitalisConfig;
use crate::core::error::Result;
use crate::core::gate::UserGates;
use crate::core::types::{Clock, SystemClock, UserId};
use crate::economy::MemoryLedger;
use crate::hospital::admission::AdmissionStore;
use crate::hospital::audit::HospitalActionLog;
use crate::hospital::HospitalEngine;
use crate::identity::Directory;
use crate::notify::{NotificationSink, TracingSink};
use crate::scheduler::Scheduler;
use crate::stabilization::status::StabilizationStore;
use crate::stabilization::StabilizationEngine;
use crate::storage::{self, Snapshot};
use crate::timers::{CooldownTracker, ReactionWindows};
use crate::vitality::{MemoryVitalityStore, VitalState};
use std::sync::Arc;

pub struct Service {
    pub config: VitalisConfig,
    pub clock: Arc<dyn Clock>,
    pub sink: Arc<dyn NotificationSink>,
    pub directory: Arc<Directory>,
    pub vitality: Arc<MemoryVitalityStore>,
    pub ledger: Arc<MemoryLedger>,
    pub stabilization_store: Arc<StabilizationStore>,
    pub admissions: Arc<AdmissionStore>,
    pub audit: Arc<HospitalActionLog>,
    pub cooldowns: Arc<CooldownTracker>,
    pub windows: Arc<ReactionWindows>,
    pub gates: Arc<UserGates>,
    pub stabilization: Arc<StabilizationEngine>,
    pub combat: Arc<CombatEngine>,
    pub hospital: Arc<HospitalEngine>,
}

impl Service {
    /// Production wiring: system clock, entropy dice, log-backed sink
    pub fn new(config: VitalisConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(SystemClock),
            Arc::new(TracingSink),
            Box::new(RngRoller::from_entropy()),
            Box::new(RngRoller::from_entropy()),
        )
    }

    pub fn with_parts(
        config: VitalisConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        combat_roller: Box<dyn DiceRoller>,
        stabilization_roller: Box<dyn DiceRoller>,
    ) -> Self {
        let directory = Arc::new(Directory::new());
        let vitality = Arc::new(MemoryVitalityStore::new());
        let ledger = Arc::new(MemoryLedger::new(
            config.starting_cash,
            config.starting_bank,
            config.default_credit_multiplier,
        ));
        let stabilization_store = Arc::new(StabilizationStore::new());
        let admissions = Arc::new(AdmissionStore::new());
        let audit = Arc::new(HospitalActionLog::new());
        let cooldowns = Arc::new(CooldownTracker::new());
        let windows = Arc::new(ReactionWindows::new());
        let gates = Arc::new(UserGates::new());

        let stabilization = Arc::new(StabilizationEngine::new(
            vitality.clone(),
            stabilization_store.clone(),
            directory.clone(),
            gates.clone(),
            clock.clone(),
            sink.clone(),
            stabilization_roller,
            config.clone(),
        ));

        let combat = Arc::new(CombatEngine::new(
            vitality.clone(),
            stabilization.clone(),
            cooldowns.clone(),
            windows.clone(),
            admissions.clone(),
            directory.clone(),
            gates.clone(),
            clock.clone(),
            sink.clone(),
            combat_roller,
            config.clone(),
        ));

        let hospital = Arc::new(HospitalEngine::new(
            vitality.clone(),
            ledger.clone(),
            admissions.clone(),
            stabilization_store.clone(),
            audit.clone(),
            windows.clone(),
            directory.clone(),
            gates.clone(),
            clock.clone(),
            sink.clone(),
            config.clone(),
        ));

        Self {
            config,
            clock,
            sink,
            directory,
            vitality,
            ledger,
            stabilization_store,
            admissions,
            audit,
            cooldowns,
            windows,
            gates,
            stabilization,
            combat,
            hospital,
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.combat.clone(),
            self.stabilization.clone(),
            self.hospital.clone(),
            self.cooldowns.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    /// One exhaustive condition for status rendering and admin tooling
    pub fn condition(&self, user: UserId) -> Result<VitalState> {
        use crate::vitality::VitalityStore;
        let vitality = self.vitality.get_or_create(user)?;
        let stabilization = self.stabilization_store.get(user);
        let admission = self.admissions.get(user);
        let now = self.clock.now();
        let opponent = if self.windows.in_combat(user, now) {
            self.windows.opponent_of(user, now)
        } else {
            None
        };
        Ok(VitalState::assess(
            &vitality,
            stabilization.as_ref(),
            admission.as_ref(),
            opponent,
        ))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        storage::capture(
            self.vitality.as_ref(),
            &self.stabilization_store,
            &self.admissions,
            self.ledger.as_ref(),
            &self.audit,
        )
    }

    pub fn restore(&self, snapshot: Snapshot) -> Result<()> {
        storage::apply(
            snapshot,
            self.vitality.as_ref(),
            &self.stabilization_store,
            &self.admissions,
            self.ledger.as_ref(),
            &self.audit,
        )
    }
}
