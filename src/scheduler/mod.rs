//! Cycle scheduler
//!
//! Three periodic concerns multiplexed on one task: the one-second
//! cooldown/reaction-window scan, the stabilization roll and natural
//! recovery loops, and the hospital cycle (which also runs once
//! immediately at startup). Every driver handles per-item failures
//! internally, so none of them can crash or stall another.

use crate::combat::CombatEngine;
use crate::core::config::VitalisConfig;
use crate::core::types::Clock;
use crate::hospital::HospitalEngine;
use crate::stabilization::StabilizationEngine;
use crate::timers::CooldownTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub struct Scheduler {
    combat: Arc<CombatEngine>,
    stabilization: Arc<StabilizationEngine>,
    hospital: Arc<HospitalEngine>,
    cooldowns: Arc<CooldownTracker>,
    clock: Arc<dyn Clock>,
    config: VitalisConfig,
}

impl Scheduler {
    pub fn new(
        combat: Arc<CombatEngine>,
        stabilization: Arc<StabilizationEngine>,
        hospital: Arc<HospitalEngine>,
        cooldowns: Arc<CooldownTracker>,
        clock: Arc<dyn Clock>,
        config: VitalisConfig,
    ) -> Self {
        Self {
            combat,
            stabilization,
            hospital,
            cooldowns,
            clock,
            config,
        }
    }

    /// Run until the shutdown signal flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = |secs: u64| Duration::from_secs(secs.max(1));

        let mut timer_scan = tokio::time::interval(period(self.config.timer_scan_interval_s));
        timer_scan.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let roll_period = period(self.config.stabilization_roll_interval_s);
        let mut roll_tick = interval_at(Instant::now() + roll_period, roll_period);
        roll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let recovery_period = period(self.config.natural_recovery_interval_s);
        let mut recovery_tick = interval_at(Instant::now() + recovery_period, recovery_period);
        recovery_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let hospital_period = period(self.config.hospital_cycle_interval_s);
        let mut hospital_tick = interval_at(Instant::now() + hospital_period, hospital_period);
        hospital_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            timer_scan_s = self.config.timer_scan_interval_s,
            roll_s = self.config.stabilization_roll_interval_s,
            recovery_s = self.config.natural_recovery_interval_s,
            hospital_s = self.config.hospital_cycle_interval_s,
            "scheduler starting"
        );

        // Immediate pass so a restart never strands patients for a full
        // cycle interval.
        self.hospital.run_cycle().await;

        loop {
            tokio::select! {
                _ = timer_scan.tick() => {
                    self.cooldowns.purge_expired(self.clock.now());
                    self.combat.resolve_expired().await;
                }
                _ = roll_tick.tick() => {
                    let summary = self.stabilization.run_roll_pass().await;
                    if summary.rolled > 0 {
                        tracing::debug!(
                            rolled = summary.rolled,
                            stabilized = summary.stabilized.len(),
                            revived = summary.revived.len(),
                            worsened = summary.worsened,
                            errors = summary.errors,
                            "stabilization roll pass"
                        );
                    }
                }
                _ = recovery_tick.tick() => {
                    let recovered = self.stabilization.run_recovery_pass().await;
                    if recovered > 0 {
                        tracing::info!(recovered, "natural recovery pass");
                    }
                }
                _ = hospital_tick.tick() => {
                    self.hospital.run_cycle().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("scheduler stopped");
    }
}
