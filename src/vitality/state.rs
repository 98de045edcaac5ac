//! Derived condition view
//!
//! Persisted state stays in separate per-concern tables, but every
//! validation and status render goes through this one exhaustive view so
//! an inconsistent flag combination can never drive a decision.

use crate::core::types::{Timestamp, UserId};
use crate::hospital::admission::HospitalAdmission;
use crate::stabilization::status::StabilizationStatus;
use crate::vitality::record::Vitality;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VitalState {
    Conscious,
    /// Inside a live reaction window, on either side
    InCombat { opponent: UserId },
    Hospitalized { since: Option<Timestamp> },
    /// Down and rolling death saves
    UnconsciousStabilizing {
        successes: u8,
        failures: u8,
        next_roll: Timestamp,
    },
    /// Down but no longer tracked; recovers only via the hourly natural
    /// tick at exactly 0 HP or paid hospital healing
    UnconsciousStable,
}

impl VitalState {
    /// Collapse the per-concern records into one tagged condition.
    ///
    /// Hospitalization and combat are mutually exclusive by construction
    /// (transport is refused while in combat), so precedence between them
    /// never actually decides anything.
    pub fn assess(
        vitality: &Vitality,
        stabilization: Option<&StabilizationStatus>,
        admission: Option<&HospitalAdmission>,
        combat_opponent: Option<UserId>,
    ) -> Self {
        if let Some(adm) = admission {
            if adm.in_hospital {
                return VitalState::Hospitalized {
                    since: adm.transport_time,
                };
            }
        }
        if let Some(opponent) = combat_opponent {
            return VitalState::InCombat { opponent };
        }
        if vitality.health <= 0 {
            if let Some(status) = stabilization {
                if status.unstable {
                    return VitalState::UnconsciousStabilizing {
                        successes: status.successes,
                        failures: status.failures,
                        next_roll: status.next_roll,
                    };
                }
            }
            return VitalState::UnconsciousStable;
        }
        VitalState::Conscious
    }

    pub fn label(&self) -> &'static str {
        match self {
            VitalState::Conscious => "conscious",
            VitalState::InCombat { .. } => "in combat",
            VitalState::Hospitalized { .. } => "hospitalized",
            VitalState::UnconsciousStabilizing { .. } => "unconscious (stabilizing)",
            VitalState::UnconsciousStable => "unconscious (stable)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconscious_without_tracking_is_stable() {
        let mut v = Vitality::new(UserId(1));
        v.health = -2;
        let state = VitalState::assess(&v, None, None, None);
        assert_eq!(state, VitalState::UnconsciousStable);
    }

    #[test]
    fn hospital_wins_over_unconsciousness() {
        let mut v = Vitality::new(UserId(1));
        v.health = -2;
        let adm = HospitalAdmission {
            user_id: UserId(1),
            in_hospital: true,
            transport_time: Some(40),
            last_healing_attempt: None,
        };
        let state = VitalState::assess(&v, None, Some(&adm), None);
        assert_eq!(state, VitalState::Hospitalized { since: Some(40) });
    }
}
