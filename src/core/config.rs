//! Service configuration
//!
//! Every tunable the engines consult lives here: billing rates, timer
//! cadences, and the economy defaults new accounts are seeded with.

use crate::core::error::{Result, VitalError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalisConfig {
    /// Flat fee for ambulance transport into hospital care
    pub transport_cost: i64,

    /// Price of one hit point of hospital healing
    ///
    /// Medical charges are never taxed, unlike general economy transfers.
    pub healing_cost_per_hp: i64,

    /// Seconds between death-save rolls for an unstable character
    pub stabilization_roll_interval_s: u64,

    /// Seconds between full hospital cycles (one immediate pass runs at
    /// startup as well)
    pub hospital_cycle_interval_s: u64,

    /// Seconds between natural +1 HP recoveries at exactly 0 HP
    pub natural_recovery_interval_s: u64,

    /// How long an attacked character may retaliate or flee before the
    /// automatic default action fires
    pub reaction_window_duration_s: u64,

    /// Minimum seconds between one actor's successive combat actions
    pub action_cooldown_duration_s: u64,

    /// Resolution of the cooldown/reaction-window expiry scan
    pub timer_scan_interval_s: u64,

    /// Cash a brand-new financial account starts with
    pub starting_cash: i64,

    /// Bank balance a brand-new financial account starts with
    pub starting_bank: i64,

    /// Borrowing capacity as a multiple of total balance
    pub default_credit_multiplier: f64,
}

impl Default for VitalisConfig {
    fn default() -> Self {
        Self {
            transport_cost: 500,
            healing_cost_per_hp: 1000,
            stabilization_roll_interval_s: 6,
            hospital_cycle_interval_s: 300,
            natural_recovery_interval_s: 3600,
            reaction_window_duration_s: 6,
            action_cooldown_duration_s: 6,
            timer_scan_interval_s: 1,
            starting_cash: 2000,
            starting_bank: 0,
            default_credit_multiplier: 2.0,
        }
    }
}

/// Load configuration from a TOML file
///
/// Missing keys fall back to defaults via `#[serde(default)]`.
pub fn load_config(path: &Path) -> Result<VitalisConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| VitalError::Persistence(format!("failed to read config {:?}: {}", path, e)))?;

    let config: VitalisConfig = toml::from_str(&contents)
        .map_err(|e| VitalError::Persistence(format!("failed to parse config TOML: {}", e)))?;

    Ok(config)
}
