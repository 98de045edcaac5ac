//! Snapshot persistence
//!
//! The four logical tables plus the audit log, serialized to one JSON
//! document. Load failures surface as persistence errors and abort only
//! the load itself.

use crate::core::error::{Result, VitalError};
use crate::core::types::UserId;
use crate::economy::{EconomyLedger, FinancialAccount};
use crate::hospital::admission::{AdmissionStore, HospitalAdmission};
use crate::hospital::audit::{HospitalActionLog, HospitalLogEntry};
use crate::stabilization::status::{StabilizationStatus, StabilizationStore};
use crate::vitality::{Vitality, VitalityStore};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub vitality: Vec<Vitality>,
    pub stabilization: Vec<StabilizationStatus>,
    pub admissions: Vec<HospitalAdmission>,
    pub accounts: Vec<(UserId, FinancialAccount)>,
    pub audit: Vec<HospitalLogEntry>,
}

pub fn capture(
    vitality: &dyn VitalityStore,
    stabilization: &StabilizationStore,
    admissions: &AdmissionStore,
    ledger: &dyn EconomyLedger,
    audit: &HospitalActionLog,
) -> Result<Snapshot> {
    Ok(Snapshot {
        vitality: vitality.all()?,
        stabilization: stabilization.all(),
        admissions: admissions.all(),
        accounts: ledger.all()?,
        audit: audit.all(),
    })
}

pub fn apply(
    snapshot: Snapshot,
    vitality: &dyn VitalityStore,
    stabilization: &StabilizationStore,
    admissions: &AdmissionStore,
    ledger: &dyn EconomyLedger,
    audit: &HospitalActionLog,
) -> Result<()> {
    for record in snapshot.vitality {
        vitality.put(record)?;
    }
    stabilization.restore(snapshot.stabilization);
    admissions.restore(snapshot.admissions);
    for (user, account) in snapshot.accounts {
        ledger.put(user, account)?;
    }
    audit.restore(snapshot.audit);
    Ok(())
}

pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)
        .map_err(|e| VitalError::Persistence(format!("failed to write snapshot {:?}: {}", path, e)))
}

pub fn load(path: &Path) -> Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| VitalError::Persistence(format!("failed to read snapshot {:?}: {}", path, e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| VitalError::Persistence(format!("failed to parse snapshot: {}", e)))
}
