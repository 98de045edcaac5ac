//! Hospital admission records

use crate::core::types::{Timestamp, UserId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalAdmission {
    pub user_id: UserId,
    pub in_hospital: bool,
    pub transport_time: Option<Timestamp>,
    pub last_healing_attempt: Option<Timestamp>,
}

impl HospitalAdmission {
    pub fn discharged(user_id: UserId) -> Self {
        Self {
            user_id,
            in_hospital: false,
            transport_time: None,
            last_healing_attempt: None,
        }
    }
}

/// Read-side seam: combat refuses to target anyone under care
pub trait AdmissionQuery: Send + Sync {
    fn in_hospital(&self, user: UserId) -> bool;
}

#[derive(Default)]
pub struct AdmissionStore {
    records: RwLock<AHashMap<UserId, HospitalAdmission>>,
}

impl AdmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId) -> Option<HospitalAdmission> {
        let records = self.records.read().expect("admission store poisoned");
        records.get(&user).cloned()
    }

    pub fn admit(&self, user: UserId, now: Timestamp) {
        let mut records = self.records.write().expect("admission store poisoned");
        let record = records
            .entry(user)
            .or_insert_with(|| HospitalAdmission::discharged(user));
        record.in_hospital = true;
        record.transport_time = Some(now);
    }

    pub fn discharge(&self, user: UserId) {
        let mut records = self.records.write().expect("admission store poisoned");
        if let Some(record) = records.get_mut(&user) {
            record.in_hospital = false;
        }
    }

    pub fn touch_healing(&self, user: UserId, now: Timestamp) {
        let mut records = self.records.write().expect("admission store poisoned");
        if let Some(record) = records.get_mut(&user) {
            record.last_healing_attempt = Some(now);
        }
    }

    /// Everyone currently admitted
    pub fn admitted(&self) -> Vec<UserId> {
        let records = self.records.read().expect("admission store poisoned");
        records
            .values()
            .filter(|r| r.in_hospital)
            .map(|r| r.user_id)
            .collect()
    }

    pub fn all(&self) -> Vec<HospitalAdmission> {
        let records = self.records.read().expect("admission store poisoned");
        records.values().cloned().collect()
    }

    pub fn restore(&self, admissions: Vec<HospitalAdmission>) {
        let mut records = self.records.write().expect("admission store poisoned");
        records.clear();
        for admission in admissions {
            records.insert(admission.user_id, admission);
        }
    }
}

impl AdmissionQuery for AdmissionStore {
    fn in_hospital(&self, user: UserId) -> bool {
        self.get(user).map(|r| r.in_hospital).unwrap_or(false)
    }
}
