//! Append-only hospital action log
//!
//! Every successful transport, healing session, and discharge writes
//! exactly one entry; billing failures write a failed entry. Nothing is
//! ever updated or removed.

use crate::core::types::{Timestamp, UserId};
use crate::economy::PaymentMethod;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HospitalAction {
    Transport,
    HealingSession,
    Discharge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalLogEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub action: HospitalAction,
    /// HP moved by this action (zero for transport/discharge)
    pub amount: i32,
    pub cost: i64,
    pub payment_method: Option<PaymentMethod>,
    pub success: bool,
    pub health_before: i32,
    pub health_after: i32,
    pub timestamp: Timestamp,
    pub details: String,
}

#[derive(Default)]
pub struct HospitalActionLog {
    entries: RwLock<Vec<HospitalLogEntry>>,
}

impl HospitalActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        user_id: UserId,
        action: HospitalAction,
        amount: i32,
        cost: i64,
        payment_method: Option<PaymentMethod>,
        success: bool,
        health_before: i32,
        health_after: i32,
        timestamp: Timestamp,
        details: String,
    ) {
        let entry = HospitalLogEntry {
            id: Uuid::new_v4(),
            user_id,
            action,
            amount,
            cost,
            payment_method,
            success,
            health_before,
            health_after,
            timestamp,
            details,
        };
        self.entries.write().expect("audit log poisoned").push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("audit log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent entries for one user, newest first
    pub fn for_user(&self, user: UserId, limit: usize) -> Vec<HospitalLogEntry> {
        let entries = self.entries.read().expect("audit log poisoned");
        entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<HospitalLogEntry> {
        self.entries.read().expect("audit log poisoned").clone()
    }

    pub fn restore(&self, entries: Vec<HospitalLogEntry>) {
        *self.entries.write().expect("audit log poisoned") = entries;
    }
}
