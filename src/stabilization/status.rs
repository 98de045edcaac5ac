//! Stabilization status records
//!
//! One row per user, created on first knockout and cleared (never
//! deleted) when tracking ends. `next_roll` is a stored expiry scanned
//! by the roll driver, not a live timer.

use crate::core::types::{Timestamp, UserId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilizationStatus {
    pub user_id: UserId,
    pub unstable: bool,
    pub successes: u8,
    pub failures: u8,
    pub next_roll: Timestamp,
    pub last_recovery: Option<Timestamp>,
}

impl StabilizationStatus {
    pub fn cleared(user_id: UserId) -> Self {
        Self {
            user_id,
            unstable: false,
            successes: 0,
            failures: 0,
            next_roll: 0,
            last_recovery: None,
        }
    }
}

#[derive(Default)]
pub struct StabilizationStore {
    records: RwLock<AHashMap<UserId, StabilizationStatus>>,
}

impl StabilizationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user: UserId) -> Option<StabilizationStatus> {
        let records = self.records.read().expect("stabilization store poisoned");
        records.get(&user).cloned()
    }

    pub fn put(&self, status: StabilizationStatus) {
        let mut records = self.records.write().expect("stabilization store poisoned");
        records.insert(status.user_id, status);
    }

    /// End tracking: unstable off, counters reset, recovery stamp kept
    pub fn clear(&self, user: UserId) {
        let mut records = self.records.write().expect("stabilization store poisoned");
        if let Some(status) = records.get_mut(&user) {
            status.unstable = false;
            status.successes = 0;
            status.failures = 0;
        }
    }

    /// Users whose next death save is due
    pub fn due(&self, now: Timestamp) -> Vec<UserId> {
        let records = self.records.read().expect("stabilization store poisoned");
        records
            .values()
            .filter(|s| s.unstable && s.next_roll <= now)
            .map(|s| s.user_id)
            .collect()
    }

    pub fn stamp_recovery(&self, user: UserId, now: Timestamp) {
        let mut records = self.records.write().expect("stabilization store poisoned");
        records
            .entry(user)
            .or_insert_with(|| StabilizationStatus::cleared(user))
            .last_recovery = Some(now);
    }

    pub fn all(&self) -> Vec<StabilizationStatus> {
        let records = self.records.read().expect("stabilization store poisoned");
        records.values().cloned().collect()
    }

    pub fn restore(&self, statuses: Vec<StabilizationStatus>) {
        let mut records = self.records.write().expect("stabilization store poisoned");
        records.clear();
        for status in statuses {
            records.insert(status.user_id, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_counters_but_keeps_the_row() {
        let store = StabilizationStore::new();
        store.put(StabilizationStatus {
            user_id: UserId(1),
            unstable: true,
            successes: 2,
            failures: 1,
            next_roll: 50,
            last_recovery: Some(10),
        });

        store.clear(UserId(1));
        let status = store.get(UserId(1)).unwrap();
        assert!(!status.unstable);
        assert_eq!(status.successes, 0);
        assert_eq!(status.failures, 0);
        assert_eq!(status.last_recovery, Some(10));
    }

    #[test]
    fn due_filters_on_unstable_and_next_roll() {
        let store = StabilizationStore::new();
        store.put(StabilizationStatus {
            user_id: UserId(1),
            unstable: true,
            successes: 0,
            failures: 0,
            next_roll: 30,
            last_recovery: None,
        });
        store.put(StabilizationStatus {
            user_id: UserId(2),
            unstable: true,
            successes: 0,
            failures: 0,
            next_roll: 90,
            last_recovery: None,
        });
        store.put(StabilizationStatus::cleared(UserId(3)));

        let due = store.due(60);
        assert_eq!(due, vec![UserId(1)]);
    }
}
