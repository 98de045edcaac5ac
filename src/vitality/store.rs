//! Vitality storage
//!
//! Engines depend on the `VitalityStore` trait, not the in-memory
//! implementation, so the storage backend can change without touching
//! combat, stabilization, or hospital logic.

use crate::core::error::Result;
use crate::core::types::UserId;
use crate::vitality::record::Vitality;
use ahash::AHashMap;
use std::sync::RwLock;

pub trait VitalityStore: Send + Sync {
    /// Fetch a record, creating it with defaults on first reference
    fn get_or_create(&self, user: UserId) -> Result<Vitality>;

    /// Fetch without creating
    fn get(&self, user: UserId) -> Result<Option<Vitality>>;

    /// Add `delta` HP (negative for damage), returning the updated record
    ///
    /// Healing is clamped at max health; damage may push health negative.
    fn apply_delta(&self, user: UserId, delta: i32) -> Result<Vitality>;

    /// Replace a record wholesale (admin tooling, snapshot restore)
    fn put(&self, record: Vitality) -> Result<()>;

    /// All records, unordered
    fn all(&self) -> Result<Vec<Vitality>>;

    /// Every character currently at or below zero health
    fn unconscious(&self) -> Result<Vec<Vitality>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|v| v.health <= 0)
            .collect())
    }
}

/// In-memory store backing the single-process deployment
#[derive(Default)]
pub struct MemoryVitalityStore {
    records: RwLock<AHashMap<UserId, Vitality>>,
}

impl MemoryVitalityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VitalityStore for MemoryVitalityStore {
    fn get_or_create(&self, user: UserId) -> Result<Vitality> {
        let mut records = self.records.write().expect("vitality store poisoned");
        Ok(records
            .entry(user)
            .or_insert_with(|| Vitality::new(user))
            .clone())
    }

    fn get(&self, user: UserId) -> Result<Option<Vitality>> {
        let records = self.records.read().expect("vitality store poisoned");
        Ok(records.get(&user).cloned())
    }

    fn apply_delta(&self, user: UserId, delta: i32) -> Result<Vitality> {
        let mut records = self.records.write().expect("vitality store poisoned");
        let record = records.entry(user).or_insert_with(|| Vitality::new(user));
        let cap = record.max_health();
        record.health = (record.health + delta).min(cap);
        Ok(record.clone())
    }

    fn put(&self, record: Vitality) -> Result<()> {
        let mut records = self.records.write().expect("vitality store poisoned");
        records.insert(record.user_id, record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<Vitality>> {
        let records = self.records.read().expect("vitality store poisoned");
        Ok(records.values().cloned().collect())
    }
}
