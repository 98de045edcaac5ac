//! Action cooldowns
//!
//! One entry per user: the timestamp their next combat action unlocks.
//! Elapsing is not an event, just a comparison against "now"; the
//! periodic purge only keeps the map from growing.

use crate::core::types::{Timestamp, UserId};
use ahash::AHashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct CooldownTracker {
    entries: RwLock<AHashMap<UserId, Timestamp>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a user's cooldown until `until`
    pub fn arm(&self, user: UserId, until: Timestamp) {
        let mut entries = self.entries.write().expect("cooldown tracker poisoned");
        entries.insert(user, until);
    }

    /// Is the user still locked out at `now`?
    pub fn active(&self, user: UserId, now: Timestamp) -> bool {
        let entries = self.entries.read().expect("cooldown tracker poisoned");
        entries.get(&user).is_some_and(|until| *until > now)
    }

    /// Seconds left, zero when free
    pub fn remaining(&self, user: UserId, now: Timestamp) -> i64 {
        let entries = self.entries.read().expect("cooldown tracker poisoned");
        entries
            .get(&user)
            .map(|until| (*until - now).max(0))
            .unwrap_or(0)
    }

    /// Drop elapsed entries, returning how many were removed
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut entries = self.entries.write().expect("cooldown tracker poisoned");
        let before = entries.len();
        entries.retain(|_, until| *until > now);
        before - entries.len()
    }
}
