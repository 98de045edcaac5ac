//! Combat status query seam
//!
//! The hospital refuses transport for anyone mid-fight; it asks through
//! this trait instead of reaching into the combat engine.

use crate::core::types::{Timestamp, UserId};

pub trait CombatStatusQuery: Send + Sync {
    fn in_combat(&self, user: UserId, now: Timestamp) -> bool;
}

/// Query that always answers "not fighting"; standalone tooling and tests
#[derive(Debug, Default)]
pub struct NoCombat;

impl CombatStatusQuery for NoCombat {
    fn in_combat(&self, _user: UserId, _now: Timestamp) -> bool {
        false
    }
}
