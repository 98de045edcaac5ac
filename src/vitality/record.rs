//! Per-character vitality record
//!
//! Health may go negative: zero and below is unconscious, and further
//! damage while down deepens the deficit. Records are never deleted and
//! are created with defaults on first reference.

use crate::core::types::UserId;
use serde::{Deserialize, Serialize};

/// d20-convention ability modifier: (score - 10) / 2, rounded down
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitality {
    pub user_id: UserId,
    /// Current health; negative values are allowed
    pub health: i32,
    pub constitution: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub level: i32,
}

impl Vitality {
    /// Fresh record for a first-time participant
    pub fn new(user_id: UserId) -> Self {
        let mut v = Self {
            user_id,
            health: 0,
            constitution: 10,
            strength: 10,
            dexterity: 10,
            level: 1,
        };
        v.health = v.max_health();
        v
    }

    /// Derived cap: 10 + con modifier per level, never below level
    pub fn max_health(&self) -> i32 {
        (10 + ability_modifier(self.constitution) * self.level).max(self.level)
    }

    pub fn is_conscious(&self) -> bool {
        self.health > 0
    }

    pub fn strength_modifier(&self) -> i32 {
        ability_modifier(self.strength)
    }

    pub fn dex_modifier(&self) -> i32 {
        ability_modifier(self.dexterity)
    }

    /// To-hit bonus: strength modifier plus half level
    pub fn attack_bonus(&self) -> i32 {
        self.strength_modifier() + self.level / 2
    }

    /// Armor class the attacker must meet or beat
    pub fn armor_class(&self) -> i32 {
        10 + self.dex_modifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_rounds_toward_negative_infinity() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
    }

    #[test]
    fn new_record_starts_at_full_health() {
        let v = Vitality::new(UserId(7));
        assert_eq!(v.health, v.max_health());
        assert!(v.is_conscious());
    }

    #[test]
    fn max_health_never_drops_below_level() {
        let mut v = Vitality::new(UserId(7));
        v.constitution = 1;
        v.level = 3;
        assert_eq!(v.max_health(), 3);
    }
}
