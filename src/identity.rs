//! Identity provider boundary
//!
//! The chat platform owns accounts; the engines only need a display name
//! and the player/bot distinction (bots cannot be attacked or treated).

use crate::core::types::UserId;
use ahash::AHashMap;
use std::sync::RwLock;

pub trait IdentityProvider: Send + Sync {
    fn display_name(&self, user: UserId) -> String;

    /// False for service accounts (bots); they have no vitality
    fn is_player(&self, user: UserId) -> bool;
}

/// In-memory directory; unknown ids are treated as players with a
/// synthesized name, matching create-on-first-reference elsewhere
#[derive(Default)]
pub struct Directory {
    entries: RwLock<AHashMap<UserId, DirectoryEntry>>,
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    name: String,
    player: bool,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_player(&self, user: UserId, name: &str) {
        let mut entries = self.entries.write().expect("directory poisoned");
        entries.insert(
            user,
            DirectoryEntry {
                name: name.to_string(),
                player: true,
            },
        );
    }

    pub fn register_bot(&self, user: UserId, name: &str) {
        let mut entries = self.entries.write().expect("directory poisoned");
        entries.insert(
            user,
            DirectoryEntry {
                name: name.to_string(),
                player: false,
            },
        );
    }
}

impl IdentityProvider for Directory {
    fn display_name(&self, user: UserId) -> String {
        let entries = self.entries.read().expect("directory poisoned");
        entries
            .get(&user)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("User {}", user))
    }

    fn is_player(&self, user: UserId) -> bool {
        let entries = self.entries.read().expect("directory poisoned");
        entries.get(&user).map(|e| e.player).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bots_are_not_players() {
        let directory = Directory::new();
        directory.register_player(UserId(1), "Alice");
        directory.register_bot(UserId(2), "MarketBot");

        assert!(directory.is_player(UserId(1)));
        assert!(!directory.is_player(UserId(2)));
        assert_eq!(directory.display_name(UserId(2)), "MarketBot");
        assert_eq!(directory.display_name(UserId(3)), "User 3");
    }
}
