//! Reaction windows
//!
//! A qualifying hit opens a window for the defender: retaliate or flee
//! before expiry, or an automatic counter-attack fires. At most one
//! window per defender; a newer hit supersedes the old window. Only OPEN
//! windows are stored; resolution removes the record and returns it with
//! its terminal state stamped.

use crate::combat::query::CombatStatusQuery;
use crate::core::types::{Timestamp, UserId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    Open,
    /// Defender attacked before expiry
    ResolvedManual,
    /// Expiry reached with a conscious, idle defender
    ResolvedAuto,
    /// Defender fled
    Retreated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionWindow {
    pub defender: UserId,
    pub attacker: UserId,
    pub opened_at: Timestamp,
    pub expires_at: Timestamp,
    pub state: WindowState,
}

#[derive(Default)]
pub struct ReactionWindows {
    // Keyed by defender: the "at most one per defender" invariant is the
    // map structure itself.
    windows: RwLock<AHashMap<UserId, ReactionWindow>>,
}

impl ReactionWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window, superseding any prior one for this defender
    pub fn open(&self, defender: UserId, attacker: UserId, now: Timestamp, expires_at: Timestamp) {
        let mut windows = self.windows.write().expect("reaction windows poisoned");
        windows.insert(
            defender,
            ReactionWindow {
                defender,
                attacker,
                opened_at: now,
                expires_at,
                state: WindowState::Open,
            },
        );
    }

    pub fn get(&self, defender: UserId) -> Option<ReactionWindow> {
        let windows = self.windows.read().expect("reaction windows poisoned");
        windows.get(&defender).cloned()
    }

    /// Close the defender's window with a terminal state, returning it
    pub fn resolve(&self, defender: UserId, state: WindowState) -> Option<ReactionWindow> {
        let mut windows = self.windows.write().expect("reaction windows poisoned");
        windows.remove(&defender).map(|mut w| {
            w.state = state;
            w
        })
    }

    /// Remove and return every window past its expiry
    pub fn take_expired(&self, now: Timestamp) -> Vec<ReactionWindow> {
        let mut windows = self.windows.write().expect("reaction windows poisoned");
        let expired: Vec<UserId> = windows
            .values()
            .filter(|w| w.expires_at <= now)
            .map(|w| w.defender)
            .collect();
        expired
            .into_iter()
            .filter_map(|d| windows.remove(&d))
            .collect()
    }

    /// Is `user` on either side of a live window?
    pub fn involving(&self, user: UserId, now: Timestamp) -> bool {
        let windows = self.windows.read().expect("reaction windows poisoned");
        windows
            .values()
            .any(|w| w.expires_at > now && (w.defender == user || w.attacker == user))
    }

    /// The live opponent of `user`, if any
    pub fn opponent_of(&self, user: UserId, now: Timestamp) -> Option<UserId> {
        let windows = self.windows.read().expect("reaction windows poisoned");
        windows.values().find_map(|w| {
            if w.expires_at <= now {
                None
            } else if w.defender == user {
                Some(w.attacker)
            } else if w.attacker == user {
                Some(w.defender)
            } else {
                None
            }
        })
    }
}

impl CombatStatusQuery for ReactionWindows {
    fn in_combat(&self, user: UserId, now: Timestamp) -> bool {
        self.involving(user, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_window_per_defender_newest_wins() {
        let windows = ReactionWindows::new();
        let defender = UserId(1);
        windows.open(defender, UserId(2), 10, 16);
        windows.open(defender, UserId(3), 12, 18);

        let w = windows.get(defender).unwrap();
        assert_eq!(w.attacker, UserId(3));
        assert_eq!(w.expires_at, 18);
    }

    #[test]
    fn resolve_removes_and_stamps_state() {
        let windows = ReactionWindows::new();
        windows.open(UserId(1), UserId(2), 10, 16);

        let w = windows.resolve(UserId(1), WindowState::Retreated).unwrap();
        assert_eq!(w.state, WindowState::Retreated);
        assert!(windows.get(UserId(1)).is_none());
        assert!(windows.resolve(UserId(1), WindowState::Retreated).is_none());
    }

    #[test]
    fn involvement_covers_both_sides_until_expiry() {
        let windows = ReactionWindows::new();
        windows.open(UserId(1), UserId(2), 10, 16);

        assert!(windows.involving(UserId(1), 12));
        assert!(windows.involving(UserId(2), 12));
        assert!(!windows.involving(UserId(3), 12));
        assert!(!windows.involving(UserId(1), 16));
    }

    #[test]
    fn take_expired_returns_only_elapsed_windows() {
        let windows = ReactionWindows::new();
        windows.open(UserId(1), UserId(2), 10, 16);
        windows.open(UserId(3), UserId(4), 10, 30);

        let expired = windows.take_expired(20);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].defender, UserId(1));
        assert!(windows.get(UserId(3)).is_some());
    }
}
