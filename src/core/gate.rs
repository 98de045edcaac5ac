//! Per-user mutual exclusion
//!
//! A live attack command, the hospital cycle, and the stabilization roll
//! loop can all touch the same user's records within the same second.
//! Every read-modify-write sequence over a user's vitality, stabilization,
//! admission, or financial records runs inside that user's gate.
//!
//! Cross-engine calls made while a gate is held (attack signalling
//! stabilization, the cycle charging the ledger) must use the ungated
//! engine internals; the gates are not reentrant.

use crate::core::types::UserId;
use ahash::AHashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per user, created on first use
#[derive(Default)]
pub struct UserGates {
    gates: Mutex<AHashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserGates {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, user: UserId) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock().expect("gate registry poisoned");
        gates
            .entry(user)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Enter one user's exclusion scope
    pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<()> {
        self.gate(user).lock_owned().await
    }

    /// Enter two users' scopes, always in id order so concurrent attacks
    /// between the same pair cannot deadlock
    pub async fn lock_pair(
        &self,
        a: UserId,
        b: UserId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b, "lock_pair requires distinct users");
        if a < b {
            let first = self.gate(a).lock_owned().await;
            let second = self.gate(b).lock_owned().await;
            (first, second)
        } else {
            let first = self.gate(b).lock_owned().await;
            let second = self.gate(a).lock_owned().await;
            (first, second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_user_gate_is_exclusive() {
        let gates = Arc::new(UserGates::new());
        let guard = gates.lock(UserId(1)).await;
        assert!(gates.gate(UserId(1)).try_lock().is_err());
        drop(guard);
        assert!(gates.gate(UserId(1)).try_lock().is_ok());
    }

    #[tokio::test]
    async fn pair_lock_is_order_independent() {
        let gates = Arc::new(UserGates::new());
        let (a, b) = gates.lock_pair(UserId(2), UserId(1)).await;
        drop((a, b));
        let (a, b) = gates.lock_pair(UserId(1), UserId(2)).await;
        drop((a, b));
    }
}
