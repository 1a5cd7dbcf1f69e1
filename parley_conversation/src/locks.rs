//! Per-user serialization of store read-modify-write cycles.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle entries are dropped once the map grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per user id.
///
/// Holding a user's guard ensures no other handler for that user reads or
/// writes the store until it is released. Different users never contend.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= PRUNE_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(user_id).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_user_waits_for_release() {
        let locks = UserLocks::new();
        let guard = locks.acquire(1).await;

        let blocked = timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _first = locks.acquire(1).await;

        let other = timeout(Duration::from_millis(20), locks.acquire(2)).await;
        assert!(other.is_ok());
    }
}
