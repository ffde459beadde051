//! Per-user mutual exclusion.
//!
//! Two tasks that can both mutate the same user's bot row or operation
//! lifecycle (a reversal's close-then-open, a concurrently firing monitor
//! close, a manual close) must not race. Every such critical section
//! acquires the user's guard first.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<RwLock<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.write().await;
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
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
    async fn same_user_is_serialized() {
        let locks = UserLocks::new();
        let guard = locks.acquire(1).await;

        let blocked = timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(blocked.is_err(), "second acquire must wait for the guard");

        drop(guard);
        let reacquired = timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _guard = locks.acquire(1).await;

        let other = timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(other.is_ok());
    }
}
