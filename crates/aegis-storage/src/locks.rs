//! Per-key async locks
//!
//! Operations on the same key queue behind one `tokio::sync::Mutex`;
//! different keys never contend. Slots are created on demand and removed
//! once the last holder or waiter is gone, so the registry only holds keys
//! that are currently in use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;

type Slots = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// Registry of named async locks
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Slots,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        let slot = {
            let mut slots = registry(&self.slots);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let guard = slot.lock_owned().await;
        KeyedGuard {
            key: key.to_string(),
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
        }
    }

    /// Number of keys currently held or awaited
    pub fn active(&self) -> usize {
        registry(&self.slots).len()
    }
}

// The map is only mutated in short, panic-free sections; a poisoned lock
// still holds a consistent map.
fn registry(slots: &Slots) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive access to one key; released on drop
#[derive(Debug)]
pub struct KeyedGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    slots: Slots,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = registry(&self.slots);
        let unused = slots
            .get(&self.key)
            .map(|slot| Arc::strong_count(slot) == 1)
            .unwrap_or(false);
        if unused {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_slot_released_after_drop() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock("entity/vendor/a").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_same_key_waits() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock("a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.active(), 0);
    }
}
