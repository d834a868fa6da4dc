//! Per-key serialization for read-modify-write sequences.
//!
//! Operations on different keys run in parallel. Operations on the same key
//! queue behind one async mutex, which is dropped from the table once its last
//! holder or waiter goes away.
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

pub struct KeyedLocks<K> {
    slots: Arc<Mutex<HashMap<K, Slot>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder of `key` remains and returns a guard.
    pub async fn lock(&self, key: K) -> KeyGuard<K> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(key.clone()).or_default().clone()
        };
        let guard = slot.lock_owned().await;
        KeyGuard {
            key,
            slots: self.slots.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds a key until dropped.
pub struct KeyGuard<K>
where
    K: Eq + Hash,
{
    key: K,
    slots: Arc<Mutex<HashMap<K, Slot>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for KeyGuard<K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // Release the async mutex first so its Arc count only reflects the table
        // and any waiters.
        self.guard.take();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get(&self.key) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("key").await;
                assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(2)).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_slot_is_pruned_after_release() {
        let locks = KeyedLocks::new();
        {
            let _guard = locks.lock("a").await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }
}
