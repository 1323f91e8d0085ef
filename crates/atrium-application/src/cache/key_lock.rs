//! Per-key async lock table
//!
//! Each contended key gets a slot holding a `tokio` mutex and a count of the
//! tasks currently holding or waiting for it. The count is only touched under
//! the map's shard lock, and the slot is removed when it drops to zero, so the
//! table never grows beyond the set of keys in use.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug)]
struct Slot {
    mutex: Arc<Mutex<()>>,
    holders: usize,
}

type Slots = Arc<DashMap<String, Slot>>;

/// Registration of one task's interest in a slot; releases it on drop
#[derive(Debug)]
struct SlotRef {
    slots: Slots,
    key: String,
}

impl Drop for SlotRef {
    fn drop(&mut self) {
        let mut found = false;
        self.slots.remove_if_mut(&self.key, |_, slot| {
            found = true;
            if slot.holders == 0 {
                tracing::warn!(key = %self.key, "lock slot released more times than acquired");
            }
            slot.holders = slot.holders.saturating_sub(1);
            slot.holders == 0
        });
        if !found {
            tracing::warn!(key = %self.key, "lock slot missing on release");
        }
    }
}

/// Exclusive hold on one key; released exactly once when dropped
#[derive(Debug)]
#[must_use = "the key is unlocked as soon as the lease is dropped"]
pub struct KeyLease {
    // Field order matters: unlock before giving up the slot.
    _guard: OwnedMutexGuard<()>,
    slot: SlotRef,
}

impl KeyLease {
    /// Key this lease holds
    pub fn key(&self) -> &str {
        &self.slot.key
    }
}

/// Lazily populated table of per-key async locks
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct KeyLockTable {
    slots: Slots,
}

impl KeyLockTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(&self, key: &str) -> (Arc<Mutex<()>>, SlotRef) {
        let mutex = {
            let mut slot = self.slots.entry(key.to_string()).or_insert_with(|| Slot {
                mutex: Arc::new(Mutex::new(())),
                holders: 0,
            });
            slot.holders += 1;
            Arc::clone(&slot.mutex)
        };
        let slot = SlotRef {
            slots: Arc::clone(&self.slots),
            key: key.to_string(),
        };
        (mutex, slot)
    }

    /// Wait until `key` is free and take it
    ///
    /// Suspends the calling task; never blocks a thread. Dropping the future
    /// before it completes gives up the reservation.
    pub async fn acquire(&self, key: &str) -> KeyLease {
        let (mutex, slot) = self.reserve(key);
        let guard = mutex.lock_owned().await;
        KeyLease {
            _guard: guard,
            slot,
        }
    }

    /// Take `key` only if nobody holds it
    pub fn try_acquire(&self, key: &str) -> Option<KeyLease> {
        let (mutex, slot) = self.reserve(key);
        let guard = mutex.try_lock_owned().ok()?;
        Some(KeyLease {
            _guard: guard,
            slot,
        })
    }

    /// Whether some task holds or waits for `key`
    pub fn is_held(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no key is held or awaited
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
