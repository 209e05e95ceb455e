//! Per-key advisory locks.
//!
//! Serializes validate-then-write sequences that touch the same inventory
//! keys. The registry holds a set of currently locked keys; an acquire blocks
//! until every requested key is free and then takes all of them in one step,
//! which rules out the partial-acquisition deadlocks of lock-per-key
//! mutexes. Commits touching disjoint key sets proceed in parallel.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use stockbook_ledger::InventoryKey;

/// Advisory lock set over normalized inventory keys.
#[derive(Debug, Default)]
pub struct KeyLockRegistry {
    held: Mutex<HashSet<InventoryKey>>,
    released: Condvar,
}

impl KeyLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until all `keys` are free, then acquire them atomically.
    ///
    /// The guard releases the keys on drop. Duplicate keys in the input are
    /// acquired once.
    pub fn lock(&self, keys: impl IntoIterator<Item = InventoryKey>) -> KeyLockGuard<'_> {
        let keys: HashSet<InventoryKey> = keys.into_iter().collect();

        let mut held = self
            .held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            if keys.is_disjoint(&held) {
                held.extend(keys.iter().cloned());
                return KeyLockGuard {
                    registry: self,
                    keys,
                };
            }
            held = self
                .released
                .wait(held)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Whether a key is currently locked. Test/diagnostic helper.
    pub fn is_locked(&self, key: &InventoryKey) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(key))
            .unwrap_or(false)
    }
}

/// Holds a set of acquired keys; dropping it releases them.
#[derive(Debug)]
pub struct KeyLockGuard<'a> {
    registry: &'a KeyLockRegistry,
    keys: HashSet<InventoryKey>,
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        let mut held = self
            .registry
            .held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for key in &self.keys {
            held.remove(key);
        }
        self.registry.released.notify_all();
    }
}
