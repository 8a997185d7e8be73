//! Compute-once memoisation caches keyed by degrees.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;

/// An append-only memoisation map whose entries are computed at most once.
///
/// The map itself is only locked for the lookup of a key's slot. The value in a slot is computed
/// outside that lock, and concurrent first requests for the same key block on the slot until the
/// first computation finishes, so an expensive value is never computed twice.
#[derive(Debug)]
pub(crate) struct ComputeOnceCache<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K, V> Default for ComputeOnceCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> ComputeOnceCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, computing it with `compute` if it is not yet present.
    pub(crate) fn get_or_compute<F>(&self, key: &K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        slot.get_or_init(compute).clone()
    }

    /// Returns the number of keys whose values have been computed.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns `true` if the value for `key` has already been computed.
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(false, |slot| slot.get().is_some())
    }
}
