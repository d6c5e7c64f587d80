//! Process-local memoisation
//!
//! Entries live for the whole process: nothing is evicted and nothing is
//! invalidated, so memory grows with the number of distinct keys. Both
//! users of this cache have a small, fixed key space (one CSV path, a
//! dozen tickers).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How entries leave the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    Never,
}

#[derive(Debug)]
pub struct UnboundedCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for UnboundedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> UnboundedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::Never
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        // a panic elsewhere cannot leave a half-written entry behind
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    /// Return the cached value or compute, store and return it. Errors are
    /// handed back without touching the cache.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
