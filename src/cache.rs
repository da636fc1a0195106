//! Key to value lookup cache
//!
//! Owned by whoever performs expensive lookups (for example cube metadata
//! requests during record assembly), so repeated keys are resolved once.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::Result;

/// Memoising cache with hit/miss counters
#[derive(Debug, Clone)]
pub struct LookupCache<K, V> {
    entries: HashMap<K, V>,
    hits: usize,
    misses: usize,
}

impl<K, V> Default for LookupCache<K, V> {
    fn default() -> Self {
        LookupCache {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<K: Eq + Hash, V> LookupCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value, if present
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Store a value, returning the one it replaced
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Return the cached value or compute, store and return it
    ///
    /// A failed lookup is not cached, so the next call retries.
    pub fn get_or_try_insert_with<F>(&mut self, key: K, lookup: F) -> Result<&V>
    where
        F: FnOnce() -> Result<V>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let value = lookup()?;
                Ok(entry.insert(value))
            }
        }
    }

    /// Lookups served from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that had to be computed
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
