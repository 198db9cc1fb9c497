//! Keyed async locks.
//!
//! Mutations that must not interleave for the same entity (one listing's
//! queue, one creator's instant payouts) take the entity's lock before
//! touching the store. Different keys proceed concurrently.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

/// A map of per-key `tokio::sync::Mutex`es, created on first use.
///
/// The outer map lock is held only long enough to clone the key's Arc;
/// the per-key lock is awaited outside it.
#[derive(Default)]
pub struct KeyedLocks<K> {
    inner: std::sync::Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `key`, inserting a fresh one if absent.
    pub fn key(&self, key: &K) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("keyed lock map poisoned");
        map.entry(key.clone()).or_default().clone()
    }
}
