//! Internal storage implementation for the cache.
//!
//! A single `IndexMap` behind one `RwLock`. Every mutating operation, and the
//! plain `get`, holds the write lock for its whole duration; only pure
//! membership reads (`is_expired`, `keys`, `len`) take the read lock.

use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::error::{CacheError, CacheResult};
use crate::item::{expiration_after, now_micros, Item, NO_EXPIRATION};
use crate::persistence::{ItemMap, SharedItems};
use crate::stats::CacheStats;

/// Thread-safe store of expiring items.
///
/// This is the internal implementation; users should use `Cache` instead.
#[derive(Debug)]
pub struct Store<E> {
    /// The backing map. Shared so a persistence backend can hold on to it.
    items: SharedItems<E>,

    /// TTL applied to every write; `None` means never expire.
    expiration: Option<Duration>,

    stats: Arc<CacheStats>,
}

impl<E> Store<E> {
    /// Create an empty store applying `expiration` to every write.
    pub fn new(expiration: Option<Duration>) -> Self {
        Self {
            items: Arc::default(),
            expiration,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Handle to the backing map, for the persistence handoff.
    pub fn shared_items(&self) -> SharedItems<E> {
        Arc::clone(&self.items)
    }

    /// Insert or overwrite `key`.
    pub fn set(&self, key: String, value: E) {
        let item = Item::new(value, self.next_expiration());
        self.write_lock().insert(key, item);
        self.stats.record_set();
    }

    /// Insert `key` only if it is not in the map at all.
    pub fn add(&self, key: String, value: E) -> CacheResult<()> {
        let mut items = self.write_lock();
        if items.contains_key(&key) {
            return Err(CacheError::AlreadyExists(key));
        }
        items.insert(key, Item::new(value, self.next_expiration()));
        self.stats.record_set();
        Ok(())
    }

    /// Look up a live item.
    pub fn get(&self, key: &str) -> Option<E>
    where
        E: Clone,
    {
        let items = self.write_lock();
        let value = live(&items, key).map(|item| item.object.clone());
        self.record_lookup(value.is_some());
        value
    }

    /// Look up a live item and remove it.
    pub fn get_and_delete(&self, key: &str) -> Option<E> {
        let value = self.remove_live(key);
        self.record_lookup(value.is_some());
        value
    }

    /// Look up a live item and mark it expired, leaving it in the map.
    pub fn get_and_expire(&self, key: &str) -> Option<E>
    where
        E: Clone,
    {
        let mut items = self.write_lock();
        let value = match items.get_mut(key) {
            Some(item) if !item.expired() => {
                item.expire_now();
                Some(item.object.clone())
            }
            _ => None,
        };
        self.record_lookup(value.is_some());
        value
    }

    /// Remove a live item. Expired items are left for the sweeper.
    pub fn delete(&self, key: &str) -> Option<E> {
        self.remove_live(key)
    }

    /// Whether `key` is expired; `NotFound` if it is not in the map.
    pub fn is_expired(&self, key: &str) -> CacheResult<bool> {
        self.read_lock()
            .get(key)
            .map(Item::expired)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Remove every expired item. Returns how many were removed.
    pub fn delete_expired(&self) -> usize {
        let mut items = self.write_lock();
        let before = items.len();
        let now = now_micros();
        items.retain(|_, item| !item.expired_at(now));

        let removed = before - items.len();
        self.stats.record_expirations(removed as u64);
        removed
    }

    /// Drop every item, including those that never expire.
    pub fn clear(&self) {
        *self.write_lock() = ItemMap::default();
    }

    /// All keys in the map, expired-but-unpurged ones included.
    pub fn keys(&self) -> Vec<String> {
        self.read_lock().keys().cloned().collect()
    }

    /// Number of items in the map, expired-but-unpurged ones included.
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Check if the map holds no items, expired or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared handle to the operation counters.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    // Private helper methods

    fn next_expiration(&self) -> i64 {
        match self.expiration {
            Some(ttl) => expiration_after(ttl),
            None => NO_EXPIRATION,
        }
    }

    fn remove_live(&self, key: &str) -> Option<E> {
        let mut items = self.write_lock();
        live(&items, key)?;
        let (_, item) = items.swap_remove_entry(key)?;
        self.stats.record_delete();
        Some(item.into_object())
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
    }

    /// Acquire the read lock. A poisoned lock is recovered: a panicking
    /// writer can at worst leave one key's item half-written, never the map.
    fn read_lock(&self) -> RwLockReadGuard<'_, ItemMap<E>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ItemMap<E>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn live<'a, E>(items: &'a ItemMap<E>, key: &str) -> Option<&'a Item<E>> {
    items.get(key).filter(|item| !item.expired())
}
