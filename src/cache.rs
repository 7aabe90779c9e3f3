//! The main cache interface.
//!
//! This module provides the primary `Cache` type that users interact with.
//! It wraps the internal store and its expiry sweeper behind a cheap,
//! clonable handle.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::gc::GcController;
use crate::persistence::Persistence;
use crate::stats::StatsSnapshot;
use crate::storage::Store;

/// A thread-safe, in-memory map whose entries expire after a fixed TTL.
///
/// Cloning a `Cache` creates a new handle to the same underlying data. The
/// background sweeper, if running, stops once the last handle is dropped.
///
/// # Example
/// ```
/// use expiring_map::{Cache, CacheConfig};
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .expiration(Duration::from_secs(300))
///     .build();
///
/// let cache: Cache<u64> = Cache::new(config).unwrap();
///
/// cache.set("user:123", 42);
/// assert_eq!(cache.get("user:123"), Some(42));
///
/// // Add refuses to overwrite
/// assert!(cache.add("user:123", 7).is_err());
/// ```
#[derive(Debug)]
pub struct Cache<E> {
    store: Arc<Store<E>>,
    gc: Arc<GcController>,
}

impl<E> Clone for Cache<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gc: Arc::clone(&self.gc),
        }
    }
}

impl<E> Cache<E>
where
    E: Send + Sync + 'static,
{
    /// Create a new cache with the given configuration.
    ///
    /// The expiry sweeper is started when the configuration sets an
    /// expiration. Fails if persistence is enabled, since no backend is
    /// supplied; use [`Cache::with_persistence`] for that.
    ///
    /// # Example
    /// ```
    /// use expiring_map::{Cache, CacheConfig};
    ///
    /// let cache: Cache<String> = Cache::new(CacheConfig::default()).unwrap();
    /// assert!(!cache.is_gc_running());
    /// ```
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        if config.enable_persistence {
            return Err(CacheError::persistence(
                "persistence is enabled but no backend was supplied",
            ));
        }
        Self::build(config, None)
    }

    /// Create a new cache and hand its backing map to `backend`.
    ///
    /// The handoff only happens when the configuration enables persistence;
    /// with `enable_persistence(false)` the backend is never called and a
    /// warning is logged. The handoff runs before the sweeper is started, so
    /// the backend can preload items; an error from the backend aborts
    /// construction.
    ///
    /// # Example
    /// ```
    /// use expiring_map::{BoxError, Cache, CacheConfig, Item, SharedItems};
    ///
    /// let preload = |items: SharedItems<u32>| -> Result<(), BoxError> {
    ///     let mut map = items.write().map_err(|e| e.to_string())?;
    ///     map.insert("restored".to_string(), Item::persistent(1));
    ///     Ok(())
    /// };
    ///
    /// let config = CacheConfig::new().enable_persistence(true).build();
    /// let cache: Cache<u32> = Cache::with_persistence(config, &preload).unwrap();
    /// assert_eq!(cache.get("restored"), Some(1));
    /// ```
    pub fn with_persistence<P>(config: CacheConfig, backend: &P) -> CacheResult<Self>
    where
        P: Persistence<E>,
    {
        Self::build(config, Some(backend as &dyn Persistence<E>))
    }

    fn build(config: CacheConfig, backend: Option<&dyn Persistence<E>>) -> CacheResult<Self> {
        let cache = Self {
            store: Arc::new(Store::new(config.expiration)),
            gc: Arc::new(GcController::new(config.gc_interval)),
        };

        match (config.enable_persistence, backend) {
            (true, Some(backend)) => {
                backend
                    .attach(cache.store.shared_items())
                    .map_err(CacheError::Persistence)?;
                debug!(items = cache.len(), "Persistence backend attached");
            }
            (false, Some(_)) => {
                warn!("Persistence backend supplied but persistence is disabled, ignoring it");
            }
            _ => {}
        }

        if config.expiration.is_some() {
            cache.start_gc()?;
        }

        Ok(cache)
    }

    /// Start the background expiry sweeper.
    ///
    /// Fails with [`CacheError::GcAlreadyRunning`] if it is already running.
    pub fn start_gc(&self) -> CacheResult<()> {
        self.gc.start(Arc::downgrade(&self.store))
    }
}

impl<E> Cache<E> {
    /// Set a value, overwriting any existing item under `key`.
    ///
    /// The item expires after the configured TTL, or never.
    pub fn set(&self, key: impl Into<String>, value: E) {
        self.store.set(key.into(), value);
    }

    /// Set a value only if `key` is not in the map.
    ///
    /// A key whose item has expired but has not been swept yet still counts
    /// as present.
    ///
    /// # Example
    /// ```
    /// use expiring_map::{Cache, CacheConfig, CacheError};
    ///
    /// let cache = Cache::new(CacheConfig::default()).unwrap();
    /// cache.add("key", 1).unwrap();
    /// assert!(matches!(cache.add("key", 2), Err(CacheError::AlreadyExists(_))));
    /// assert_eq!(cache.get("key"), Some(1));
    /// ```
    pub fn add(&self, key: impl Into<String>, value: E) -> CacheResult<()> {
        self.store.add(key.into(), value)
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired. Expired items
    /// are not removed by this call.
    pub fn get(&self, key: &str) -> Option<E>
    where
        E: Clone,
    {
        self.store.get(key)
    }

    /// Get a value and remove it from the cache.
    pub fn get_and_delete(&self, key: &str) -> Option<E> {
        self.store.get_and_delete(key)
    }

    /// Get a value and mark its item expired.
    ///
    /// The item becomes invisible to later reads but keeps its slot until
    /// the next sweep. With the sweeper stopped it is only reclaimed by
    /// [`Cache::delete_expired`] or [`Cache::clear`].
    ///
    /// # Example
    /// ```
    /// use expiring_map::{Cache, CacheConfig};
    ///
    /// let cache = Cache::new(CacheConfig::default()).unwrap();
    /// cache.set("token", "abc");
    /// assert_eq!(cache.get_and_expire("token"), Some("abc"));
    /// assert_eq!(cache.get("token"), None);
    /// assert_eq!(cache.keys(), vec!["token".to_string()]);
    /// ```
    pub fn get_and_expire(&self, key: &str) -> Option<E>
    where
        E: Clone,
    {
        self.store.get_and_expire(key)
    }

    /// Delete a live item, returning its value.
    ///
    /// Expired items are reported as absent and left for the sweeper.
    pub fn delete(&self, key: &str) -> Option<E> {
        self.store.delete(key)
    }

    /// Check whether the item under `key` has expired.
    ///
    /// Fails with [`CacheError::NotFound`] if the key is not in the map.
    pub fn is_expired(&self, key: &str) -> CacheResult<bool> {
        self.store.is_expired(key)
    }

    /// Remove every expired item now.
    ///
    /// Returns the number of items removed. This is what the sweeper runs
    /// on every tick.
    pub fn delete_expired(&self) -> usize {
        self.store.delete_expired()
    }

    /// Remove all items, including those that never expire.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// All keys in the map, including expired items not yet swept.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Number of items in the map, including expired items not yet swept.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the map holds no items at all, expired or not.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Stop the background expiry sweeper.
    ///
    /// Returns immediately; the task exits on its next wake-up. Fails with
    /// [`CacheError::GcNotRunning`] if it is not running.
    pub fn stop_gc(&self) -> CacheResult<()> {
        self.gc.stop()
    }

    /// Check whether the background expiry sweeper is running.
    pub fn is_gc_running(&self) -> bool {
        self.gc.is_running()
    }

    /// Get a snapshot of the cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::item::Item;
    use crate::persistence::SharedItems;
    use std::sync::Mutex;
    use std::time::Duration;

    fn cache() -> Cache<String> {
        Cache::new(CacheConfig::default()).unwrap()
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = cache();

        cache.set("key", "value".to_string());
        assert_eq!(cache.get("key"), Some("value".to_string()));
        assert_eq!(cache.delete("key"), Some("value".to_string()));
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn test_cache_is_clone() {
        let cache1 = cache();
        cache1.set("key", "value".to_string());

        let cache2 = cache1.clone();

        // Both point to the same underlying data
        assert_eq!(cache2.get("key"), Some("value".to_string()));

        cache2.set("key2", "value2".to_string());
        assert_eq!(cache1.get("key2"), Some("value2".to_string()));
    }

    #[test]
    fn test_no_expiration_does_not_start_gc() {
        assert!(!cache().is_gc_running());
    }

    #[tokio::test]
    async fn test_expiration_starts_gc() {
        let config = CacheConfig::new().expiration(Duration::from_secs(1)).build();
        let cache: Cache<u8> = Cache::new(config).unwrap();
        assert!(cache.is_gc_running());

        cache.stop_gc().unwrap();
        assert!(!cache.is_gc_running());
    }

    #[test]
    fn test_persistence_without_backend_fails() {
        let config = CacheConfig::new().enable_persistence(true).build();
        let result: CacheResult<Cache<u8>> = Cache::new(config);
        assert!(matches!(result, Err(CacheError::Persistence(_))));
    }

    #[test]
    fn test_backend_error_aborts_construction() {
        let failing = |_: SharedItems<u8>| -> Result<(), BoxError> { Err("corrupt snapshot".into()) };
        let config = CacheConfig::new()
            .expiration(Duration::from_secs(1))
            .enable_persistence(true)
            .build();

        let err = Cache::<u8>::with_persistence(config, &failing).unwrap_err();
        assert_eq!(err.to_string(), "persistence error: corrupt snapshot");
    }

    #[test]
    fn test_backend_skipped_when_disabled() {
        let called = Mutex::new(false);
        let backend = |_: SharedItems<u8>| -> Result<(), BoxError> {
            *called.lock().unwrap() = true;
            Ok(())
        };

        let cache = Cache::<u8>::with_persistence(CacheConfig::default(), &backend).unwrap();
        assert!(!*called.lock().unwrap());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_backend_keeps_handle_after_clear() {
        let kept: Mutex<Option<SharedItems<u8>>> = Mutex::new(None);
        let backend = |items: SharedItems<u8>| -> Result<(), BoxError> {
            *kept.lock().unwrap() = Some(items);
            Ok(())
        };

        let config = CacheConfig::new().enable_persistence(true).build();
        let cache = Cache::<u8>::with_persistence(config, &backend).unwrap();
        cache.set("a", 1);
        cache.clear();
        cache.set("b", 2);

        let guard = kept.lock().unwrap();
        let snapshot = guard.as_ref().unwrap().read().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("b"), Some(&Item::persistent(2)));
    }

    #[test]
    fn test_cache_thread_safety() {
        use std::thread;

        let cache = cache();
        let mut handles = vec![];

        for i in 0..10 {
            let cache = cache.clone();
            let handle = thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key_{}", j);
                    cache.set(key.clone(), format!("value_{}_{}", i, j));
                    let _ = cache.get(&key);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 100);
    }
}
