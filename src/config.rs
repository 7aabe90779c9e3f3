//! Configuration for the expiring map.
//!
//! This module provides a builder for the construction-time options: the
//! default expiration, the sweep interval, and whether a persistence backend
//! is attached. None of these can change once the cache is built.

use std::time::Duration;

/// Default period between background sweeps.
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest sweep period accepted; smaller values are raised to this.
pub const MIN_GC_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for creating a new cache instance.
///
/// Use the builder pattern to construct configuration:
///
/// ```
/// use expiring_map::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .expiration(Duration::from_secs(300))
///     .gc_interval(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied to every write.
    /// `None` means items never expire and the sweeper is not auto-started.
    pub(crate) expiration: Option<Duration>,

    /// Period of the background sweeper.
    pub(crate) gc_interval: Duration,

    /// Hand the backing map to a persistence backend at construction.
    pub(crate) enable_persistence: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration: None,
            gc_interval: DEFAULT_GC_INTERVAL,
            enable_persistence: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL applied to every write.
    ///
    /// Set to `Duration::ZERO` for items that never expire.
    pub fn expiration(mut self, ttl: Duration) -> Self {
        self.expiration = if ttl.is_zero() { None } else { Some(ttl) };
        self
    }

    /// Set the interval between background sweeps of expired items.
    pub fn gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval.max(MIN_GC_INTERVAL);
        self
    }

    /// Enable or disable the persistence handoff at construction.
    pub fn enable_persistence(mut self, enabled: bool) -> Self {
        self.enable_persistence = enabled;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Get the default TTL, if set.
    pub fn get_expiration(&self) -> Option<Duration> {
        self.expiration
    }

    /// Get the sweep interval.
    pub fn get_gc_interval(&self) -> Duration {
        self.gc_interval
    }

    /// Whether persistence is enabled.
    pub fn persistence_enabled(&self) -> bool {
        self.enable_persistence
    }
}
