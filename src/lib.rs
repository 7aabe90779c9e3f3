//! # Expiring Map
//!
//! A generic, thread-safe, in-process key-value cache in which every entry
//! expires a fixed time after it was written.
//!
//! ## Features
//!
//! - **Generic values**: `Cache<E>` stores any `E`; misses are `None`
//! - **Lazy expiration**: expired entries read as absent immediately
//! - **Active expiration**: a background sweeper removes expired entries on a
//!   fixed interval, with an explicit start/stop lifecycle
//! - **Persistence hook**: hand the backing map to your own backend at
//!   construction to restore and save state
//! - **Thread-safe**: share across threads with `Clone` (uses `Arc` internally)
//!
//! ## Quick Start
//!
//! ```rust
//! use expiring_map::{Cache, CacheConfig};
//! use std::time::Duration;
//!
//! let config = CacheConfig::new()
//!     .expiration(Duration::from_secs(300))
//!     .gc_interval(Duration::from_secs(30))
//!     .build();
//!
//! let cache: Cache<String> = Cache::new(config).unwrap();
//!
//! cache.set("user:123", "Alice".to_string());
//! assert_eq!(cache.get("user:123"), Some("Alice".to_string()));
//!
//! // Read once, then hide it from everyone else
//! assert!(cache.get_and_expire("user:123").is_some());
//! assert!(cache.get("user:123").is_none());
//!
//! cache.stop_gc().unwrap();
//! ```
//!
//! ## Background sweeping
//!
//! Configuring an expiration starts the sweeper. It runs on its own thread
//! with its own runtime, so it works from sync and async code alike. Call
//! [`Cache::stop_gc`] and [`Cache::start_gc`] to control it by hand.

pub mod cache;
pub mod config;
pub mod error;
pub mod item;
pub mod persistence;
pub mod stats;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{BoxError, CacheError, CacheResult};
pub use item::{now_micros, Item, NO_EXPIRATION};
pub use persistence::{ItemMap, Persistence, SharedItems};
pub use stats::{CacheStats, StatsSnapshot};

// Internal modules - not part of public API
pub(crate) mod gc;
pub(crate) mod storage;
