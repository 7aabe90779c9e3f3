//! Error types for the expiring map.
//!
//! Every fallible operation returns a [`CacheError`]. Nothing here is fatal:
//! the cache stays usable after any returned error, except a failed
//! construction, which yields no cache at all.

use std::io;

use thiserror::Error;

/// Boxed error produced by a persistence backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// `add` was called with a key that is already in the map,
    /// live or expired-but-unpurged.
    #[error("key already exists: '{0}'")]
    AlreadyExists(String),

    /// The key has never been set (or has been removed).
    #[error("key not found: '{0}'")]
    NotFound(String),

    /// `start_gc` was called while the sweeper is running.
    #[error("expiry sweeper is already running")]
    GcAlreadyRunning,

    /// `stop_gc` was called while the sweeper is stopped.
    #[error("expiry sweeper is not running")]
    GcNotRunning,

    /// The persistence backend failed while attaching to the store.
    #[error("persistence error: {0}")]
    Persistence(#[source] BoxError),

    /// The background sweeper thread could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CacheError {
    pub(crate) fn persistence(err: impl Into<BoxError>) -> Self {
        CacheError::Persistence(err.into())
    }
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
