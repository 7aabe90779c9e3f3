//! Hook for loading and saving the backing map.
//!
//! The cache owns no file format. When persistence is enabled, construction
//! hands a shared handle to the backing map to a [`Persistence`] backend
//! exactly once. The backend may fill the map from durable storage right
//! away and may keep the handle to write it out later.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::error::BoxError;
use crate::item::Item;

/// The map type that backs a cache.
pub type ItemMap<E> = IndexMap<String, Item<E>>;

/// Shared handle to a cache's backing map.
///
/// Backends must hold the lock only briefly: the same lock serializes every
/// cache operation.
pub type SharedItems<E> = Arc<RwLock<ItemMap<E>>>;

/// A persistence backend.
pub trait Persistence<E>: Send + Sync {
    /// Attach to the backing map of a cache under construction.
    ///
    /// An error aborts construction and is returned to the caller as
    /// [`CacheError::Persistence`](crate::CacheError::Persistence).
    fn attach(&self, items: SharedItems<E>) -> Result<(), BoxError>;
}

impl<E, F> Persistence<E> for F
where
    F: Fn(SharedItems<E>) -> Result<(), BoxError> + Send + Sync,
{
    fn attach(&self, items: SharedItems<E>) -> Result<(), BoxError> {
        self(items)
    }
}
