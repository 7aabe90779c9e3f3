//! Stored item with its expiration timestamp.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Expiration value meaning "this item never expires".
pub const NO_EXPIRATION: i64 = 0;

/// A single cache item: the stored value and the moment it stops being valid.
///
/// The expiration is kept as microseconds since the Unix epoch rather than an
/// `Instant`, so a persistence backend can write items out and read them back
/// across process restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<E> {
    /// The stored value.
    pub(crate) object: E,

    /// Microseconds since the Unix epoch; [`NO_EXPIRATION`] means never.
    pub(crate) expiration: i64,
}

impl<E> Item<E> {
    /// Create an item with an explicit expiration timestamp.
    pub fn new(object: E, expiration: i64) -> Self {
        Self { object, expiration }
    }

    /// Create an item that never expires.
    pub fn persistent(object: E) -> Self {
        Self::new(object, NO_EXPIRATION)
    }

    /// Create an item that expires `ttl` from now.
    pub fn with_ttl(object: E, ttl: Duration) -> Self {
        Self::new(object, expiration_after(ttl))
    }

    /// Check if this item has expired.
    pub fn expired(&self) -> bool {
        self.expired_at(now_micros())
    }

    /// Check if this item has expired at a given time (microseconds).
    pub fn expired_at(&self, now: i64) -> bool {
        self.expiration != NO_EXPIRATION && now >= self.expiration
    }

    /// Mark the item as expired as of now without removing it.
    pub(crate) fn expire_now(&mut self) {
        self.expiration = now_micros();
    }

    /// Get a reference to the value.
    pub fn object(&self) -> &E {
        &self.object
    }

    /// Consume the item, returning the value.
    pub fn into_object(self) -> E {
        self.object
    }

    /// Get the raw expiration timestamp.
    pub fn expiration(&self) -> i64 {
        self.expiration
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
///
/// Never returns [`NO_EXPIRATION`], even with a clock set before 1970.
pub fn now_micros() -> i64 {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    micros.max(1)
}

/// Expiration timestamp for an item written now with the given TTL.
pub(crate) fn expiration_after(ttl: Duration) -> i64 {
    let ttl = i64::try_from(ttl.as_micros()).unwrap_or(i64::MAX);
    now_micros().saturating_add(ttl)
}
