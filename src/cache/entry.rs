//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with absolute expiration.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

// == Priority ==
/// Eviction priority used when the store compacts under capacity pressure.
///
/// Lower priorities are evicted first; `NeverRemove` entries are only removed
/// by expiry or explicit invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    Low,
    Normal,
    High,
    NeverRemove,
}

impl Priority {
    /// Priorities that compaction may evict, lowest first.
    pub const EVICTABLE: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];
}

// == Cache Entry ==
/// A cached value with its expiration metadata.
///
/// Entries never mutate; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// When the entry was stored
    pub created_at: DateTime<Utc>,
    /// Absolute expiration: `created_at + ttl`
    pub expires_at: DateTime<Utc>,
    /// Sliding renewal window. Recorded only; it never extends validity.
    pub sliding_window: Duration,
    pub priority: Priority,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stored at `now` that lives for `ttl`.
    pub fn new(
        value: T,
        now: DateTime<Utc>,
        ttl: Duration,
        sliding_window: Duration,
        priority: Priority,
    ) -> Self {
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
            sliding_window,
            priority,
        }
    }

    // == Is Live ==
    /// Checks whether the entry may still be served at `now`.
    ///
    /// Boundary condition: an entry stops being live at exactly `expires_at`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Inverse of [`CacheEntry::is_live_at`].
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now)
    }
}
