//! Cache Store Module
//!
//! Process-wide key-value storage with absolute expiration and priority-aware
//! LRU compaction. The store owns its locking; callers share it through an
//! `Arc` and never coordinate access themselves.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, Priority};
use super::lru::LruTracker;
use super::stats::CacheStats;
use crate::error::{CatalogError, Result};

type StoredValue = Arc<dyn Any + Send + Sync>;

// == Cache Store ==
/// Thread-safe cache storage with TTL support.
#[derive(Debug)]
pub struct CacheStore {
    inner: Mutex<StoreInner>,
    clock: Arc<dyn Clock>,
    /// Entry count that triggers compaction
    max_entries: usize,
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<String, CacheEntry<StoredValue>>,
    /// One recency tracker per evictable priority
    lru: HashMap<Priority, LruTracker>,
    stats: CacheStats,
}

impl StoreInner {
    fn forget(&mut self, key: &str) -> Option<CacheEntry<StoredValue>> {
        let entry = self.entries.remove(key)?;
        if let Some(tracker) = self.lru.get_mut(&entry.priority) {
            tracker.remove(key);
        }
        Some(entry)
    }

    /// Evicts the least recently used entry of the lowest priority present.
    fn evict_one(&mut self) -> Option<String> {
        for priority in Priority::EVICTABLE {
            let key = self.lru.get_mut(&priority).and_then(LruTracker::evict_oldest);
            if let Some(key) = key {
                self.entries.remove(&key);
                self.stats.record_eviction();
                return Some(key);
            }
        }
        None
    }

    fn sync_total(&mut self) {
        let total = self.entries.len();
        self.stats.set_total_entries(total);
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store on the system clock.
    ///
    /// # Arguments
    /// * `max_entries` - Entry count at which the store starts evicting
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Creates a store that reads time from `clock`.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            clock,
            max_entries: max_entries.max(1),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // == Set ==
    /// Stores a value under `key`, replacing any previous entry.
    ///
    /// When a new key would exceed capacity, the least recently used entry of
    /// the lowest evictable priority is dropped first. If only `NeverRemove`
    /// entries remain the store grows past its limit.
    pub fn set<T>(&self, key: &str, value: T, ttl: Duration, sliding: Duration, priority: Priority)
    where
        T: Send + Sync + 'static,
    {
        let now = self.clock.now();
        let entry = CacheEntry::new(Arc::new(value) as StoredValue, now, ttl, sliding, priority);

        let mut inner = self.inner.lock();
        let is_overwrite = inner.forget(key).is_some();

        if !is_overwrite && inner.entries.len() >= self.max_entries {
            if let Some(evicted) = inner.evict_one() {
                debug!(key = %evicted, "Evicted entry to make room");
            }
        }

        if priority != Priority::NeverRemove {
            inner.lru.entry(priority).or_default().touch(key);
        }
        inner.entries.insert(key.to_string(), entry);
        inner.stats.record_store();
        inner.sync_total();
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Returns `Ok(None)` when nothing live is stored; an expired entry is
    /// removed on the way out. A value stored under a different type is a
    /// `CacheLayerFault`.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let state = inner
            .entries
            .get(key)
            .map(|entry| (entry.is_expired_at(now), entry.priority));
        let Some((expired, priority)) = state else {
            inner.stats.record_miss();
            return Ok(None);
        };

        if expired {
            inner.forget(key);
            inner.stats.record_expirations(1);
            inner.stats.record_miss();
            inner.sync_total();
            return Ok(None);
        }

        let value = inner
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned());

        match value {
            Some(value) => {
                inner.stats.record_hit();
                if let Some(tracker) = inner.lru.get_mut(&priority) {
                    tracker.touch(key);
                }
                Ok(Some(value))
            }
            None => {
                inner.stats.record_miss();
                Err(CatalogError::CacheLayerFault(format!(
                    "entry '{}' does not hold a {}",
                    key,
                    type_name::<T>()
                )))
            }
        }
    }

    /// Reads a live value without counting a hit or miss or touching recency.
    ///
    /// Used by administrative paths; a value of another type reads as `None`.
    pub fn peek<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();
        self.inner
            .lock()
            .entries
            .get(key)
            .filter(|entry| entry.is_live_at(now))
            .and_then(|entry| entry.value.downcast_ref::<T>().cloned())
    }

    // == Remove ==
    /// Deletes an entry. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.forget(key).is_some();
        inner.sync_total();
        removed
    }

    // == Contains Live ==
    /// Checks for a live entry without touching recency or counters.
    pub fn contains_live(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.inner
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_live_at(now))
    }

    /// Keys of all currently live entries.
    pub fn live_keys(&self) -> Vec<String> {
        let now = self.clock.now();
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_live_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut inner = self.inner.lock();
        inner.sync_total();
        inner.stats.clone()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.forget(key);
        }

        inner.stats.record_expirations(expired_keys.len());
        inner.sync_total();
        expired_keys.len()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
