//! LRU Tracker Module
//!
//! Recency tracking used when the store has to compact under capacity pressure.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Each touch stamps the key with a monotonically increasing tick; the
/// smallest tick is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Tick counter, bumped on every touch
    clock: u64,
    /// key -> last tick
    ticks: HashMap<String, u64>,
    /// tick -> key, oldest first
    order: BTreeMap<u64, String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        if let Some(previous) = self.ticks.insert(key.to_string(), self.clock) {
            self.order.remove(&previous);
        }
        self.order.insert(self.clock, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. No-op if absent.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
