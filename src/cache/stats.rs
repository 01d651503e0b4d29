//! Cache Statistics Module
//!
//! Tracks cache counters and the per-kind breakdown of live entries.

use std::collections::BTreeMap;

use serde::Serialize;

use super::keys::EntityKind;

// == Cache Stats ==
/// Counters maintained by the cache store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a live entry
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Entries written
    pub stores: u64,
    /// Entries evicted by capacity compaction
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries held, live or not yet swept
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Cache Report ==
/// Diagnostic readout combining store counters with orchestrator data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Upstream fetches that failed during get-or-populate
    pub fetch_failures: u64,
    /// Live entries per entity kind
    pub live_by_kind: BTreeMap<EntityKind, usize>,
    pub hit_rate: f64,
}

impl CacheReport {
    /// Builds a report, counting live keys by the kind encoded in each key.
    pub fn new<'a>(
        stats: CacheStats,
        fetch_failures: u64,
        live_keys: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut live_by_kind: BTreeMap<EntityKind, usize> =
            EntityKind::ALL.into_iter().map(|kind| (kind, 0)).collect();
        for key in live_keys {
            if let Some(kind) = EntityKind::of_key(key) {
                *live_by_kind.entry(kind).or_default() += 1;
            }
        }

        Self {
            hit_rate: stats.hit_rate(),
            stats,
            fetch_failures,
            live_by_kind,
        }
    }

    /// Total live entries across all kinds.
    pub fn live_total(&self) -> usize {
        self.live_by_kind.values().sum()
    }
}
