//! Cache Orchestrator Module
//!
//! Get-or-populate over the cache store, one entry point per entity kind, plus
//! targeted and bulk invalidation.
//!
//! The orchestrator never surfaces a fault to its caller. A miss that upstream
//! cannot satisfy, an upstream failure and a cache-layer fault all end as
//! `None` (or an empty list); they differ only in how they are logged.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use super::keys::{self, EntityKind};
use super::stats::CacheReport;
use super::store::CacheStore;
use crate::error::UpstreamResult;
use crate::models::{CatalogItem, ItemReference, SpeciesInfo};
use crate::upstream::{CatalogApi, MIN_SEARCH_LEN};

/// Treats an empty upstream list as "nothing to cache".
fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

// == Cache Orchestrator ==
/// Caching front for the upstream catalog.
pub struct CacheOrchestrator {
    store: Arc<CacheStore>,
    api: Arc<dyn CatalogApi>,
    /// Highest id covered by [`CacheOrchestrator::invalidate_all`]
    sweep_max_id: u32,
    fetch_failures: AtomicU64,
}

impl CacheOrchestrator {
    /// Creates an orchestrator over an explicitly owned store.
    pub fn new(store: Arc<CacheStore>, api: Arc<dyn CatalogApi>, sweep_max_id: u32) -> Self {
        Self {
            store,
            api,
            sweep_max_id,
            fetch_failures: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    // == Get Or Fetch ==
    /// Serves `key` from the store, or runs `fetch` and stores its result.
    ///
    /// Returns `None` when upstream has no such entity or the fetch failed.
    /// Absent results are never cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, kind: EntityKind, fetch: F) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = UpstreamResult<Option<T>>>,
    {
        self.fetch_through(key, kind, fetch).await.unwrap_or(None)
    }

    /// Same sequence as [`CacheOrchestrator::get_or_fetch`], but hands the
    /// upstream error back so callers can phrase a user-facing message.
    ///
    /// The error is already logged and counted when this returns.
    pub async fn fetch_through<T, F, Fut>(
        &self,
        key: &str,
        kind: EntityKind,
        fetch: F,
    ) -> UpstreamResult<Option<T>>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = UpstreamResult<Option<T>>>,
    {
        match self.store.get::<T>(key) {
            Ok(Some(value)) => {
                debug!(key, %kind, "Cache hit");
                return Ok(Some(value));
            }
            Ok(None) => info!(key, %kind, "Cache miss, fetching from catalog"),
            Err(e) => {
                error!(key, %kind, error = %e, "Cache layer fault, treating as miss");
                self.store.remove(key);
            }
        }

        match fetch().await {
            Ok(Some(value)) => {
                self.store.set(
                    key,
                    value.clone(),
                    kind.ttl(),
                    kind.sliding_window(),
                    kind.priority(),
                );
                info!(key, %kind, ttl_minutes = kind.ttl().num_minutes(), "Stored in cache");
                Ok(Some(value))
            }
            Ok(None) => {
                info!(key, %kind, "Not found upstream, nothing cached");
                Ok(None)
            }
            Err(e) => {
                self.fetch_failures.fetch_add(1, Ordering::Relaxed);
                error!(key, %kind, error = %e, "Catalog fetch failed, nothing cached");
                Err(e)
            }
        }
    }

    // == Per-Kind Accessors ==
    /// Item detail by id (30 minute TTL).
    pub async fn item(&self, id: u32) -> Option<CatalogItem> {
        self.get_or_fetch(&keys::item_by_id(id), EntityKind::Item, || {
            self.api.fetch_item(id)
        })
        .await
    }

    /// Item detail by exact name.
    ///
    /// A hit upstream is also stored under the item's id key.
    pub async fn item_by_name(&self, name: &str) -> UpstreamResult<Option<CatalogItem>> {
        let key = keys::item_by_name(name);
        let normalized = name.trim().to_lowercase();
        let item = self
            .fetch_through(&key, EntityKind::Item, || {
                self.api.fetch_item_by_name(&normalized)
            })
            .await?;

        if let Some(item) = &item {
            let id_key = keys::item_by_id(item.id);
            if !self.store.contains_live(&id_key) {
                let kind = EntityKind::Item;
                self.store.set(
                    &id_key,
                    item.clone(),
                    kind.ttl(),
                    kind.sliding_window(),
                    kind.priority(),
                );
            }
        }
        Ok(item)
    }

    /// Species detail by id (1 hour TTL).
    pub async fn species(&self, id: u32) -> Option<SpeciesInfo> {
        self.get_or_fetch(&keys::species_by_id(id), EntityKind::Species, || {
            self.api.fetch_species(id)
        })
        .await
    }

    /// Category names (6 hour TTL). Empty when unavailable.
    pub async fn category_list(&self) -> Vec<String> {
        self.get_or_fetch(&keys::category_list(), EntityKind::Category, || async {
            self.api.fetch_category_list().await.map(non_empty)
        })
        .await
        .unwrap_or_default()
    }

    /// Full membership of one category (6 hour TTL).
    pub async fn category_members(
        &self,
        category: &str,
    ) -> UpstreamResult<Option<Vec<ItemReference>>> {
        let normalized = category.trim().to_lowercase();
        self.fetch_through(
            &keys::category_members(category),
            EntityKind::Category,
            || async {
                let members = self.api.fetch_category_members(&normalized).await?;
                Ok(members.and_then(non_empty))
            },
        )
        .await
    }

    /// Names starting with `query` (15 minute TTL).
    ///
    /// Queries shorter than two characters return nothing without a fetch.
    pub async fn search(&self, query: &str) -> Vec<String> {
        let normalized = query.trim().to_lowercase();
        if normalized.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        self.get_or_fetch(&keys::search(&normalized), EntityKind::Search, || async {
            self.api.search_names_by_prefix(&normalized).await.map(non_empty)
        })
        .await
        .unwrap_or_default()
    }

    // == Invalidation ==
    /// Removes one entry. Idempotent; returns whether an entry was present.
    pub fn invalidate(&self, key: &str, kind: EntityKind) -> bool {
        let removed = self.store.remove(key);
        info!(key, %kind, removed, "Cache entry invalidated");
        removed
    }

    /// Drops every entry describing item `id`: the id key, the species key and,
    /// when the cached item names it, the exact-name key. Returns the count.
    pub fn invalidate_item(&self, id: u32) -> usize {
        let id_key = keys::item_by_id(id);
        let name_key = self
            .store
            .peek::<CatalogItem>(&id_key)
            .map(|item| keys::item_by_name(&item.name));

        let mut removed = usize::from(self.invalidate(&id_key, EntityKind::Item));
        if let Some(name_key) = name_key {
            removed += usize::from(self.invalidate(&name_key, EntityKind::Item));
        }
        let species_key = keys::species_by_id(id);
        removed += usize::from(self.invalidate(&species_key, EntityKind::Species));
        removed
    }

    /// Drops the category entries and every item and species entry with an
    /// id in `1..=sweep_max_id`.
    ///
    /// This is a best-effort sweep: ids above the bound, name-keyed item
    /// entries and search results are left in place. Returns the number of
    /// entries removed.
    pub fn invalidate_all(&self) -> usize {
        let mut removed = 0;

        // Membership entries are only reachable through the cached list.
        let list_key = keys::category_list();
        if let Some(categories) = self.store.peek::<Vec<String>>(&list_key) {
            removed += categories
                .iter()
                .filter(|name| self.store.remove(&keys::category_members(name)))
                .count();
        }
        removed += usize::from(self.store.remove(&list_key));

        for id in 1..=self.sweep_max_id {
            removed += usize::from(self.store.remove(&keys::item_by_id(id)));
            removed += usize::from(self.store.remove(&keys::species_by_id(id)));
        }

        info!(
            removed,
            sweep_max_id = self.sweep_max_id,
            "Bulk cache invalidation complete"
        );
        removed
    }

    // == Stats ==
    /// Counters plus live entries per kind.
    pub fn report(&self) -> CacheReport {
        let live_keys = self.store.live_keys();
        CacheReport::new(
            self.store.stats(),
            self.fetch_failures.load(Ordering::Relaxed),
            live_keys.iter().map(String::as_str),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::error::UpstreamError;
    use crate::test_support::{sample_item, ScriptedCatalog};
    use chrono::Duration;

    fn setup(
        api: ScriptedCatalog,
    ) -> (CacheOrchestrator, Arc<ScriptedCatalog>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(CacheStore::with_clock(10_000, clock.clone()));
        let api = Arc::new(api);
        (CacheOrchestrator::new(store, api.clone(), 1000), api, clock)
    }

    #[tokio::test]
    async fn test_hit_does_not_refetch() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));

        let first = cache.item(25).await.unwrap();
        let second = cache.item(25).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.calls("item:25"), 1);
        assert_eq!(cache.report().stats.hits, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (cache, api, _) = setup(ScriptedCatalog::default());

        assert!(cache.item(9999).await.is_none());
        assert!(cache.item(9999).await.is_none());

        assert_eq!(api.calls("item:9999"), 2);
        assert!(!cache.store().contains_live(&keys::item_by_id(9999)));
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_none_and_stores_nothing() {
        let api = ScriptedCatalog::with_items(vec![sample_item(25, "pikachu", 4, &["electric"])]);
        api.fail_with(UpstreamError::Unavailable("connection refused".to_string()));
        let (cache, _, _) = setup(api);

        assert!(cache.item(25).await.is_none());
        assert!(!cache.store().contains_live(&keys::item_by_id(25)));
        assert!(cache.store().is_empty());
        assert_eq!(cache.report().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_log_levels_follow_outcome() {
        use crate::test_support::CapturedEvents;
        use tracing::Level;
        use tracing_subscriber::layer::SubscriberExt;

        let events = CapturedEvents::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));

        let api = ScriptedCatalog::with_items(vec![sample_item(25, "pikachu", 4, &["electric"])]);
        api.fail_with(UpstreamError::Unavailable("connection refused".to_string()));
        let (cache, api, _) = setup(api);

        assert!(cache.item(25).await.is_none());
        assert!(events.any(Level::ERROR, "Catalog fetch failed"));

        api.recover();
        cache.item(25).await.unwrap();
        cache.item(25).await.unwrap();
        assert!(events.any(Level::INFO, "Cache miss"));
        assert!(events.any(Level::INFO, "Stored in cache"));
        assert!(events.any(Level::DEBUG, "Cache hit"));
    }

    #[tokio::test]
    async fn test_fetch_through_passes_error_back() {
        let (cache, _, _) = setup(ScriptedCatalog::default());

        let result: UpstreamResult<Option<u32>> = cache
            .fetch_through("dex:item:id:1", EntityKind::Item, || async {
                Err(UpstreamError::Timeout("deadline".to_string()))
            })
            .await;

        assert_eq!(result, Err(UpstreamError::Timeout("deadline".to_string())));
    }

    #[tokio::test]
    async fn test_item_expires_after_thirty_minutes() {
        let (cache, api, clock) = setup(ScriptedCatalog::with_items(vec![
            sample_item(1, "bulbasaur", 7, &["grass"]),
        ]));

        cache.item(1).await.unwrap();
        clock.advance(Duration::minutes(29));
        cache.item(1).await.unwrap();
        assert_eq!(api.calls("item:1"), 1);

        clock.advance(Duration::minutes(1));
        cache.item(1).await.unwrap();
        assert_eq!(api.calls("item:1"), 2);
    }

    #[tokio::test]
    async fn test_category_members_six_hour_window() {
        let api = ScriptedCatalog::default();
        api.add_category("fire", vec![4, 5, 6]);
        let (cache, api, clock) = setup(api);

        cache.category_members("fire").await.unwrap().unwrap();

        clock.advance(Duration::hours(5) + Duration::minutes(59));
        cache.category_members("FIRE").await.unwrap().unwrap();
        assert_eq!(api.calls("category:fire"), 1);

        clock.advance(Duration::minutes(2));
        let members = cache.category_members("fire").await.unwrap().unwrap();
        assert_eq!(members.len(), 3);
        assert_eq!(api.calls("category:fire"), 2);
        assert!(cache.store().contains_live(&keys::category_members("fire")));
    }

    #[tokio::test]
    async fn test_item_by_name_is_case_normalized_and_cross_cached() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));

        cache.item_by_name("Pikachu").await.unwrap().unwrap();
        cache.item_by_name("pikachu").await.unwrap().unwrap();
        cache.item(25).await.unwrap();

        assert_eq!(api.calls("name:pikachu"), 1);
        assert_eq!(api.calls("item:25"), 0);
    }

    #[tokio::test]
    async fn test_search_short_query_skips_fetch() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));

        assert!(cache.search("p").await.is_empty());
        assert_eq!(api.calls("search:p"), 0);

        assert_eq!(cache.search("PIK").await, vec!["pikachu".to_string()]);
        assert_eq!(cache.search("pik").await, vec!["pikachu".to_string()]);
        assert_eq!(api.calls("search:pik"), 1);
    }

    #[tokio::test]
    async fn test_empty_category_list_is_not_cached() {
        let (cache, api, _) = setup(ScriptedCatalog::default());

        assert!(cache.category_list().await.is_empty());
        assert!(cache.category_list().await.is_empty());
        assert_eq!(api.calls("categories"), 2);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));
        cache.item(25).await.unwrap();

        let key = keys::item_by_id(25);
        assert!(cache.invalidate(&key, EntityKind::Item));
        assert!(!cache.invalidate(&key, EntityKind::Item));
        assert!(!cache.store().contains_live(&key));

        cache.item(25).await.unwrap();
        assert_eq!(api.calls("item:25"), 2);
    }

    #[tokio::test]
    async fn test_invalidate_item_drops_name_key() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));
        cache.item_by_name("Pikachu").await.unwrap().unwrap();
        cache.species(25).await.unwrap();

        assert_eq!(cache.invalidate_item(25), 3);
        assert!(!cache.store().contains_live(&keys::item_by_name("pikachu")));

        cache.item_by_name("pikachu").await.unwrap().unwrap();
        assert_eq!(api.calls("name:pikachu"), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_is_bounded() {
        let api = ScriptedCatalog::with_items(vec![
            sample_item(1, "bulbasaur", 7, &["grass"]),
            sample_item(1001, "outlier", 3, &["normal"]),
        ]);
        api.add_category("grass", vec![1]);
        let (cache, _, _) = setup(api);

        cache.item(1).await.unwrap();
        cache.species(1).await.unwrap();
        cache.item(1001).await.unwrap();
        assert_eq!(cache.category_list().await, vec!["grass".to_string()]);
        cache.category_members("grass").await.unwrap();
        cache.search("bu").await;

        let before = cache.report().stats;
        let removed = cache.invalidate_all();

        assert_eq!(removed, 4);
        let after = cache.report().stats;
        assert_eq!((after.hits, after.misses), (before.hits, before.misses));
        assert!(!cache.store().contains_live(&keys::item_by_id(1)));
        assert!(!cache.store().contains_live(&keys::species_by_id(1)));
        assert!(!cache.store().contains_live(&keys::category_list()));
        assert!(!cache.store().contains_live(&keys::category_members("grass")));
        // Outside the sweep
        assert!(cache.store().contains_live(&keys::item_by_id(1001)));
        assert!(cache.store().contains_live(&keys::search("bu")));
    }

    #[tokio::test]
    async fn test_report_counts_live_by_kind() {
        let (cache, _, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(4, "charmander", 6, &["fire"]),
        ]));
        cache.item(4).await;
        cache.species(4).await;

        let report = cache.report();
        assert_eq!(report.live_by_kind[&EntityKind::Item], 1);
        assert_eq!(report.live_by_kind[&EntityKind::Species], 1);
        assert_eq!(report.live_by_kind[&EntityKind::Search], 0);
    }

    #[tokio::test]
    async fn test_cache_layer_fault_falls_through_to_fetch() {
        let (cache, api, _) = setup(ScriptedCatalog::with_items(vec![
            sample_item(25, "pikachu", 4, &["electric"]),
        ]));
        let key = keys::item_by_id(25);
        cache.store().set(
            &key,
            "not an item".to_string(),
            Duration::minutes(5),
            Duration::minutes(5),
            crate::cache::Priority::Normal,
        );

        let item = cache.item(25).await.unwrap();

        assert_eq!(item.name, "pikachu");
        assert_eq!(api.calls("item:25"), 1);
        assert_eq!(cache.store().get::<CatalogItem>(&key).unwrap(), Some(item));
    }
}
