//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dex_cache::cache::{CacheOrchestrator, CacheStore, ManualClock};
use dex_cache::error::{UpstreamError, UpstreamResult};
use dex_cache::models::{
    CatalogItem, CategoryTag, ImageBundle, ItemReference, ItemSummary, PageEnvelope, SpeciesInfo,
};
use dex_cache::service::{QueryService, QuerySettings};
use dex_cache::upstream::CatalogApi;
use parking_lot::Mutex;

pub fn item(id: u32, name: &str, height: u32, categories: &[&str]) -> CatalogItem {
    CatalogItem {
        id,
        name: name.to_string(),
        height,
        weight: 100,
        base_experience: Some(64),
        categories: categories
            .iter()
            .enumerate()
            .map(|(i, name)| CategoryTag {
                name: name.to_string(),
                slot: i as u8 + 1,
            })
            .collect(),
        traits: vec![],
        stats: vec![],
        images: ImageBundle::default(),
    }
}

/// Catalog fake with call counting and a global outage switch.
#[derive(Default)]
pub struct FakeCatalog {
    pub items: BTreeMap<u32, CatalogItem>,
    pub categories: BTreeMap<String, Vec<u32>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl FakeCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut categories: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for item in &items {
            for tag in &item.categories {
                categories.entry(tag.name.clone()).or_default().push(item.id);
            }
        }
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            categories,
            ..Self::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    fn record(&self, key: String) -> UpstreamResult<()> {
        *self.calls.lock().entry(key).or_default() += 1;
        if self.offline.load(Ordering::SeqCst) {
            Err(UpstreamError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_item(&self, id: u32) -> UpstreamResult<Option<CatalogItem>> {
        self.record(format!("item:{}", id))?;
        Ok(self.items.get(&id).cloned())
    }

    async fn fetch_item_by_name(&self, name: &str) -> UpstreamResult<Option<CatalogItem>> {
        self.record(format!("name:{}", name))?;
        Ok(self.items.values().find(|i| i.name == name).cloned())
    }

    async fn fetch_species(&self, id: u32) -> UpstreamResult<Option<SpeciesInfo>> {
        self.record(format!("species:{}", id))?;
        Ok(None)
    }

    async fn fetch_category_list(&self) -> UpstreamResult<Vec<String>> {
        self.record("categories".to_string())?;
        Ok(self.categories.keys().cloned().collect())
    }

    async fn fetch_category_members(
        &self,
        category: &str,
    ) -> UpstreamResult<Option<Vec<ItemReference>>> {
        self.record(format!("category:{}", category))?;
        Ok(self.categories.get(category).map(|ids| {
            ids.iter()
                .map(|id| ItemReference {
                    id: *id,
                    name: self.items[id].name.clone(),
                })
                .collect()
        }))
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> UpstreamResult<PageEnvelope> {
        self.record(format!("page:{}", offset))?;
        let total = self.items.len();
        Ok(PageEnvelope {
            items: self
                .items
                .values()
                .skip(offset)
                .take(limit)
                .map(|i| ItemSummary {
                    name: i.name.clone(),
                    url: format!("https://pokeapi.co/api/v2/pokemon/{}/", i.id),
                })
                .collect(),
            total_count: total as u64,
            has_next: offset.saturating_add(limit) < total,
            has_previous: offset > 0,
        })
    }

    async fn search_names_by_prefix(&self, query: &str) -> UpstreamResult<Vec<String>> {
        self.record(format!("search:{}", query))?;
        Ok(self
            .items
            .values()
            .map(|i| i.name.clone())
            .filter(|n| n.starts_with(query))
            .collect())
    }
}

pub struct Harness {
    pub api: Arc<FakeCatalog>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<CacheStore>,
    pub cache: Arc<CacheOrchestrator>,
    pub service: QueryService,
}

pub fn harness(api: FakeCatalog) -> Harness {
    let api = Arc::new(api);
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(CacheStore::with_clock(10_000, clock.clone()));
    let cache = Arc::new(CacheOrchestrator::new(store.clone(), api.clone(), 1000));
    let service = QueryService::new(api.clone(), cache.clone(), QuerySettings::default());
    Harness {
        api,
        clock,
        store,
        cache,
        service,
    }
}
