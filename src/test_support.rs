//! Fixtures shared by unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::{
    CatalogItem, CategoryTag, ImageBundle, ItemReference, ItemSummary, LocalizedText,
    PageEnvelope, SpeciesInfo, StatValue,
};
use crate::upstream::CatalogApi;

pub(crate) fn sample_item(id: u32, name: &str, height: u32, categories: &[&str]) -> CatalogItem {
    CatalogItem {
        id,
        name: name.to_string(),
        height,
        weight: 60,
        base_experience: Some(112),
        categories: categories
            .iter()
            .enumerate()
            .map(|(i, c)| CategoryTag {
                name: c.to_string(),
                slot: i as u8 + 1,
            })
            .collect(),
        traits: vec![],
        stats: vec![StatValue {
            name: "speed".to_string(),
            base_value: 90,
            effort: 2,
        }],
        images: ImageBundle::default(),
    }
}

pub(crate) fn sample_species(id: u32, name: &str) -> SpeciesInfo {
    SpeciesInfo {
        id,
        name: name.to_string(),
        color: "yellow".to_string(),
        habitat: None,
        generation: "generation-i".to_string(),
        is_legendary: false,
        is_mythical: false,
        capture_rate: 45,
        base_happiness: Some(50),
        growth_rate: "medium".to_string(),
        flavor_texts: vec![LocalizedText {
            language: "en".to_string(),
            text: format!("{} flavor", name),
        }],
        genera: vec![],
    }
}

/// In-memory catalog that counts calls per operation.
///
/// Call keys: `item:<id>`, `name:<name>`, `species:<id>`, `categories`,
/// `category:<name>`, `page:<offset>`, `search:<query>`.
#[derive(Default)]
pub(crate) struct ScriptedCatalog {
    items: BTreeMap<u32, CatalogItem>,
    categories: Mutex<BTreeMap<String, Vec<u32>>>,
    calls: Mutex<HashMap<String, usize>>,
    failure: Mutex<Option<UpstreamError>>,
    failing_items: Mutex<HashSet<u32>>,
    failing_species: Mutex<bool>,
}

impl ScriptedCatalog {
    pub(crate) fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn add_category(&self, name: &str, ids: Vec<u32>) {
        self.categories.lock().insert(name.to_string(), ids);
    }

    /// Makes every call fail with `err`.
    pub(crate) fn fail_with(&self, err: UpstreamError) {
        *self.failure.lock() = Some(err);
    }

    pub(crate) fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Makes item lookups for `id` fail with a timeout.
    pub(crate) fn fail_item(&self, id: u32) {
        self.failing_items.lock().insert(id);
    }

    pub(crate) fn fail_species(&self) {
        *self.failing_species.lock() = true;
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    fn record(&self, key: String) -> UpstreamResult<()> {
        *self.calls.lock().entry(key).or_default() += 1;
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn fetch_item(&self, id: u32) -> UpstreamResult<Option<CatalogItem>> {
        self.record(format!("item:{}", id))?;
        if self.failing_items.lock().contains(&id) {
            return Err(UpstreamError::Timeout(format!("item {}", id)));
        }
        Ok(self.items.get(&id).cloned())
    }

    async fn fetch_item_by_name(&self, name: &str) -> UpstreamResult<Option<CatalogItem>> {
        self.record(format!("name:{}", name))?;
        Ok(self.items.values().find(|item| item.name == name).cloned())
    }

    async fn fetch_species(&self, id: u32) -> UpstreamResult<Option<SpeciesInfo>> {
        self.record(format!("species:{}", id))?;
        if *self.failing_species.lock() {
            return Err(UpstreamError::Unavailable("species endpoint down".to_string()));
        }
        Ok(self.items.get(&id).map(|item| sample_species(id, &item.name)))
    }

    async fn fetch_category_list(&self) -> UpstreamResult<Vec<String>> {
        self.record("categories".to_string())?;
        Ok(self.categories.lock().keys().cloned().collect())
    }

    async fn fetch_category_members(
        &self,
        category: &str,
    ) -> UpstreamResult<Option<Vec<ItemReference>>> {
        self.record(format!("category:{}", category))?;
        Ok(self.categories.lock().get(category).map(|ids| {
            ids.iter()
                .map(|id| ItemReference {
                    id: *id,
                    name: self
                        .items
                        .get(id)
                        .map(|item| item.name.clone())
                        .unwrap_or_else(|| format!("item-{}", id)),
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
                .map(|item| ItemSummary {
                    name: item.name.clone(),
                    url: format!("https://pokeapi.co/api/v2/pokemon/{}/", item.id),
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
            .filter(|item| item.name.starts_with(query))
            .map(|item| item.name.clone())
            .take(10)
            .collect())
    }
}

/// Subscriber layer that records each event's level and message.
#[derive(Clone, Default)]
pub(crate) struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedEvents {
    pub(crate) fn any(&self, level: Level, message: &str) -> bool {
        self.0
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(message))
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageField::default();
        event.record(&mut message);
        self.0.lock().push((*event.metadata().level(), message.0));
    }
}

#[derive(Default)]
struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
