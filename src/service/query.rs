//! Query Service
//!
//! Answers listing and detail questions by composing cache orchestrator calls.
//! Every operation returns data: upstream failures become an empty result or
//! a `ListResult` carrying a user-facing message.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheOrchestrator, CacheReport};
use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::{CatalogItem, DetailsView, ListQuery, ListResult, FALLBACK_LANGUAGE};
use crate::upstream::CatalogApi;

// == Settings ==
/// Fan-out limits for the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySettings {
    /// Category members considered per category listing
    pub fan_out_limit: usize,
    /// Detail fetches in flight at once
    pub fan_out_concurrency: usize,
    /// Language for species text in detail views
    pub language: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            fan_out_limit: 200,
            fan_out_concurrency: 32,
            language: FALLBACK_LANGUAGE.to_string(),
        }
    }
}

impl From<&Config> for QuerySettings {
    fn from(config: &Config) -> Self {
        Self {
            fan_out_limit: config.fan_out_limit,
            fan_out_concurrency: config.fan_out_concurrency.max(1),
            language: config.preferred_language.clone(),
        }
    }
}

// == Query Service ==
pub struct QueryService {
    api: Arc<dyn CatalogApi>,
    cache: Arc<CacheOrchestrator>,
    settings: QuerySettings,
}

impl QueryService {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        cache: Arc<CacheOrchestrator>,
        settings: QuerySettings,
    ) -> Self {
        Self {
            api,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<CacheOrchestrator> {
        &self.cache
    }

    // == List Items ==
    /// One page of items, optionally filtered.
    ///
    /// A category filter switches to a full membership scan; otherwise a name
    /// filter is an exact-name lookup; otherwise one upstream page is resolved.
    pub async fn list_items(&self, query: &ListQuery) -> ListResult {
        if let Some(category) = non_blank(query.category.as_deref()) {
            return self.list_by_category_global(category, query).await;
        }

        if let Some(name) = non_blank(query.name.as_deref()) {
            return match self.cache.item_by_name(name).await {
                Ok(Some(item)) => ListResult {
                    items: vec![item],
                    page: query.page,
                    page_size: query.page_size,
                    total_count: 1,
                    has_next: false,
                    has_previous: false,
                    error_message: None,
                },
                Ok(None) => ListResult::empty(query),
                Err(e) => failure_result(query, &e),
            };
        }

        let envelope = match self.api.fetch_page(query.offset(), query.page_size).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(page = query.page, error = %e, "Listing page fetch failed");
                return failure_result(query, &e);
            }
        };

        let ids: Vec<u32> = envelope.items.iter().filter_map(|s| s.id()).collect();
        let mut items = self.fetch_items(ids).await;
        items.sort_by_key(|item| item.id);

        debug!(
            page = query.page,
            requested = envelope.items.len(),
            resolved = items.len(),
            "Resolved listing page"
        );

        ListResult {
            items,
            page: query.page,
            page_size: query.page_size,
            total_count: envelope.total_count,
            has_next: envelope.has_next,
            has_previous: envelope.has_previous,
            error_message: None,
        }
    }

    // == List By Category ==
    /// Members of `category`, filtered and paginated in memory.
    ///
    /// Filters apply in order: case-insensitive name substring, inclusive
    /// height range, then pagination over the filtered set.
    pub async fn list_by_category_global(&self, category: &str, query: &ListQuery) -> ListResult {
        let members = match self.cache.category_members(category).await {
            Ok(Some(members)) => members,
            Ok(None) => return ListResult::empty(query),
            Err(e) => return failure_result(query, &e),
        };

        if members.len() > self.settings.fan_out_limit {
            info!(
                category,
                members = members.len(),
                limit = self.settings.fan_out_limit,
                "Category membership capped"
            );
        }

        let ids: Vec<u32> = members
            .iter()
            .take(self.settings.fan_out_limit)
            .map(|member| member.id)
            .collect();
        let mut items = self.fetch_items(ids).await;
        items.sort_by_key(|item| item.id);

        let needle = non_blank(query.name.as_deref()).map(str::to_lowercase);
        let filtered: Vec<CatalogItem> = items
            .into_iter()
            .filter(|item| {
                needle
                    .as_deref()
                    .map_or(true, |needle| item.name.to_lowercase().contains(needle))
            })
            .filter(|item| item.height_within(query.min_height, query.max_height))
            .collect();

        let total = filtered.len();
        let skip = query.offset();
        let items: Vec<CatalogItem> = filtered
            .into_iter()
            .skip(skip)
            .take(query.page_size)
            .collect();

        ListResult {
            items,
            page: query.page,
            page_size: query.page_size,
            total_count: total as u64,
            has_next: skip.saturating_add(query.page_size) < total,
            has_previous: query.page > 1,
            error_message: None,
        }
    }

    // == Details ==
    /// Item detail, enriched with species data when available.
    ///
    /// Returns `None` only when the item itself cannot be resolved.
    pub async fn get_details_with_species(&self, id: u32) -> Option<DetailsView> {
        let item = self.cache.item(id).await?;
        let species = self.cache.species(id).await;
        if species.is_none() {
            debug!(id, "Species enrichment unavailable");
        }
        Some(DetailsView::new(item, species, &self.settings.language))
    }

    /// Details for each id, dropping any that fail. No ordering guarantee.
    pub async fn get_multiple(&self, ids: &[u32]) -> Vec<CatalogItem> {
        self.fetch_items(ids.iter().copied()).await
    }

    // == Secondary Queries ==
    /// Name autocomplete.
    pub async fn search_names(&self, query: &str) -> Vec<String> {
        self.cache.search(query).await
    }

    /// Category names.
    pub async fn categories(&self) -> Vec<String> {
        self.cache.category_list().await
    }

    // == Administration ==
    /// Bulk invalidation. Returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        self.cache.invalidate_all()
    }

    /// Drops the cached item, its exact-name entry and its species entry.
    pub fn invalidate_item(&self, id: u32) -> usize {
        self.cache.invalidate_item(id)
    }

    pub fn cache_stats(&self) -> CacheReport {
        self.cache.report()
    }

    /// Concurrent detail fetch with bounded parallelism; failures are dropped.
    async fn fetch_items(&self, ids: impl IntoIterator<Item = u32>) -> Vec<CatalogItem> {
        stream::iter(ids)
            .map(|id| self.cache.item(id))
            .buffer_unordered(self.settings.fan_out_concurrency)
            .filter_map(|item| async move { item })
            .collect()
            .await
    }
}

/// Connectivity and timeout failures carry a "try again" message; a payload
/// that failed to parse reads as an empty result.
fn failure_result(query: &ListQuery, err: &UpstreamError) -> ListResult {
    match err {
        UpstreamError::Malformed(detail) => {
            error!(
                page = query.page,
                detail = %detail,
                "Malformed catalog payload, returning empty listing"
            );
            ListResult::empty(query)
        }
        UpstreamError::Unavailable(_) | UpstreamError::Timeout(_) => {
            ListResult::failed(query, err.user_message())
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
