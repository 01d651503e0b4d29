//! API Handlers
//!
//! Thin HTTP handlers over the query service. Parameter normalization lives in
//! the request DTOs; all caching and fallback behaviour lives in the service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheOrchestrator, CacheStore};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    CatalogItem, CategoriesResponse, ClearCacheResponse, CompareParams, DetailsView,
    HealthResponse, InvalidateResponse, ListParams, ListResult, SearchParams, SearchResponse,
    StatsResponse,
};
use crate::service::{QueryService, QuerySettings};
use crate::upstream::{CatalogApi, HttpCatalogClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<QueryService>,
}

impl AppState {
    /// Creates a new AppState around a query service.
    pub fn new(queries: QueryService) -> Self {
        Self {
            queries: Arc::new(queries),
        }
    }

    /// Wires the cache layer over `api` using the given store.
    pub fn with_api(api: Arc<dyn CatalogApi>, store: Arc<CacheStore>, config: &Config) -> Self {
        let cache = Arc::new(CacheOrchestrator::new(
            store,
            api.clone(),
            config.invalidate_sweep_max_id,
        ));
        Self::new(QueryService::new(api, cache, QuerySettings::from(config)))
    }

    /// Creates a new AppState from configuration, talking to the real catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = HttpCatalogClient::new(config)?;
        let store = Arc::new(CacheStore::new(config.max_entries));
        Ok(Self::with_api(Arc::new(client), store, config))
    }

    /// The store backing the cache, for the background sweep.
    pub fn store(&self) -> Arc<CacheStore> {
        self.queries.cache().store().clone()
    }
}

/// Handler for GET /items
pub async fn list_items_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ListResult> {
    let query = params.into_query();
    Json(state.queries.list_items(&query).await)
}

/// Handler for GET /items/:id
pub async fn item_details_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<DetailsView>> {
    state
        .queries
        .get_details_with_species(id)
        .await
        .map(Json)
        .ok_or_else(|| CatalogError::UpstreamNotFound(format!("Item {} not found", id)))
}

/// Handler for GET /compare?ids=1,4,7
pub async fn compare_handler(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Vec<CatalogItem>>> {
    let ids = params.parse_ids().map_err(CatalogError::InvalidRequest)?;
    let mut items = state.queries.get_multiple(&ids).await;
    // Present in the order requested
    items.sort_by_key(|item| ids.iter().position(|id| *id == item.id));
    Ok(Json(items))
}

/// Handler for GET /categories
pub async fn categories_handler(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.queries.categories().await,
    })
}

/// Handler for GET /categories/:name/items
pub async fn category_items_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ListParams>,
) -> Json<ListResult> {
    let query = params.into_query();
    Json(state.queries.list_by_category_global(&name, &query).await)
}

/// Handler for GET /search?q=
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let names = state.queries.search_names(&params.q).await;
    Json(SearchResponse {
        query: params.q,
        names,
    })
}

/// Handler for POST /admin/cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.queries.clear_cache();
    info!(removed, "Cache cleared via admin endpoint");
    Json(ClearCacheResponse::new(removed))
}

/// Handler for DELETE /admin/cache/items/:id
pub async fn invalidate_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Json<InvalidateResponse> {
    let removed = state.queries.invalidate_item(id);
    Json(InvalidateResponse::new(id, removed))
}

/// Handler for GET /admin/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.queries.cache_stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
