//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    categories_handler, category_items_handler, clear_cache_handler, compare_handler,
    health_handler, invalidate_item_handler, item_details_handler, list_items_handler,
    search_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /items` - Paginated, filterable listing
/// - `GET /items/:id` - Item detail with species enrichment
/// - `GET /compare?ids=` - Several items at once
/// - `GET /categories` - Category names
/// - `GET /categories/:name/items` - Listing restricted to one category
/// - `GET /search?q=` - Name autocomplete
/// - `POST /admin/cache/clear` - Bulk invalidation
/// - `DELETE /admin/cache/items/:id` - Invalidate one item
/// - `GET /admin/cache/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", get(list_items_handler))
        .route("/items/:id", get(item_details_handler))
        .route("/compare", get(compare_handler))
        .route("/categories", get(categories_handler))
        .route("/categories/:name/items", get(category_items_handler))
        .route("/search", get(search_handler))
        .route("/admin/cache/clear", post(clear_cache_handler))
        .route("/admin/cache/items/:id", delete(invalidate_item_handler))
        .route("/admin/cache/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
