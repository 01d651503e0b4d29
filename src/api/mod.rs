//! API Module
//!
//! HTTP handlers and routing for the catalog service.
//!
//! # Endpoints
//! - `GET /items`, `GET /items/:id`, `GET /compare` - Listings and details
//! - `GET /categories`, `GET /categories/:name/items` - Category views
//! - `GET /search` - Name autocomplete
//! - `/admin/cache/*` - Cache clearing, invalidation and statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
