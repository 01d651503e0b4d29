//! Response DTOs for the HTTP API
//!
//! Listing and detail endpoints return `ListResult`, `DetailsView` and
//! `CatalogItem` directly; the types here cover the rest.

use serde::Serialize;

use crate::cache::CacheReport;

/// Response body for `GET /categories`
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// Response body for `GET /search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub names: Vec<String>,
}

/// Response body for `POST /admin/cache/clear`
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub removed: usize,
}

impl ClearCacheResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Cache cleared, {} entries removed", removed),
            removed,
        }
    }
}

/// Response body for `DELETE /admin/cache/items/:id`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    pub id: u32,
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(id: u32, removed: usize) -> Self {
        Self {
            message: format!("Cache entries for item {} invalidated", id),
            id,
            removed,
        }
    }
}

/// Response body for `GET /admin/cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub report: CacheReport,
    /// Live entries across all kinds
    pub live_entries: usize,
}

impl From<CacheReport> for StatsResponse {
    fn from(report: CacheReport) -> Self {
        Self {
            live_entries: report.live_total(),
            report,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
