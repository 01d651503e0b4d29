//! Domain records, query types and HTTP DTOs.

pub mod catalog;
pub mod requests;
pub mod responses;
pub mod views;

// Re-export commonly used types
pub use catalog::{
    CatalogItem, CategoryTag, ImageBundle, ItemReference, ItemSummary, LocalizedText,
    PageEnvelope, SpeciesInfo, StatValue, TraitRef, FALLBACK_LANGUAGE,
};
pub use requests::{CompareParams, ListParams, SearchParams};
pub use responses::{
    CategoriesResponse, ClearCacheResponse, ErrorResponse, HealthResponse, InvalidateResponse,
    SearchResponse, StatsResponse,
};
pub use views::{DetailsView, ListQuery, ListResult};
