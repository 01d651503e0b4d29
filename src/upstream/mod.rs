//! Upstream Catalog Module
//!
//! The read-only catalog API this service sits in front of. `CatalogApi` is
//! the seam the cache layer depends on; `HttpCatalogClient` is the reqwest
//! implementation used in production.

mod client;
mod wire;

use async_trait::async_trait;

pub use client::HttpCatalogClient;

use crate::error::UpstreamResult;
use crate::models::{CatalogItem, ItemReference, PageEnvelope, SpeciesInfo};

/// Minimum query length for a prefix search.
pub const MIN_SEARCH_LEN: usize = 2;

// == Catalog API ==
/// Operations offered by the upstream catalog.
///
/// Lookups of a single entity return `Ok(None)` when upstream answers with a
/// non-success status. Transport, timeout and decoding failures are `Err`.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Item detail by numeric id.
    async fn fetch_item(&self, id: u32) -> UpstreamResult<Option<CatalogItem>>;

    /// Item detail by exact lowercase name.
    async fn fetch_item_by_name(&self, name: &str) -> UpstreamResult<Option<CatalogItem>>;

    /// Species detail by numeric id.
    async fn fetch_species(&self, id: u32) -> UpstreamResult<Option<SpeciesInfo>>;

    /// Names of the catalog categories, bounded by the client's list limit.
    async fn fetch_category_list(&self) -> UpstreamResult<Vec<String>>;

    /// Every member of one category. `Ok(None)` if the category is unknown.
    async fn fetch_category_members(
        &self,
        category: &str,
    ) -> UpstreamResult<Option<Vec<ItemReference>>>;

    /// One page of item summaries.
    async fn fetch_page(&self, offset: usize, limit: usize) -> UpstreamResult<PageEnvelope>;

    /// Case-insensitive prefix match over the full name catalog.
    async fn search_names_by_prefix(&self, query: &str) -> UpstreamResult<Vec<String>>;
}
