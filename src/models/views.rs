//! Query inputs and results exchanged with the query service.

use serde::Serialize;

use super::catalog::{CatalogItem, SpeciesInfo};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

// == List Query ==
/// Parameters for a paginated, filtered listing.
///
/// `page` is 1-based and already clamped by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub page_size: usize,
    /// Exact-name lookup, or substring filter inside a category listing
    pub name: Option<String>,
    /// Category membership filter
    pub category: Option<String>,
    /// Inclusive lower height bound, upstream units
    pub min_height: Option<u32>,
    /// Inclusive upper height bound, upstream units
    pub max_height: Option<u32>,
}

impl ListQuery {
    /// A plain page with no filters.
    pub fn page(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            name: None,
            category: None,
            min_height: None,
            max_height: None,
        }
    }

    /// Number of rows to skip before this page, saturating for huge pages.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::page(1, DEFAULT_PAGE_SIZE)
    }
}

// == List Result ==
/// One page of resolved items plus pagination flags.
///
/// `error_message` is set when an upstream failure cut the listing short; the
/// items gathered before the failure (usually none) are still returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListResult {
    pub items: Vec<CatalogItem>,
    pub page: usize,
    pub page_size: usize,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ListResult {
    /// An empty page for the given query.
    pub fn empty(query: &ListQuery) -> Self {
        Self {
            page: query.page,
            page_size: query.page_size,
            has_previous: query.page > 1,
            ..Self::default()
        }
    }

    /// An empty page carrying a user-facing error message.
    pub fn failed(query: &ListQuery, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::empty(query)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

// == Details View ==
/// Item detail with optional species enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub item: CatalogItem,
    /// `None` when the species lookup missed or failed
    pub species: Option<SpeciesInfo>,
    /// Species description in the requested language
    pub description: Option<String>,
    /// Species category label in the requested language
    pub category_label: Option<String>,
}

impl DetailsView {
    /// Resolves localized species text for `language`, falling back to English.
    pub fn new(item: CatalogItem, species: Option<SpeciesInfo>, language: &str) -> Self {
        let description = species
            .as_ref()
            .and_then(|s| s.flavor_text(language))
            .map(str::to_string);
        let category_label = species
            .as_ref()
            .and_then(|s| s.category_label(language))
            .map(str::to_string);
        Self {
            item,
            species,
            description,
            category_label,
        }
    }
}
