//! reqwest-backed catalog client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::wire::{CategoryPayload, ItemPayload, ResourceList, SpeciesPayload};
use super::{CatalogApi, MIN_SEARCH_LEN};
use crate::config::Config;
use crate::error::{UpstreamError, UpstreamResult};
use crate::models::{CatalogItem, ItemReference, PageEnvelope, SpeciesInfo};

/// Upper bound used when pulling the whole name index for prefix search.
const NAME_INDEX_LIMIT: usize = 100_000;

/// HTTP client for the catalog API.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    category_list_limit: usize,
    search_result_limit: usize,
}

impl HttpCatalogClient {
    /// Creates a client from service configuration.
    pub fn new(config: &Config) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("dex_cache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                UpstreamError::Unavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Self::with_client(client, config)
    }

    /// Creates a client around an existing reqwest `Client`.
    ///
    /// Fails when the configured base URL cannot carry path segments.
    pub fn with_client(client: Client, config: &Config) -> UpstreamResult<Self> {
        let base_url = Url::parse(config.api_base_url.trim_end_matches('/'))
            .map_err(|e| UpstreamError::Unavailable(format!("Invalid catalog base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Unavailable(format!(
                "Catalog base URL {} cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            category_list_limit: config.category_list_limit,
            search_result_limit: config.search_result_limit,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    ///
    /// A segment containing `/` or `?` stays a single path segment.
    fn endpoint(&self, segments: &[&str], query: &[(&str, usize)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, &value.to_string());
            }
        }
        url
    }

    async fn send(&self, url: Url) -> UpstreamResult<Response> {
        debug!(url = %url, "GET catalog");
        Ok(self.client.get(url).send().await?)
    }

    /// GET for a single entity: a non-success status means "absent".
    async fn lookup<T: DeserializeOwned>(&self, url: Url) -> UpstreamResult<Option<T>> {
        let path = url.path().to_string();
        let response = self.send(url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                path = %path,
                status = status.as_u16(),
                "Catalog lookup returned non-success status"
            );
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    /// GET for a listing: a non-success status is an outage.
    async fn listing<T: DeserializeOwned>(&self, url: Url) -> UpstreamResult<T> {
        let path = url.path().to_string();
        let response = self.send(url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                path = %path,
                status = status.as_u16(),
                "Catalog listing returned non-success status"
            );
            return Err(UpstreamError::Unavailable(format!(
                "{} returned status {}",
                path, status
            )));
        }
        decode(response).await
    }
}

/// Names made only of dots would be dropped from the URL path.
fn is_lookup_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().any(|c| c != '.')
}

async fn decode<T: DeserializeOwned>(response: Response) -> UpstreamResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed(e.to_string()))
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_item(&self, id: u32) -> UpstreamResult<Option<CatalogItem>> {
        let id = id.to_string();
        let payload: Option<ItemPayload> =
            self.lookup(self.endpoint(&["pokemon", id.as_str()], &[])).await?;
        Ok(payload.map(CatalogItem::from))
    }

    async fn fetch_item_by_name(&self, name: &str) -> UpstreamResult<Option<CatalogItem>> {
        let name = name.trim().to_lowercase();
        if !is_lookup_segment(&name) {
            return Ok(None);
        }
        let payload: Option<ItemPayload> =
            self.lookup(self.endpoint(&["pokemon", name.as_str()], &[])).await?;
        Ok(payload.map(CatalogItem::from))
    }

    async fn fetch_species(&self, id: u32) -> UpstreamResult<Option<SpeciesInfo>> {
        let id = id.to_string();
        let payload: Option<SpeciesPayload> =
            self.lookup(self.endpoint(&["pokemon-species", id.as_str()], &[])).await?;
        Ok(payload.map(SpeciesInfo::from))
    }

    async fn fetch_category_list(&self) -> UpstreamResult<Vec<String>> {
        let list: ResourceList = self
            .listing(self.endpoint(&["type"], &[("limit", self.category_list_limit)]))
            .await?;
        Ok(list.results.into_iter().map(|r| r.name).collect())
    }

    async fn fetch_category_members(
        &self,
        category: &str,
    ) -> UpstreamResult<Option<Vec<ItemReference>>> {
        let category = category.trim().to_lowercase();
        if !is_lookup_segment(&category) {
            return Ok(None);
        }
        let payload: Option<CategoryPayload> =
            self.lookup(self.endpoint(&["type", category.as_str()], &[])).await?;
        Ok(payload.map(CategoryPayload::into_members))
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> UpstreamResult<PageEnvelope> {
        let list: ResourceList = self
            .listing(self.endpoint(&["pokemon"], &[("offset", offset), ("limit", limit)]))
            .await?;
        Ok(list.into())
    }

    async fn search_names_by_prefix(&self, query: &str) -> UpstreamResult<Vec<String>> {
        let prefix = query.trim().to_lowercase();
        if prefix.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let index: ResourceList = self
            .listing(self.endpoint(&["pokemon"], &[("limit", NAME_INDEX_LIMIT)]))
            .await?;
        Ok(index
            .results
            .into_iter()
            .map(|r| r.name)
            .filter(|name| name.starts_with(&prefix))
            .take(self.search_result_limit)
            .collect())
    }
}
