//! Request DTOs for the HTTP API
//!
//! Query-string parameters and their normalization into service queries.

use serde::Deserialize;

use super::views::{ListQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Maximum ids accepted by a compare request.
pub const MAX_COMPARE_IDS: usize = 50;

/// Query parameters for listing endpoints.
///
/// Blank strings (as submitted by HTML forms) count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub category: Option<String>,
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
}

impl ListParams {
    /// Clamps paging and drops blank filters.
    ///
    /// `page < 1` becomes 1; `page_size` is held to `1..=MAX_PAGE_SIZE`.
    pub fn into_query(self) -> ListQuery {
        ListQuery {
            page: self.page.unwrap_or(1).max(1),
            page_size: self
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            name: blank_to_none(self.name),
            category: blank_to_none(self.category),
            min_height: self.min_height,
            max_height: self.max_height,
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Query parameters for `GET /compare`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareParams {
    /// Comma-separated ids
    pub ids: String,
}

impl CompareParams {
    /// Parses the id list.
    ///
    /// Returns an error message if validation fails.
    pub fn parse_ids(&self) -> Result<Vec<u32>, String> {
        let ids = self
            .ids
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| format!("Invalid id '{}'", part))
            })
            .collect::<Result<Vec<u32>, String>>()?;

        if ids.is_empty() {
            return Err("At least one id is required".to_string());
        }
        if ids.len() > MAX_COMPARE_IDS {
            return Err(format!("At most {} ids may be compared", MAX_COMPARE_IDS));
        }
        Ok(ids)
    }
}

/// Query parameters for `GET /search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}
