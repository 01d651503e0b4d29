//! Cache key generators and per-kind expiration policy.
//!
//! Every key is `dex:<kind>:<qualifier>`; text qualifiers are trimmed and
//! lowercased so that "Pikachu" and "pikachu" share one entry.

use std::fmt;

use chrono::Duration;
use serde::Serialize;

use super::entry::Priority;

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "dex";

/// Sliding renewal window recorded on every entry.
pub const SLIDING_WINDOW_MINUTES: i64 = 5;

// == Entity Kind ==
/// The kinds of upstream entity the cache distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Category list and category membership
    Category,
    /// Item detail, by id or by exact name
    Item,
    /// Species detail
    Species,
    /// Free-text name search results
    Search,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Category,
        EntityKind::Item,
        EntityKind::Species,
        EntityKind::Search,
    ];

    /// Key segment naming this kind.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Item => "item",
            EntityKind::Species => "species",
            EntityKind::Search => "search",
        }
    }

    /// Absolute time-to-live for entries of this kind.
    pub fn ttl(self) -> Duration {
        match self {
            EntityKind::Category => Duration::hours(6),
            EntityKind::Item => Duration::minutes(30),
            EntityKind::Species => Duration::hours(1),
            EntityKind::Search => Duration::minutes(15),
        }
    }

    /// Sliding window stored alongside the absolute bound.
    pub fn sliding_window(self) -> Duration {
        Duration::minutes(SLIDING_WINDOW_MINUTES)
    }

    /// Eviction priority under capacity pressure.
    pub fn priority(self) -> Priority {
        match self {
            EntityKind::Category => Priority::High,
            EntityKind::Item | EntityKind::Species => Priority::Normal,
            EntityKind::Search => Priority::Low,
        }
    }

    /// Recovers the kind from a key built by this module.
    pub fn of_key(key: &str) -> Option<EntityKind> {
        let mut parts = key.splitn(3, ':');
        if parts.next() != Some(CACHE_PREFIX) {
            return None;
        }
        let label = parts.next()?;
        EntityKind::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Generate a cache key for an item by numeric id.
#[must_use]
pub fn item_by_id(id: u32) -> String {
    format!("{}:item:id:{}", CACHE_PREFIX, id)
}

/// Generate a cache key for an item by exact name.
#[must_use]
pub fn item_by_name(name: &str) -> String {
    format!("{}:item:name:{}", CACHE_PREFIX, normalize(name))
}

/// Generate a cache key for species detail by id.
#[must_use]
pub fn species_by_id(id: u32) -> String {
    format!("{}:species:id:{}", CACHE_PREFIX, id)
}

/// Key of the single category list entry.
#[must_use]
pub fn category_list() -> String {
    format!("{}:category:list", CACHE_PREFIX)
}

/// Generate a cache key for one category's membership.
#[must_use]
pub fn category_members(category: &str) -> String {
    format!("{}:category:members:{}", CACHE_PREFIX, normalize(category))
}

/// Generate a cache key for a name search.
#[must_use]
pub fn search(query: &str) -> String {
    format!("{}:search:{}", CACHE_PREFIX, normalize(query))
}
