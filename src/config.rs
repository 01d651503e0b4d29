//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream catalog API
    pub api_base_url: String,
    /// Per-request timeout for upstream calls, in seconds
    pub upstream_timeout: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Maximum number of entries the cache store holds before compaction
    pub max_entries: usize,
    /// Maximum category members fetched for a category listing
    pub fan_out_limit: usize,
    /// Maximum upstream fetches in flight for one fan-out
    pub fan_out_concurrency: usize,
    /// Highest id covered by the bulk invalidation sweep
    pub invalidate_sweep_max_id: u32,
    /// Number of categories requested from the category endpoint
    pub category_list_limit: usize,
    /// Maximum names returned by a prefix search
    pub search_result_limit: usize,
    /// Preferred language for localized species text
    pub preferred_language: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CATALOG_API_BASE_URL` - Upstream base URL (default: https://pokeapi.co/api/v2)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 30)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `MAX_ENTRIES` - Cache capacity before compaction (default: 10000)
    /// - `FAN_OUT_LIMIT` - Category member cap (default: 200)
    /// - `FAN_OUT_CONCURRENCY` - Concurrent fetches per fan-out (default: 32)
    /// - `INVALIDATE_SWEEP_MAX_ID` - Upper id for bulk invalidation (default: 1000)
    /// - `CATEGORY_LIST_LIMIT` - Categories requested (default: 20)
    /// - `SEARCH_RESULT_LIMIT` - Prefix search cap (default: 10)
    /// - `PREFERRED_LANGUAGE` - Language for species text (default: en)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("CATALOG_API_BASE_URL").unwrap_or(defaults.api_base_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            fan_out_limit: env_or("FAN_OUT_LIMIT", defaults.fan_out_limit),
            fan_out_concurrency: env_or("FAN_OUT_CONCURRENCY", defaults.fan_out_concurrency)
                .max(1),
            invalidate_sweep_max_id: env_or(
                "INVALIDATE_SWEEP_MAX_ID",
                defaults.invalidate_sweep_max_id,
            ),
            category_list_limit: env_or("CATEGORY_LIST_LIMIT", defaults.category_list_limit),
            search_result_limit: env_or("SEARCH_RESULT_LIMIT", defaults.search_result_limit),
            preferred_language: env::var("PREFERRED_LANGUAGE")
                .unwrap_or(defaults.preferred_language),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://pokeapi.co/api/v2".to_string(),
            upstream_timeout: 30,
            server_port: 3000,
            cleanup_interval: 60,
            max_entries: 10_000,
            fan_out_limit: 200,
            fan_out_concurrency: 32,
            invalidate_sweep_max_id: 1000,
            category_list_limit: 20,
            search_result_limit: 10,
            preferred_language: "en".to_string(),
        }
    }
}
