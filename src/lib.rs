//! Dex Cache - a caching query layer for a creature catalog REST API
//!
//! Serves paginated, filterable listings and detail views, caching upstream
//! responses with per-kind expiration.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;
pub mod upstream;

#[cfg(test)]
mod test_support;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
