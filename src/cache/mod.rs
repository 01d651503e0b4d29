//! Cache Module
//!
//! Response caching between the query service and the upstream catalog:
//! a thread-safe TTL store, key and expiration policy per entity kind, and the
//! get-or-populate orchestrator.

mod clock;
mod entry;
pub mod keys;
mod lru;
mod orchestrator;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, Priority};
pub use keys::EntityKind;
pub use lru::LruTracker;
pub use orchestrator::CacheOrchestrator;
pub use stats::{CacheReport, CacheStats};
pub use store::CacheStore;
