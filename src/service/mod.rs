//! Query Service Module
//!
//! The surface request handlers call into.

mod query;

pub use query::{QueryService, QuerySettings};
