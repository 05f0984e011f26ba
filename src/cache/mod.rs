//! Generic query cache.
//!
//! This module knows nothing about users or posts. It provides:
//! - keyed entries with a freshness window and a garbage-collection window
//! - deduplication of concurrent fetches of the same key
//! - bounded retry with exponential backoff
//! - scope-wide invalidation after writes

mod config;
mod layer;
mod traits;

pub use config::{QueryOptions, RetryPolicy};
pub use layer::CacheLayer;
pub use traits::{EntryStatus, QueryKey};
