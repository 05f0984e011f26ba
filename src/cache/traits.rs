//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Identifies one cached query.
pub trait QueryKey: Send + Sync {
  /// Stable lookup key for this query (e.g. "users:list")
  fn cache_hash(&self) -> String;

  /// Group of queries invalidated together (e.g. every "users" query)
  fn scope(&self) -> &'static str;

  /// Human-readable description for logs
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was fetched from the network
  pub fetched_at: DateTime<Utc>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      fetched_at,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      fetched_at,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// A network fetch completed for this request (possibly shared with other requesters)
  Network,
  /// Served from cache within the freshness window
  Cache,
}

/// Lifecycle state of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
  /// Nothing cached
  Empty,
  /// A fetch is in flight
  Loading,
  /// Cached value inside its freshness window
  Fresh,
  /// Cached value that will be refetched on next read
  Stale,
  /// The last fetch failed after exhausting its retries
  Error(String),
}
