//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, warn};

use super::config::{QueryOptions, RetryPolicy};
use super::traits::{CacheResult, EntryStatus, QueryKey};
use crate::api::ApiError;

/// A fetch that any number of requesters can await
type SharedFetch = Shared<BoxFuture<'static, Result<(Value, DateTime<Utc>), ApiError>>>;

struct CacheEntry {
  scope: &'static str,
  options: QueryOptions,
  value: Option<Value>,
  fetched_at: Option<(Instant, DateTime<Utc>)>,
  invalidated: bool,
  /// Bumped on every invalidation so a fetch started before it cannot mark the entry fresh
  generation: u64,
  error: Option<ApiError>,
  failure_count: u32,
  inflight: Option<SharedFetch>,
  /// Identifies the fetch in `inflight`; results of any other fetch are dropped
  fetch_id: u64,
  last_used: Instant,
}

impl CacheEntry {
  fn new(scope: &'static str, options: QueryOptions) -> Self {
    Self {
      scope,
      options,
      value: None,
      fetched_at: None,
      invalidated: false,
      generation: 0,
      error: None,
      failure_count: 0,
      inflight: None,
      fetch_id: 0,
      last_used: Instant::now(),
    }
  }

  fn is_fresh(&self) -> bool {
    match (&self.value, self.fetched_at) {
      (Some(_), Some((at, _))) => !self.invalidated && at.elapsed() < self.options.stale_time,
      _ => false,
    }
  }

  fn status(&self) -> EntryStatus {
    if self.inflight.is_some() {
      EntryStatus::Loading
    } else if let Some(error) = &self.error {
      EntryStatus::Error(error.to_string())
    } else if self.value.is_none() {
      EntryStatus::Empty
    } else if self.is_fresh() {
      EntryStatus::Fresh
    } else {
      EntryStatus::Stale
    }
  }
}

enum Lookup {
  Fresh(Value, DateTime<Utc>),
  Pending(SharedFetch),
}

/// Keyed in-memory query cache.
///
/// - serves a value without refetching while it is inside its stale time
/// - shares one in-flight fetch between all concurrent requesters of a key
/// - retries failed fetches with backoff before reporting the error
/// - `invalidate_scope` forces the next read of every key in a scope to refetch
///
/// Construct one at startup and pass clones around; clones share state.
#[derive(Clone, Default)]
pub struct CacheLayer {
  entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
  /// Layer-wide, so ids stay unique across `clear` and `gc`
  next_fetch_id: Arc<AtomicU64>,
}

impl CacheLayer {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // Entries stay consistent even if a holder panicked: every write is a single assignment
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Read a query through the cache.
  ///
  /// Fresh values are returned immediately. Otherwise the fetch already in
  /// flight for this key is joined, or a new one is started. The fetch runs
  /// on its own task, so dropping this future does not cancel it.
  pub async fn fetch<K, T, F, Fut>(
    &self,
    key: &K,
    options: &QueryOptions,
    fetcher: F,
  ) -> Result<CacheResult<T>, ApiError>
  where
    K: QueryKey,
    T: Serialize + DeserializeOwned + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    match self.lookup_or_start(key, options, fetcher) {
      Lookup::Fresh(value, fetched_at) => {
        debug!(query = %key.description(), "cache hit");
        Ok(CacheResult::from_cache(serde_json::from_value(value)?, fetched_at))
      }
      Lookup::Pending(fetch) => {
        let (value, fetched_at) = fetch.await?;
        Ok(CacheResult::from_network(
          serde_json::from_value(value)?,
          fetched_at,
        ))
      }
    }
  }

  fn lookup_or_start<K, T, F, Fut>(&self, key: &K, options: &QueryOptions, fetcher: F) -> Lookup
  where
    K: QueryKey,
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let hash = key.cache_hash();
    let mut entries = self.lock();
    let entry = entries
      .entry(hash.clone())
      .or_insert_with(|| CacheEntry::new(key.scope(), options.clone()));
    entry.options = options.clone();
    entry.last_used = Instant::now();

    if entry.is_fresh() {
      if let (Some(value), Some((_, wall))) = (&entry.value, entry.fetched_at) {
        return Lookup::Fresh(value.clone(), wall);
      }
    }

    if let Some(fetch) = &entry.inflight {
      debug!(query = %key.description(), "joining in-flight fetch");
      return Lookup::Pending(fetch.clone());
    }

    debug!(query = %key.description(), "fetching");
    let fetch_id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed) + 1;
    let fetch = self.start_fetch(hash, fetch_id, entry.generation, options.retry.clone(), fetcher);
    entry.inflight = Some(fetch.clone());
    entry.fetch_id = fetch_id;
    Lookup::Pending(fetch)
  }

  fn start_fetch<T, F, Fut>(
    &self,
    hash: String,
    fetch_id: u64,
    generation: u64,
    retry: RetryPolicy,
    fetcher: F,
  ) -> SharedFetch
  where
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let cache = self.clone();
    let handle = tokio::spawn(async move {
      let (result, failures) = fetch_with_retry(&retry, &hash, &fetcher).await;
      let result = result.and_then(|data| Ok((serde_json::to_value(data)?, Utc::now())));
      cache.complete(&hash, fetch_id, generation, &result, failures);
      result
    });

    async move { handle.await.unwrap_or(Err(ApiError::Cancelled)) }
      .boxed()
      .shared()
  }

  fn complete(
    &self,
    hash: &str,
    fetch_id: u64,
    generation: u64,
    result: &Result<(Value, DateTime<Utc>), ApiError>,
    failures: u32,
  ) {
    let mut entries = self.lock();
    // Cleared or collected while the fetch was running, possibly with a newer
    // fetch of the same key started since; only the current fetch may land
    let Some(entry) = entries
      .get_mut(hash)
      .filter(|e| e.inflight.is_some() && e.fetch_id == fetch_id)
    else {
      debug!(query = hash, "dropping result of an abandoned fetch");
      return;
    };

    entry.inflight = None;
    entry.failure_count = failures;
    entry.last_used = Instant::now();
    match result {
      Ok((value, wall)) => {
        entry.value = Some(value.clone());
        entry.fetched_at = Some((Instant::now(), *wall));
        entry.error = None;
        entry.invalidated = entry.generation != generation;
      }
      Err(error) => {
        entry.error = Some(error.clone());
      }
    }
  }

  /// Mark one query stale
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    if let Some(entry) = self.lock().get_mut(&key.cache_hash()) {
      entry.invalidated = true;
      entry.generation += 1;
    }
  }

  /// Mark every query in `scope` stale. Returns how many entries were affected.
  pub fn invalidate_scope(&self, scope: &str) -> usize {
    let mut count = 0;
    for entry in self.lock().values_mut().filter(|e| e.scope == scope) {
      entry.invalidated = true;
      entry.generation += 1;
      count += 1;
    }
    debug!(scope, count, "invalidated");
    count
  }

  /// Drop entries unused for longer than their gc time. In-flight entries are kept.
  pub fn gc(&self) -> usize {
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|_, e| e.inflight.is_some() || e.last_used.elapsed() < e.options.gc_time);
    let removed = before - entries.len();
    if removed > 0 {
      debug!(removed, "cache gc");
    }
    removed
  }

  /// Drop everything
  pub fn clear(&self) {
    self.lock().clear();
  }

  pub fn status<K: QueryKey>(&self, key: &K) -> EntryStatus {
    self
      .lock()
      .get(&key.cache_hash())
      .map(CacheEntry::status)
      .unwrap_or(EntryStatus::Empty)
  }

  /// Failed attempts of the last completed fetch for `key`
  pub fn failure_count<K: QueryKey>(&self, key: &K) -> u32 {
    self
      .lock()
      .get(&key.cache_hash())
      .map(|e| e.failure_count)
      .unwrap_or(0)
  }

  /// Number of cached queries, live or not
  pub fn entry_count(&self) -> usize {
    self.lock().len()
  }
}

/// Run `fetcher`, retrying retryable failures up to the policy's bound.
/// Returns the final result and the number of failed attempts.
async fn fetch_with_retry<T, F, Fut>(
  policy: &RetryPolicy,
  label: &str,
  fetcher: &F,
) -> (Result<T, ApiError>, u32)
where
  F: Fn() -> Fut,
  Fut: Future<Output = Result<T, ApiError>>,
{
  let mut failures = 0;
  loop {
    match fetcher().await {
      Ok(data) => return (Ok(data), failures),
      Err(e) if e.is_retryable() && failures < policy.max_retries => {
        let delay = policy.delay_for(failures);
        failures += 1;
        warn!(query = label, attempt = failures, error = %e, ?delay, "fetch failed, retrying");
        if !delay.is_zero() {
          tokio::time::sleep(delay).await;
        }
      }
      Err(e) => return (Err(e), failures + 1),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::super::traits::CacheSource;
  use super::*;
  use std::sync::atomic::AtomicU32;
  use std::time::Duration;

  struct Key(&'static str, &'static str);

  impl QueryKey for Key {
    fn cache_hash(&self) -> String {
      format!("{}:{}", self.0, self.1)
    }

    fn scope(&self) -> &'static str {
      self.0
    }

    fn description(&self) -> String {
      self.cache_hash()
    }
  }

  fn options() -> QueryOptions {
    QueryOptions::default()
      .with_stale_time(Duration::from_secs(60))
      .with_retry(RetryPolicy::immediate(3))
  }

  /// Fetcher returning the call number, so every network hit is observable
  fn counting(counter: Arc<AtomicU32>) -> impl Fn() -> BoxFuture<'static, Result<u32, ApiError>> + Send + Sync {
    move || {
      let counter = counter.clone();
      async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }.boxed()
    }
  }

  #[tokio::test]
  async fn test_fresh_value_is_served_without_refetch() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("users", "list");

    let first = cache.fetch(&key, &options(), counting(calls.clone())).await.unwrap();
    let second = cache.fetch(&key, &options(), counting(calls.clone())).await.unwrap();

    assert_eq!(first.data, 1);
    assert_eq!(second.data, 1);
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.status(&key), EntryStatus::Fresh);
  }

  #[tokio::test]
  async fn test_stale_value_is_refetched() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("posts", "list");
    let opts = options().with_stale_time(Duration::ZERO);

    cache.fetch(&key, &opts, counting(calls.clone())).await.unwrap();
    assert_eq!(cache.status(&key), EntryStatus::Stale);

    let second = cache.fetch(&key, &opts, counting(calls.clone())).await.unwrap();
    assert_eq!(second.data, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_concurrent_reads_share_one_fetch() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("users", "list");

    let slow = {
      let calls = calls.clone();
      move || {
        let calls = calls.clone();
        async move {
          tokio::time::sleep(Duration::from_millis(50)).await;
          Ok::<_, ApiError>(calls.fetch_add(1, Ordering::SeqCst) + 1)
        }
      }
    };

    let opts = options();
    let (a, b) = tokio::join!(
      cache.fetch(&key, &opts, slow.clone()),
      cache.fetch(&key, &opts, slow),
    );

    assert_eq!(a.unwrap().data, 1);
    assert_eq!(b.unwrap().data, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_invalidate_scope_forces_refetch() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let users = Key("users", "list");
    let posts = Key("posts", "list");

    cache.fetch(&users, &options(), counting(calls.clone())).await.unwrap();
    cache.fetch(&posts, &options(), counting(calls.clone())).await.unwrap();

    assert_eq!(cache.invalidate_scope("users"), 1);
    assert_eq!(cache.status(&users), EntryStatus::Stale);
    assert_eq!(cache.status(&posts), EntryStatus::Fresh);

    let refetched = cache.fetch(&users, &options(), counting(calls.clone())).await.unwrap();
    assert_eq!(refetched.data, 3);
    assert_eq!(cache.status(&users), EntryStatus::Fresh);
  }

  #[tokio::test]
  async fn test_invalidation_during_fetch_keeps_entry_stale() {
    let cache = CacheLayer::new();
    let key = Key("users", "list");

    let slow = || async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok::<_, ApiError>(1u32)
    };

    let opts = options();
    let pending = cache.fetch(&key, &opts, slow);
    let invalidate = async {
      tokio::time::sleep(Duration::from_millis(10)).await;
      cache.invalidate(&key);
    };
    let (result, _) = tokio::join!(pending, invalidate);

    assert_eq!(result.unwrap().data, 1);
    assert_eq!(cache.status(&key), EntryStatus::Stale);
  }

  #[tokio::test]
  async fn test_retries_then_succeeds() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("users", "list");

    let flaky = {
      let calls = calls.clone();
      move || {
        let calls = calls.clone();
        async move {
          if calls.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(ApiError::status(503, "/users"))
          } else {
            Ok(42u32)
          }
        }
      }
    };

    let result = cache.fetch(&key, &options(), flaky).await.unwrap();
    assert_eq!(result.data, 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.failure_count(&key), 2);
  }

  #[tokio::test]
  async fn test_error_surfaces_after_exhausting_retries() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("posts", "list");

    let failing = {
      let calls = calls.clone();
      move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<u32, _>(ApiError::Transport("connection refused".into())) }
      }
    };

    let err = cache.fetch(&key, &options(), failing).await.unwrap_err();
    assert_eq!(err, ApiError::Transport("connection refused".into()));
    // First attempt plus three retries
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(matches!(cache.status(&key), EntryStatus::Error(_)));

    // Error -> Loading -> Fresh on the next read
    let ok = cache.fetch(&key, &options(), || async { Ok::<_, ApiError>(7u32) }).await;
    assert_eq!(ok.unwrap().data, 7);
    assert_eq!(cache.status(&key), EntryStatus::Fresh);
  }

  #[tokio::test]
  async fn test_decode_errors_are_not_retried() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("posts", "list");

    let broken = {
      let calls = calls.clone();
      move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<u32, _>(ApiError::Decode("expected array".into())) }
      }
    };

    assert!(cache.fetch(&key, &options(), broken).await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_gc_drops_unused_entries() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("users", "list");
    let opts = options().with_gc_time(Duration::ZERO);

    cache.fetch(&key, &opts, counting(calls.clone())).await.unwrap();
    assert_eq!(cache.gc(), 1);
    assert_eq!(cache.status(&key), EntryStatus::Empty);
    assert_eq!(cache.entry_count(), 0);

    cache.fetch(&key, &opts, counting(calls.clone())).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_gc_keeps_recent_entries() {
    let cache = CacheLayer::new();
    let key = Key("users", "list");

    cache
      .fetch(&key, &options(), || async { Ok::<_, ApiError>(1u32) })
      .await
      .unwrap();
    assert_eq!(cache.gc(), 0);
    assert_eq!(cache.entry_count(), 1);
  }

  #[tokio::test]
  async fn test_fetch_abandoned_by_clear_does_not_land_on_newer_fetch() {
    let cache = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let key = Key("users", "list");
    let opts = options();

    // The first fetch is faster than the second, so it finishes while the
    // second is still in flight
    let timed = {
      let calls = calls.clone();
      move || {
        let calls = calls.clone();
        async move {
          let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
          let delay = if n == 1 { 40 } else { 120 };
          tokio::time::sleep(Duration::from_millis(delay)).await;
          Ok::<_, ApiError>(n)
        }
      }
    };

    let first = tokio::spawn({
      let cache = cache.clone();
      let timed = timed.clone();
      async move { cache.fetch(&Key("users", "list"), &options(), timed).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.clear();

    let second = tokio::spawn({
      let cache = cache.clone();
      let timed = timed.clone();
      async move { cache.fetch(&Key("users", "list"), &options(), timed).await }
    });
    tokio::time::sleep(Duration::from_millis(60)).await;

    // The first fetch has completed, the second is still running
    assert_eq!(first.await.unwrap().unwrap().data, 1);
    assert_eq!(cache.status(&key), EntryStatus::Loading);

    let third = cache.fetch(&key, &opts, timed).await.unwrap();
    assert_eq!(third.data, 2);
    assert_eq!(third.source, CacheSource::Network);
    assert_eq!(second.await.unwrap().unwrap().data, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.status(&key), EntryStatus::Fresh);
  }

  #[tokio::test]
  async fn test_dropped_requester_does_not_cancel_fetch() {
    let cache = CacheLayer::new();
    let key = Key("users", "list");

    let slow = || async {
      tokio::time::sleep(Duration::from_millis(30)).await;
      Ok::<_, ApiError>(5u32)
    };

    // Give up on the read before the fetch finishes
    let _ = tokio::time::timeout(
      Duration::from_millis(5),
      cache.fetch(&key, &options(), slow),
    )
    .await;
    assert_eq!(cache.status(&key), EntryStatus::Loading);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.status(&key), EntryStatus::Fresh);
  }
}
