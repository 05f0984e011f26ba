//! Cached API client that wraps ApiClient with transparent caching.

use std::future::Future;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, EntryStatus, QueryKey, QueryOptions};

use super::cache::ApiQueryKey;
use super::client::ApiClient;
use super::error::ApiError;
use super::resource::Resource;
use super::types::{ResourceKind, Stats};

/// Cache options for each collection.
#[derive(Debug, Clone, Default)]
pub struct QueryPolicies {
  pub users: QueryOptions,
  pub posts: QueryOptions,
}

impl QueryPolicies {
  pub fn for_kind(&self, kind: ResourceKind) -> &QueryOptions {
    match kind {
      ResourceKind::Users => &self.users,
      ResourceKind::Posts => &self.posts,
    }
  }
}

/// API client with transparent caching.
///
/// Reads go through the cache. Writes go straight to the service and, once
/// they succeed, invalidate every cached query of the written collection.
#[derive(Clone)]
pub struct CachedApiClient {
  inner: ApiClient,
  cache: CacheLayer,
  policies: QueryPolicies,
}

impl CachedApiClient {
  pub fn new(inner: ApiClient, cache: CacheLayer, policies: QueryPolicies) -> Self {
    Self {
      inner,
      cache,
      policies,
    }
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  /// Read one query through the cache, logging where the answer came from
  async fn read<T, F, Fut>(
    &self,
    key: ApiQueryKey,
    options: &QueryOptions,
    fetcher: F,
  ) -> Result<T, ApiError>
  where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    match self.cache.fetch(&key, options, fetcher).await {
      Ok(result) => {
        let age = Utc::now() - result.fetched_at;
        debug!(
          query = %key.description(),
          source = ?result.source,
          age_secs = age.num_seconds(),
          "query resolved"
        );
        Ok(result.data)
      }
      Err(e) => {
        warn!(
          query = %key.description(),
          status = ?self.status(&key),
          attempts = self.cache.failure_count(&key),
          error = %e,
          "query failed"
        );
        Err(e)
      }
    }
  }

  /// Get a whole collection with caching.
  pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
    let inner = self.inner.clone();
    self
      .read(ApiQueryKey::List(R::KIND), self.policies.for_kind(R::KIND), move || {
        let inner = inner.clone();
        async move { inner.list::<R>().await }
      })
      .await
  }

  /// Get a single record with caching.
  pub async fn get<R: Resource>(&self, id: u64) -> Result<R, ApiError> {
    let inner = self.inner.clone();
    self
      .read(ApiQueryKey::Detail(R::KIND, id), self.policies.for_kind(R::KIND), move || {
        let inner = inner.clone();
        async move { inner.get::<R>(id).await }
      })
      .await
  }

  /// Dashboard figures, cached alongside the users they are derived from.
  pub async fn stats(&self) -> Result<Stats, ApiError> {
    let inner = self.inner.clone();
    self
      .read(ApiQueryKey::Stats, &self.policies.users, move || {
        let inner = inner.clone();
        async move { inner.stats().await }
      })
      .await
  }

  pub async fn create<R: Resource>(&self, data: &R::Create) -> Result<R, ApiError> {
    let created = self.inner.create::<R>(data).await.inspect_err(|e| {
      warn!(kind = R::KIND.label(), error = %e, "create failed");
    })?;
    info!(kind = R::KIND.label(), id = created.id(), "created");
    self.invalidate(R::KIND);
    Ok(created)
  }

  pub async fn update<R: Resource>(&self, update: &R::Update) -> Result<R, ApiError> {
    let updated = self.inner.update::<R>(update).await.inspect_err(|e| {
      warn!(kind = R::KIND.label(), id = R::update_id(update), error = %e, "update failed");
    })?;
    info!(kind = R::KIND.label(), id = updated.id(), "updated");
    self.invalidate(R::KIND);
    Ok(updated)
  }

  pub async fn delete<R: Resource>(&self, id: u64) -> Result<(), ApiError> {
    self.inner.delete::<R>(id).await.inspect_err(|e| {
      warn!(kind = R::KIND.label(), id, error = %e, "delete failed");
    })?;
    info!(kind = R::KIND.label(), id, "deleted");
    self.invalidate(R::KIND);
    Ok(())
  }

  /// Mark every cached query of a collection stale
  pub fn invalidate(&self, kind: ResourceKind) {
    self.cache.invalidate_scope(kind.label());
  }

  /// Make the next read of `key` go to the network even inside its stale time
  pub fn invalidate_query(&self, key: ApiQueryKey) {
    self.cache.invalidate(&key);
  }

  pub fn status(&self, key: &ApiQueryKey) -> EntryStatus {
    self.cache.status(key)
  }
}
