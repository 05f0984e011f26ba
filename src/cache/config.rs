//! Per-query cache options

use std::time::Duration;

/// How long a query result lives in the cache and how its fetch is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
  /// A cached value younger than this is served without refetching
  pub stale_time: Duration,
  /// An entry nobody has read for this long is dropped by `gc`
  pub gc_time: Duration,
  pub retry: RetryPolicy,
}

impl Default for QueryOptions {
  fn default() -> Self {
    Self {
      stale_time: Duration::from_secs(60),
      gc_time: Duration::from_secs(300),
      retry: RetryPolicy::default(),
    }
  }
}

impl QueryOptions {
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
    self.gc_time = gc_time;
    self
  }

  pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Attempts after the first one
  pub max_retries: u32,
  /// Delay before the first retry, doubled for each one after
  pub initial_delay: Duration,
  pub max_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 3,
      initial_delay: Duration::from_secs(1),
      max_delay: Duration::from_secs(30),
    }
  }
}

impl RetryPolicy {
  #[cfg(test)]
  pub fn no_retry() -> Self {
    Self {
      max_retries: 0,
      ..Default::default()
    }
  }

  /// Retries without waiting in between
  #[cfg(test)]
  pub fn immediate(max_retries: u32) -> Self {
    Self {
      max_retries,
      initial_delay: Duration::ZERO,
      max_delay: Duration::ZERO,
    }
  }

  /// Delay before retry number `attempt` (0-based)
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    self
      .initial_delay
      .checked_mul(factor)
      .unwrap_or(self.max_delay)
      .min(self.max_delay)
  }
}
