//! Async query and mutation handles for views.
//!
//! Views live on the UI thread and cannot await. A `Query<T>` runs its
//! fetcher on a spawned task and hands the result back over a channel that
//! the view polls on every tick. Caching and deduplication happen below, in
//! `CachedApiClient`; a query only tracks what one view is showing.
//!
//! ```ignore
//! let api = api.clone();
//! let mut query = Query::new(move || {
//!     let api = api.clone();
//!     async move { api.list::<User>().await }
//! });
//!
//! query.fetch();
//!
//! // In tick
//! if query.poll() {
//!     // State changed, re-render
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::oneshot;

use crate::api::ApiError;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is fetching and has no data to show yet
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed after the cache exhausted its retries
  Error(ApiError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&ApiError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// One spawned request whose outcome the UI thread picks up later.
///
/// Dropping it abandons the outcome; the task itself runs to completion.
struct InFlight<T> {
  receiver: oneshot::Receiver<Result<T, ApiError>>,
}

impl<T: Send + 'static> InFlight<T> {
  fn spawn<Fut>(future: Fut) -> Self
  where
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let (tx, receiver) = oneshot::channel();
    tokio::spawn(async move {
      // The receiver may be gone
      let _ = tx.send(future.await);
    });
    Self { receiver }
  }

  /// `None` while the task is still running
  fn try_take(&mut self) -> Option<Result<T, ApiError>> {
    match self.receiver.try_recv() {
      Ok(result) => Some(result),
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => Some(Err(ApiError::Cancelled)),
    }
  }
}

/// Async query with state management.
///
/// A refetch keeps the previous data visible: `state()` stays `Success`
/// while `is_fetching()` reports the request in flight.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  in_flight: Option<InFlight<T>>,
}

impl<T: Send + 'static> Query<T> {
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      in_flight: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Loading with nothing to show yet
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// A request is in flight, with or without previous data
  pub fn is_fetching(&self) -> bool {
    self.in_flight.is_some()
  }

  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  pub fn error(&self) -> Option<&ApiError> {
    self.state.error()
  }

  /// Start fetching unless a fetch is already in flight.
  pub fn fetch(&mut self) {
    if !self.is_fetching() {
      self.start_fetch();
    }
  }

  /// Fetch again, dropping the result of any pending fetch.
  pub fn refetch(&mut self) {
    self.start_fetch();
  }

  /// Pick up the result of a pending fetch.
  ///
  /// Returns `true` if the state changed. Call this in the tick handler.
  pub fn poll(&mut self) -> bool {
    let Some(outcome) = self.in_flight.as_mut().and_then(InFlight::try_take) else {
      return false;
    };
    self.in_flight = None;
    self.state = match outcome {
      Ok(data) => QueryState::Success(data),
      Err(error) => QueryState::Error(error),
    };
    true
  }

  fn start_fetch(&mut self) {
    if !self.state.is_success() {
      self.state = QueryState::Loading;
    }
    self.in_flight = Some(InFlight::spawn((self.fetcher)()));
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetching", &self.in_flight.is_some())
      .finish_non_exhaustive()
  }
}

/// A write started by a user action.
///
/// Holds at most one request; starting another while one is pending is
/// refused, so writes are serialized per view.
pub struct Mutation<T> {
  in_flight: Option<InFlight<T>>,
}

impl<T> Default for Mutation<T> {
  fn default() -> Self {
    Self { in_flight: None }
  }
}

impl<T: Send + 'static> Mutation<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_pending(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Run `future` unless a write is already pending. Returns whether it started.
  pub fn start<Fut>(&mut self, future: Fut) -> bool
  where
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    if self.is_pending() {
      return false;
    }
    self.in_flight = Some(InFlight::spawn(future));
    true
  }

  /// The outcome, once the write has finished
  pub fn poll(&mut self) -> Option<Result<T, ApiError>> {
    let outcome = self.in_flight.as_mut()?.try_take()?;
    self.in_flight = None;
    Some(outcome)
  }
}
