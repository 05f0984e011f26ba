//! Error types for the remote resource API.

/// Failure of a call against the backing REST service.
///
/// The backing service does not distinguish a missing record from any other
/// failed status, so "not found" is just a `Status` with code 404.
/// `Clone` because every waiter on a deduplicated fetch receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
  /// Non-2xx response.
  #[error("HTTP error! status: {status} ({url})")]
  Status { status: u16, url: String },

  /// The request never produced a response (DNS, TLS, connection reset...).
  #[error("Request failed: {0}")]
  Transport(String),

  /// The response body did not have the expected shape.
  #[error("Invalid response body: {0}")]
  Decode(String),

  /// The task running the request went away before producing a result.
  #[error("Request was cancelled")]
  Cancelled,
}

impl ApiError {
  pub fn status(status: u16, url: impl Into<String>) -> Self {
    Self::Status {
      status,
      url: url.into(),
    }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Status { status: 404, .. })
  }

  /// Whether another attempt could plausibly succeed
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Status { .. } | Self::Transport(_))
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    Self::Decode(e.to_string())
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    match e.status() {
      Some(status) => Self::status(
        status.as_u16(),
        e.url().map(|u| u.to_string()).unwrap_or_default(),
      ),
      None if e.is_decode() => Self::Decode(e.to_string()),
      None => Self::Transport(e.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_not_found_is_a_status_error() {
    assert!(ApiError::status(404, "/users/99").is_not_found());
    assert!(!ApiError::status(500, "/users").is_not_found());
    assert!(!ApiError::Transport("reset".into()).is_not_found());
  }

  #[test]
  fn test_only_network_failures_are_retryable() {
    assert!(ApiError::status(500, "/users").is_retryable());
    assert!(ApiError::Transport("timeout".into()).is_retryable());
    assert!(!ApiError::Decode("expected array".into()).is_retryable());
    assert!(!ApiError::Cancelled.is_retryable());
  }

  #[test]
  fn test_status_message_mentions_code() {
    let err = ApiError::status(503, "https://example.test/posts");
    assert_eq!(
      err.to_string(),
      "HTTP error! status: 503 (https://example.test/posts)"
    );
  }
}
