//! HTTP boundary of the API client.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use super::error::ApiError;

/// Sends one JSON request and returns the decoded JSON response.
///
/// Non-2xx responses are errors. An empty body decodes to `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError>;
}

/// `reqwest` transport against a fixed base endpoint
pub struct HttpTransport {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(base_url: Url) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url,
    }
  }

  fn url_for(&self, path: &str) -> String {
    format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
    let url = self.url_for(path);
    debug!(%method, %url, "api request");

    let mut request = self
      .client
      .request(method.clone(), &url)
      .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(body) = body {
      request = request.body(serde_json::to_vec(&body)?);
    }

    let response = request.send().await.map_err(|e| {
      error!(%method, %url, error = %e, "API request failed");
      ApiError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
      error!(%method, %url, status = status.as_u16(), "API request failed");
      return Err(ApiError::status(status.as_u16(), url));
    }

    let bytes = response.bytes().await.map_err(|e| {
      error!(%method, %url, error = %e, "API response body unreadable");
      ApiError::from(e)
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(|e| {
      error!(%method, %url, error = %e, "API response is not JSON");
      ApiError::from(e)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_url_for_joins_without_double_slash() {
    let transport = HttpTransport::new(Url::parse("https://api.example.test/").unwrap());
    assert_eq!(transport.url_for("/users/3"), "https://api.example.test/users/3");

    let transport = HttpTransport::new(Url::parse("https://api.example.test/v1").unwrap());
    assert_eq!(transport.url_for("/posts"), "https://api.example.test/v1/posts");
  }
}
