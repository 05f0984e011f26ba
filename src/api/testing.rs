//! In-process transport for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use super::error::ApiError;
use super::transport::Transport;

type Handler = Box<dyn Fn(&Method, &str, Option<&Value>) -> Result<Value, ApiError> + Send + Sync>;

/// Records every request and answers with a scripted handler.
pub struct FakeTransport {
  handler: Handler,
  calls: Mutex<Vec<(Method, String, Option<Value>)>>,
  delay: Duration,
}

impl FakeTransport {
  pub fn new<H>(handler: H) -> Self
  where
    H: Fn(&Method, &str, Option<&Value>) -> Result<Value, ApiError> + Send + Sync + 'static,
  {
    Self {
      handler: Box::new(handler),
      calls: Mutex::new(Vec::new()),
      delay: Duration::ZERO,
    }
  }

  /// Hold every response for `delay`, to keep requests in flight
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
    self.calls.lock().unwrap().clone()
  }

  pub fn count(&self, method: &Method, path: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|(m, p, _)| m == method && p == path)
      .count()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
    self
      .calls
      .lock()
      .unwrap()
      .push((method.clone(), path.to_string(), body.clone()));
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    (self.handler)(&method, path, body.as_ref())
  }
}

pub fn user_json(id: u64, name: &str) -> Value {
  json!({
    "id": id,
    "name": name,
    "username": name.to_lowercase(),
    "email": format!("{}@example.com", name.to_lowercase()),
    "address": {
      "street": "Kulas Light",
      "suite": "Apt. 556",
      "city": "Gwenborough",
      "zipcode": "92998-3874",
      "geo": { "lat": "-37.3159", "lng": "81.1496" }
    },
    "phone": "1-770-736-8031",
    "website": "example.org",
    "company": { "name": "Romaguera-Crona", "catchPhrase": "Multi-layered", "bs": "e-markets" }
  })
}

pub fn post_json(id: u64, user_id: u64, title: &str, body: &str) -> Value {
  json!({ "userId": user_id, "id": id, "title": title, "body": body })
}
