use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::error::ApiError;
use super::resource::Resource;
use super::transport::{HttpTransport, Transport};
use super::types::{Stats, User};

/// Client for the backing REST service.
///
/// Stateless: every call goes to the network. Caching is layered on top by
/// `CachedApiClient`.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
}

impl ApiClient {
  pub fn new(base_url: Url) -> Self {
    Self::with_transport(Arc::new(HttpTransport::new(base_url)))
  }

  pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
    Self { transport }
  }

  /// Get the whole collection
  pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
    let value = self.transport.send(Method::GET, R::KIND.path(), None).await?;
    Ok(serde_json::from_value(value)?)
  }

  /// Get a single record by id
  pub async fn get<R: Resource>(&self, id: u64) -> Result<R, ApiError> {
    let path = record_path::<R>(id);
    let value = self.transport.send(Method::GET, &path, None).await?;
    Ok(serde_json::from_value(value)?)
  }

  /// Create a record.
  ///
  /// The service does not persist anything, so the echo is normalized with
  /// the submitted data as fallback.
  pub async fn create<R: Resource>(&self, data: &R::Create) -> Result<R, ApiError> {
    let value = self
      .transport
      .send(Method::POST, R::KIND.path(), Some(to_body(data)?))
      .await?;
    let response: R::Response = decode_echo(value)?;
    Ok(R::normalize(response, R::create_as_response(data)))
  }

  /// Update a record.
  ///
  /// Reads the current record first and PUTs the merged result, since the
  /// service echoes incomplete records (no address, no company...). The
  /// merged record then backfills whatever the echo leaves out.
  pub async fn update<R: Resource>(&self, update: &R::Update) -> Result<R, ApiError> {
    let id = R::update_id(update);
    let current = self.get::<R>(id).await?;
    let merged = R::apply(update, &current);

    let path = record_path::<R>(id);
    let value = self
      .transport
      .send(Method::PUT, &path, Some(to_body(&merged)?))
      .await?;
    let response: R::Response = decode_echo(value)?;
    Ok(R::normalize(response, merged.as_response()))
  }

  pub async fn delete<R: Resource>(&self, id: u64) -> Result<(), ApiError> {
    let path = record_path::<R>(id);
    self.transport.send(Method::DELETE, &path, None).await?;
    Ok(())
  }

  /// Dashboard figures, derived from the users collection
  pub async fn stats(&self) -> Result<Stats, ApiError> {
    let users = self.list::<User>().await?;
    Ok(Stats::from_users(&users))
  }
}

fn record_path<R: Resource>(id: u64) -> String {
  format!("{}/{}", R::KIND.path(), id)
}

fn to_body(data: &impl Serialize) -> Result<Value, ApiError> {
  Ok(serde_json::to_value(data)?)
}

/// An empty echo counts as "nothing returned" rather than a decode failure
fn decode_echo<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
  match value {
    Value::Null => Ok(serde_json::from_value(Value::Object(Default::default()))?),
    other => Ok(serde_json::from_value(other)?),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{post_json, user_json, FakeTransport};
  use crate::api::types::{CreatePostData, CreateUserData, Post, UpdatePostData, UpdateUserData};
  use serde_json::json;

  fn client_with(transport: FakeTransport) -> (ApiClient, Arc<FakeTransport>) {
    let transport = Arc::new(transport);
    (ApiClient::with_transport(transport.clone()), transport)
  }

  #[tokio::test]
  async fn test_list_users() {
    let (client, transport) = client_with(FakeTransport::new(|_, _, _| {
      Ok(json!([user_json(1, "Leanne"), user_json(2, "Ervin")]))
    }));

    let users = client.list::<User>().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "Ervin");
    assert_eq!(transport.count(&Method::GET, "/users"), 1);
  }

  #[tokio::test]
  async fn test_status_error_propagates() {
    let (client, _) = client_with(FakeTransport::new(|_, path, _| {
      Err(ApiError::status(404, path))
    }));

    let err = client.get::<Post>(999).await.unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn test_create_user_backfills_missing_fields() {
    let (client, transport) = client_with(FakeTransport::new(|_, _, _| Ok(json!({"id": 11}))));

    let data = CreateUserData {
      name: "Ada Lovelace".to_string(),
      username: "ada".to_string(),
      email: "ada@example.com".to_string(),
      phone: "555-0100".to_string(),
      website: String::new(),
    };
    let user = client.create::<User>(&data).await.unwrap();

    assert_eq!(user.id, 11);
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.company.name, "Unknown");
    assert_eq!(user.address.city, "");

    let calls = transport.calls();
    assert_eq!(calls[0].0, Method::POST);
    assert_eq!(calls[0].2.as_ref().unwrap()["username"], "ada");
  }

  #[tokio::test]
  async fn test_create_post_with_empty_echo() {
    let (client, _) = client_with(FakeTransport::new(|_, _, _| Ok(Value::Null)));

    let data = CreatePostData {
      user_id: 1,
      title: "Hello".to_string(),
      body: "World!".to_string(),
    };
    let post = client.create::<Post>(&data).await.unwrap();
    assert_eq!(post.id, 0);
    assert_eq!(post.user_id, 1);
    assert_eq!(post.title, "Hello");
  }

  #[tokio::test]
  async fn test_update_post_keeps_body_omitted_by_echo() {
    let (client, transport) = client_with(FakeTransport::new(|method, _, _| {
      if *method == Method::GET {
        Ok(post_json(3, 1, "ea molestias", "et iusto sed quo iure"))
      } else {
        // The echo leaves out the body
        Ok(json!({"id": 3, "title": "X"}))
      }
    }));

    let update = UpdatePostData {
      id: 3,
      title: Some("X".to_string()),
      ..Default::default()
    };
    let post = client.update::<Post>(&update).await.unwrap();

    assert_eq!(post.title, "X");
    assert_eq!(post.body, "et iusto sed quo iure");
    assert_eq!(post.user_id, 1);

    // Read-then-write, with the merged record as payload
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[0].0.clone(), calls[0].1.as_str()), (Method::GET, "/posts/3"));
    assert_eq!((calls[1].0.clone(), calls[1].1.as_str()), (Method::PUT, "/posts/3"));
    assert_eq!(calls[1].2.as_ref().unwrap()["body"], "et iusto sed quo iure");
  }

  #[tokio::test]
  async fn test_update_user_preserves_address_and_company() {
    let (client, _) = client_with(FakeTransport::new(|method, _, _| {
      if *method == Method::GET {
        Ok(user_json(2, "Ervin"))
      } else {
        Ok(json!({"id": 2, "name": "Ervin Howell"}))
      }
    }));

    let update = UpdateUserData {
      id: 2,
      name: Some("Ervin Howell".to_string()),
      ..Default::default()
    };
    let user = client.update::<User>(&update).await.unwrap();
    assert_eq!(user.name, "Ervin Howell");
    assert_eq!(user.company.name, "Romaguera-Crona");
    assert_eq!(user.address.city, "Gwenborough");
    assert_eq!(user.username, "ervin");
  }

  #[tokio::test]
  async fn test_update_fails_when_record_lookup_fails() {
    let (client, transport) = client_with(FakeTransport::new(|_, path, _| {
      Err(ApiError::status(404, path))
    }));

    let update = UpdatePostData {
      id: 404,
      ..Default::default()
    };
    assert!(client.update::<Post>(&update).await.is_err());
    // No write after a failed read
    assert_eq!(transport.count(&Method::PUT, "/posts/404"), 0);
  }

  #[tokio::test]
  async fn test_delete_sends_delete() {
    let (client, transport) = client_with(FakeTransport::new(|_, _, _| Ok(json!({}))));

    client.delete::<User>(5).await.unwrap();
    assert_eq!(transport.count(&Method::DELETE, "/users/5"), 1);
  }

  #[tokio::test]
  async fn test_stats_counts_users() {
    let (client, _) = client_with(FakeTransport::new(|_, _, _| {
      Ok(Value::Array((1..=10).map(|i| user_json(i, "U")).collect()))
    }));

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_users, 10);
    assert_eq!(stats.active_users, 8);
  }
}
