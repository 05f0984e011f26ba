use serde::{de::DeserializeOwned, Serialize};

use crate::table::Row;

use super::api_types::{PostResponse, UserResponse};
use super::types::{
  CreatePostData, CreateUserData, Post, ResourceKind, UpdatePostData, UpdateUserData, User,
};

/// A record type served by one of the service's collections.
///
/// Ties a domain record to its wire types so the client and the cache can
/// work over any collection with the same code.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// What the service echoes back for this record (any field may be missing)
  type Response: DeserializeOwned + Send + 'static;
  /// Payload for creating a record
  type Create: Serialize + Send + Sync + 'static;
  /// Payload for a partial update, carrying the target id
  type Update: Serialize + Send + Sync + 'static;

  const KIND: ResourceKind;

  fn id(&self) -> u64;

  fn update_id(update: &Self::Update) -> u64;

  /// The full record after applying `update` to `current`
  fn apply(update: &Self::Update, current: &Self) -> Self;

  /// Build a complete record from an echo, taking missing fields from
  /// `fallback` and then from the documented defaults.
  fn normalize(response: Self::Response, fallback: Self::Response) -> Self;

  fn as_response(&self) -> Self::Response;

  fn create_as_response(data: &Self::Create) -> Self::Response;
}

impl Resource for User {
  type Response = UserResponse;
  type Create = CreateUserData;
  type Update = UpdateUserData;

  const KIND: ResourceKind = ResourceKind::Users;

  fn id(&self) -> u64 {
    self.id
  }

  fn update_id(update: &UpdateUserData) -> u64 {
    update.id
  }

  fn apply(update: &UpdateUserData, current: &User) -> User {
    update.apply(current)
  }

  fn normalize(response: UserResponse, fallback: UserResponse) -> User {
    response.or(fallback).into_user()
  }

  fn as_response(&self) -> UserResponse {
    UserResponse::from(self)
  }

  fn create_as_response(data: &CreateUserData) -> UserResponse {
    UserResponse::from(data)
  }
}

impl Resource for Post {
  type Response = PostResponse;
  type Create = CreatePostData;
  type Update = UpdatePostData;

  const KIND: ResourceKind = ResourceKind::Posts;

  fn id(&self) -> u64 {
    self.id
  }

  fn update_id(update: &UpdatePostData) -> u64 {
    update.id
  }

  fn apply(update: &UpdatePostData, current: &Post) -> Post {
    update.apply(current)
  }

  fn normalize(response: PostResponse, fallback: PostResponse) -> Post {
    response.or(fallback).into_post()
  }

  fn as_response(&self) -> PostResponse {
    PostResponse::from(self)
  }

  fn create_as_response(data: &CreatePostData) -> PostResponse {
    PostResponse::from(data)
  }
}

impl Row for User {
  fn row_id(&self) -> u64 {
    self.id
  }
}

impl Row for Post {
  fn row_id(&self) -> u64 {
    self.id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{post_json, user_json};

  #[test]
  fn test_rows_are_keyed_by_record_id() {
    let user: User = serde_json::from_value(user_json(4, "Patricia Lebsack")).unwrap();
    let post: Post = serde_json::from_value(post_json(17, 2, "fugit voluptas", "eos voluptas")).unwrap();
    assert_eq!(user.row_id(), 4);
    assert_eq!(post.row_id(), 17);
  }
}
