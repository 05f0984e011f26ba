//! Serde-deserializable types matching what the service actually returns.
//!
//! The backing service is a mock: writes echo back whatever subset of fields
//! it feels like. Every field is therefore optional here, and the `into_*`
//! conversions fill the gaps so callers only ever see complete records.

use serde::Deserialize;

use super::types::{
  Address, Company, CreatePostData, CreateUserData, Post, UpdatePostData, UpdateUserData, User,
};

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserResponse {
  pub id: Option<u64>,
  pub name: Option<String>,
  pub username: Option<String>,
  pub email: Option<String>,
  pub address: Option<Address>,
  pub phone: Option<String>,
  pub website: Option<String>,
  pub company: Option<Company>,
}

impl UserResponse {
  /// Fill every field missing here from `fallback`
  pub fn or(self, fallback: UserResponse) -> Self {
    Self {
      id: self.id.or(fallback.id),
      name: self.name.or(fallback.name),
      username: self.username.or(fallback.username),
      email: self.email.or(fallback.email),
      address: self.address.or(fallback.address),
      phone: self.phone.or(fallback.phone),
      website: self.website.or(fallback.website),
      company: self.company.or(fallback.company),
    }
  }

  /// Complete the record with defaults for anything still missing
  pub fn into_user(self) -> User {
    User {
      id: self.id.unwrap_or(0),
      name: self.name.unwrap_or_default(),
      username: self.username.unwrap_or_default(),
      email: self.email.unwrap_or_default(),
      address: self.address.unwrap_or_default(),
      phone: self.phone.unwrap_or_default(),
      website: self.website.unwrap_or_default(),
      company: self.company.unwrap_or_else(Company::unknown),
    }
  }
}

impl From<&User> for UserResponse {
  fn from(user: &User) -> Self {
    Self {
      id: Some(user.id),
      name: Some(user.name.clone()),
      username: Some(user.username.clone()),
      email: Some(user.email.clone()),
      address: Some(user.address.clone()),
      phone: Some(user.phone.clone()),
      website: Some(user.website.clone()),
      company: Some(user.company.clone()),
    }
  }
}

impl From<&CreateUserData> for UserResponse {
  fn from(data: &CreateUserData) -> Self {
    Self {
      name: Some(data.name.clone()),
      username: Some(data.username.clone()),
      email: Some(data.email.clone()),
      phone: Some(data.phone.clone()),
      website: Some(data.website.clone()),
      ..Default::default()
    }
  }
}

impl UpdateUserData {
  /// The record that results from applying this update to `user`
  pub fn apply(&self, user: &User) -> User {
    User {
      id: user.id,
      name: self.name.clone().unwrap_or_else(|| user.name.clone()),
      username: self.username.clone().unwrap_or_else(|| user.username.clone()),
      email: self.email.clone().unwrap_or_else(|| user.email.clone()),
      address: user.address.clone(),
      phone: self.phone.clone().unwrap_or_else(|| user.phone.clone()),
      website: self.website.clone().unwrap_or_else(|| user.website.clone()),
      company: user.company.clone(),
    }
  }
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostResponse {
  pub user_id: Option<u64>,
  pub id: Option<u64>,
  pub title: Option<String>,
  pub body: Option<String>,
}

impl PostResponse {
  /// Fill every field missing here from `fallback`
  pub fn or(self, fallback: PostResponse) -> Self {
    Self {
      user_id: self.user_id.or(fallback.user_id),
      id: self.id.or(fallback.id),
      title: self.title.or(fallback.title),
      body: self.body.or(fallback.body),
    }
  }

  /// Complete the record with defaults for anything still missing
  pub fn into_post(self) -> Post {
    Post {
      user_id: self.user_id.unwrap_or(0),
      id: self.id.unwrap_or(0),
      title: self.title.unwrap_or_default(),
      body: self.body.unwrap_or_default(),
    }
  }
}

impl From<&Post> for PostResponse {
  fn from(post: &Post) -> Self {
    Self {
      user_id: Some(post.user_id),
      id: Some(post.id),
      title: Some(post.title.clone()),
      body: Some(post.body.clone()),
    }
  }
}

impl From<&CreatePostData> for PostResponse {
  fn from(data: &CreatePostData) -> Self {
    Self {
      user_id: Some(data.user_id),
      id: None,
      title: Some(data.title.clone()),
      body: Some(data.body.clone()),
    }
  }
}

impl UpdatePostData {
  /// The record that results from applying this update to `post`
  pub fn apply(&self, post: &Post) -> Post {
    Post {
      user_id: self.user_id.unwrap_or(post.user_id),
      id: post.id,
      title: self.title.clone().unwrap_or_else(|| post.title.clone()),
      body: self.body.clone().unwrap_or_else(|| post.body.clone()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_user_echo_gets_defaults() {
    let user = UserResponse::default().into_user();
    assert_eq!(user.id, 0);
    assert_eq!(user.name, "");
    assert_eq!(user.address, Address::default());
    assert_eq!(user.company.name, "Unknown");
    assert_eq!(user.company.catch_phrase, "");
  }

  #[test]
  fn test_create_echo_backfills_from_input() {
    let input = CreateUserData {
      name: "Ada".to_string(),
      username: "ada".to_string(),
      email: "ada@example.com".to_string(),
      phone: "555".to_string(),
      website: "ada.dev".to_string(),
    };
    // Typical mock echo: just an id
    let echo: UserResponse = serde_json::from_str(r#"{"id": 11}"#).unwrap();

    let user = echo.or(UserResponse::from(&input)).into_user();
    assert_eq!(user.id, 11);
    assert_eq!(user.name, "Ada");
    assert_eq!(user.website, "ada.dev");
    assert_eq!(user.company, Company::unknown());
  }

  #[test]
  fn test_echo_values_win_over_fallback() {
    let echo = PostResponse {
      title: Some("from server".to_string()),
      ..Default::default()
    };
    let fallback = PostResponse {
      title: Some("local".to_string()),
      body: Some("body".to_string()),
      ..Default::default()
    };
    let post = echo.or(fallback).into_post();
    assert_eq!(post.title, "from server");
    assert_eq!(post.body, "body");
  }

  #[test]
  fn test_update_apply_keeps_untouched_fields() {
    let post = Post {
      user_id: 1,
      id: 3,
      title: "old".to_string(),
      body: "original body".to_string(),
    };
    let update = UpdatePostData {
      id: 3,
      title: Some("X".to_string()),
      ..Default::default()
    };
    let merged = update.apply(&post);
    assert_eq!(merged.title, "X");
    assert_eq!(merged.body, "original body");
    assert_eq!(merged.user_id, 1);
  }
}
