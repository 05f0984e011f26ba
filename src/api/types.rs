use serde::{Deserialize, Serialize};

/// The resource collections exposed by the backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Users,
  Posts,
}

impl ResourceKind {
  /// Collection path relative to the API base URL
  pub fn path(self) -> &'static str {
    match self {
      ResourceKind::Users => "/users",
      ResourceKind::Posts => "/posts",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ResourceKind::Users => "users",
      ResourceKind::Posts => "posts",
    }
  }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
  pub username: String,
  pub email: String,
  pub address: Address,
  pub phone: String,
  pub website: String,
  pub company: Company,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street: String,
  pub suite: String,
  pub city: String,
  pub zipcode: String,
  pub geo: Geo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
  pub lat: String,
  pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
  pub name: String,
  pub catch_phrase: String,
  pub bs: String,
}

impl Company {
  /// Placeholder used when the service returns a user without a company
  pub fn unknown() -> Self {
    Self {
      name: "Unknown".to_string(),
      catch_phrase: String::new(),
      bs: String::new(),
    }
  }
}

/// A post written by a user. `user_id` is not checked against the users collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub user_id: u64,
  pub id: u64,
  pub title: String,
  pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateUserData {
  pub name: String,
  pub username: String,
  pub email: String,
  pub phone: String,
  pub website: String,
}

/// Partial user update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateUserData {
  pub id: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostData {
  pub user_id: u64,
  pub title: String,
  pub body: String,
}

/// Partial post update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostData {
  pub id: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_id: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

/// Summary figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub total_users: usize,
  pub active_users: usize,
  pub new_users_this_month: usize,
  pub user_growth: String,
}

impl Stats {
  /// Derive dashboard figures from the users collection.
  ///
  /// The service has no activity data, so active and new users are fixed
  /// shares (80% and 20%, rounded down) of the total.
  pub fn from_users(users: &[User]) -> Self {
    let total = users.len();
    Self {
      total_users: total,
      active_users: total * 8 / 10,
      new_users_this_month: total * 2 / 10,
      user_growth: "+12.5%".to_string(),
    }
  }
}
