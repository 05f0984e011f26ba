//! Query keys for the resource API.

use crate::cache::QueryKey;

use super::types::ResourceKind;

/// Every cached read the application performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiQueryKey {
  /// A whole collection
  List(ResourceKind),
  /// One record of a collection
  Detail(ResourceKind, u64),
  /// Dashboard figures; derived from users, so it lives in their scope
  Stats,
}

impl QueryKey for ApiQueryKey {
  fn cache_hash(&self) -> String {
    match self {
      Self::List(kind) => format!("{}:list", kind.label()),
      Self::Detail(kind, id) => format!("{}:detail:{}", kind.label(), id),
      Self::Stats => "users:stats".to_string(),
    }
  }

  fn scope(&self) -> &'static str {
    match self {
      Self::List(kind) | Self::Detail(kind, _) => kind.label(),
      Self::Stats => ResourceKind::Users.label(),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::List(kind) => format!("list {}", kind.label()),
      Self::Detail(kind, id) => format!("{} #{}", kind.label(), id),
      Self::Stats => "dashboard stats".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case(ApiQueryKey::List(ResourceKind::Users), "users:list", "users")]
  #[case(ApiQueryKey::List(ResourceKind::Posts), "posts:list", "posts")]
  #[case(ApiQueryKey::Detail(ResourceKind::Users, 3), "users:detail:3", "users")]
  #[case(ApiQueryKey::Detail(ResourceKind::Posts, 12), "posts:detail:12", "posts")]
  #[case(ApiQueryKey::Stats, "users:stats", "users")]
  fn test_hash_and_scope(#[case] key: ApiQueryKey, #[case] hash: &str, #[case] scope: &str) {
    assert_eq!(key.cache_hash(), hash);
    assert_eq!(key.scope(), scope);
  }
}
