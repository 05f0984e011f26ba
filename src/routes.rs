//! Path to screen mapping.

use tracing::error;

/// A screen the app can show at its root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  Login,
  Dashboard,
  Users,
  Posts,
  /// Any unknown path, kept for display
  NotFound(String),
}

impl Route {
  /// Map a path to a route; `/` is an alias for the dashboard
  pub fn parse(path: &str) -> Self {
    let trimmed = path.trim();
    let normalized = match trimmed.trim_end_matches('/') {
      "" => "/",
      p => p,
    };
    match normalized {
      "/" | "/dashboard" => Self::Dashboard,
      "/login" => Self::Login,
      "/users" => Self::Users,
      "/posts" => Self::Posts,
      _ => {
        error!(path = trimmed, "attempted to access non-existent route");
        Self::NotFound(trimmed.to_string())
      }
    }
  }

  pub fn path(&self) -> &str {
    match self {
      Self::Login => "/login",
      Self::Dashboard => "/dashboard",
      Self::Users => "/users",
      Self::Posts => "/posts",
      Self::NotFound(path) => path,
    }
  }

  /// Only reachable with a logged-in session
  pub fn is_protected(&self) -> bool {
    matches!(self, Self::Dashboard | Self::Users | Self::Posts)
  }

  /// Where navigation actually lands for the given session state
  pub fn resolve(self, logged_in: bool) -> Self {
    match self {
      route if route.is_protected() && !logged_in => Self::Login,
      Self::Login if logged_in => Self::Dashboard,
      route => route,
    }
  }
}
