/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home", "stats"],
    description: "Overview and statistics",
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Manage users",
  },
  Command {
    name: "posts",
    aliases: &["p", "post"],
    description: "Manage posts",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "End the session",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit d9s",
  },
];

/// What a submitted command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  /// Navigate to a path (`:users` or `:/users`)
  Navigate(String),
  Logout,
  Quit,
  Unknown(String),
}

/// Interpret a submitted command line
pub fn parse(input: &str) -> Action {
  let input = input.trim();
  if input.starts_with('/') {
    return Action::Navigate(input.to_string());
  }
  let lower = input.to_lowercase();
  let Some(cmd) = COMMANDS
    .iter()
    .find(|c| c.name == lower || c.aliases.contains(&lower.as_str()))
  else {
    return Action::Unknown(input.to_string());
  };
  match cmd.name {
    "logout" => Action::Logout,
    "quit" => Action::Quit,
    name => Action::Navigate(format!("/{}", name)),
  }
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  // Raw paths are navigated as typed
  if input_lower.starts_with('/') {
    return Vec::new();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    let priority = if cmd.name == input_lower {
      0
    } else if cmd.aliases.contains(&input_lower.as_str()) {
      1
    } else if cmd.name.starts_with(&input_lower) {
      2
    } else if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      3
    } else if cmd.name.contains(&input_lower) {
      4
    } else if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      5
    } else {
      continue;
    };
    matches.push((cmd, priority));
  }

  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("posts");
    assert_eq!(suggestions[0].name, "posts");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("u");
    assert_eq!(suggestions[0].name, "users");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("dash");
    assert_eq!(suggestions[0].name, "dashboard");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("gout");
    assert_eq!(suggestions[0].name, "logout");
  }

  #[test]
  fn test_paths_have_no_suggestions() {
    assert!(get_suggestions("/posts").is_empty());
  }

  #[test]
  fn test_parse_actions() {
    assert_eq!(parse("users"), Action::Navigate("/users".to_string()));
    assert_eq!(parse("P"), Action::Navigate("/posts".to_string()));
    assert_eq!(parse("/nowhere"), Action::Navigate("/nowhere".to_string()));
    assert_eq!(parse("logout"), Action::Logout);
    assert_eq!(parse("exit"), Action::Quit);
    assert_eq!(parse("frobnicate"), Action::Unknown("frobnicate".to_string()));
  }
}
