use crate::api::CachedApiClient;
use crate::config::TableConfig;
use crate::forms::LoginForm;
use crate::session::Identity;
use crate::table::Pagination;
use crate::ui::components::Notifier;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the footer
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Trait for components that provide shortcuts
pub trait ShortcutProvider {
  fn shortcuts(&self) -> Vec<ShortcutInfo>;
}

/// Everything a view needs from the app to load and change data
#[derive(Clone)]
pub struct ViewContext {
  pub api: CachedApiClient,
  pub notifier: Notifier,
  pub table: TableConfig,
  pub identity: Option<Identity>,
}

impl ViewContext {
  /// Fresh pagination using the configured page size menu
  pub fn pagination(&self) -> Pagination {
    Pagination::new(self.table.default_page_size, &self.table.page_size_options)
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Replace the whole stack with the screen for a path
  Navigate(String),
  /// Start a session with validated credentials
  Login(LoginForm),
  Logout,
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, dialogs, forms) and return
/// actions for the App to execute. This creates a clean delegation chain:
/// App → View → Components
///
/// Views that load data asynchronously should use Query<T> internally and
/// poll it in the tick() method.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// True while a text field or dialog owns the keyboard, so global keys
  /// (`:`, `q`) go to the view instead
  fn captures_input(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the footer
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
