use super::editor::RecordEditor;
use super::DetailView;
use crate::api::{ApiQueryKey, Resource, User};
use crate::query::Query;
use crate::table::{
  Align, CellValue, Column, EmptyMessages, RowAction, SearchConfig, TableEvent, TableModel,
};
use crate::ui::components::{DataTable, KeyResult, TableData};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// View for managing users
pub struct UsersView {
  ctx: ViewContext,
  query: Query<Vec<User>>,
  table: DataTable<User>,
  editor: RecordEditor<User>,
}

impl UsersView {
  pub fn new(ctx: ViewContext) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::new(move || {
      let api = api.clone();
      async move { api.list::<User>().await }
    });

    // Start fetching immediately
    query.fetch();

    let model = TableModel::new(columns(), search(), ctx.pagination()).with_messages(EmptyMessages {
      no_data_title: "No users available".to_string(),
      no_data_description: "There are currently no users to display.".to_string(),
      ..EmptyMessages::default()
    });

    Self {
      editor: RecordEditor::new(ctx.clone()),
      ctx,
      query,
      table: DataTable::new("Users", model, "Search users by name, email, or username...")
        .with_row_actions(),
    }
  }

  fn users(&self) -> &[User] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn find(&self, id: u64) -> Option<&User> {
    self.users().iter().find(|u| u.id == id)
  }

  fn handle_table(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let users = self.query.data().map(|v| v.as_slice()).unwrap_or(&[]);
    match self.table.handle_key(key, users) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(TableEvent::RowActivated(id)) => Some(ViewAction::Push(Box::new(
        DetailView::<User>::new(id, &self.ctx),
      ))),
      KeyResult::Event(TableEvent::RowAction(action, id)) => {
        if let Some(user) = self.find(id).cloned() {
          match action {
            RowAction::Edit => self.editor.open_edit(&user),
            RowAction::Delete => self.editor.open_delete(&user),
          }
        }
        Some(ViewAction::None)
      }
      KeyResult::NotHandled => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('n') => {
        self.editor.open_create();
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.ctx.api.invalidate_query(ApiQueryKey::List(User::KIND));
        self.query.refetch();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }
}

fn columns() -> Vec<Column<User>> {
  vec![
    Column::new("id", "ID")
      .width(5)
      .render(|u: &User, _| CellValue::Mono(u.id.to_string())),
    Column::new("name", "Name"),
    Column::new("username", "Username")
      .width(18)
      .render(|u: &User, _| CellValue::Muted(format!("@{}", u.username))),
    Column::new("email", "Email"),
    Column::new("company", "Company").render(|u: &User, _| CellValue::Text(u.company.name.clone())),
    Column::new("status", "Status")
      .width(8)
      .align(Align::Center)
      .render(|_, _| CellValue::Badge("Active".to_string())),
  ]
}

fn search() -> SearchConfig<User> {
  SearchConfig::new(&["name", "email", "username", "company"]).with_extractor(|u: &User, field| {
    (field == "company").then(|| u.company.name.clone())
  })
}

impl View for UsersView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.editor.handle_key(key).is_some() {
      return ViewAction::None;
    }
    self
      .handle_table(key)
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let refreshing = self.query.is_fetching() && self.query.data().is_some();
    let error = self.query.error().map(|e| e.to_string());
    let data = match (&error, self.query.data()) {
      (_, Some(users)) => TableData::Ready(users.as_slice()),
      (Some(message), None) => TableData::Failed(message),
      (None, None) => TableData::Loading,
    };
    self.table.render(frame, area, data, refreshing);
    self.editor.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Users".to_string()
  }

  fn tick(&mut self) {
    if self.query.poll() && self.query.is_error() {
      self.ctx.notifier.error("Failed to load users.");
    }
    if self.editor.tick().is_some() {
      self.query.refetch();
    }
  }

  fn captures_input(&self) -> bool {
    self.editor.is_open() || self.table.is_capturing()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n", "new user").with_priority(15),
      ShortcutInfo::new("r", "reload").with_priority(60),
      ShortcutInfo::new("q", "back").with_priority(90),
    ];
    shortcuts.extend(self.table.shortcuts());
    shortcuts
  }
}
