use super::editor::RecordEditor;
use super::DetailView;
use crate::api::{ApiQueryKey, Post, Resource, User};
use crate::query::Query;
use crate::table::{CellValue, Column, EmptyMessages, RowAction, SearchConfig, TableEvent, TableModel};
use crate::ui::components::{DataTable, KeyResult, TableData};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// User id to display name, filled once the users list arrives
#[derive(Clone, Default)]
struct Authors(Arc<RwLock<HashMap<u64, String>>>);

impl Authors {
  fn name(&self, user_id: u64) -> String {
    self
      .0
      .read()
      .ok()
      .and_then(|names| names.get(&user_id).cloned())
      .unwrap_or_else(|| format!("User {}", user_id))
  }

  fn replace(&self, users: &[User]) {
    if let Ok(mut names) = self.0.write() {
      *names = users.iter().map(|u| (u.id, u.name.clone())).collect();
    }
  }
}

/// View for browsing and managing posts
pub struct PostsView {
  ctx: ViewContext,
  posts: Query<Vec<Post>>,
  users: Query<Vec<User>>,
  authors: Authors,
  table: DataTable<Post>,
  editor: RecordEditor<Post>,
}

impl PostsView {
  pub fn new(ctx: ViewContext) -> Self {
    let api = ctx.api.clone();
    let mut posts = Query::new(move || {
      let api = api.clone();
      async move { api.list::<Post>().await }
    });
    let api = ctx.api.clone();
    let mut users = Query::new(move || {
      let api = api.clone();
      async move { api.list::<User>().await }
    });

    // Both lists load in parallel
    posts.fetch();
    users.fetch();

    let authors = Authors::default();
    let model = TableModel::new(columns(&authors), search(&authors), ctx.pagination())
      .with_messages(EmptyMessages {
        no_data_title: "No posts available".to_string(),
        no_data_description: "There are currently no posts to display.".to_string(),
        ..EmptyMessages::default()
      });

    Self {
      editor: RecordEditor::new(ctx.clone()),
      ctx,
      posts,
      users,
      authors,
      table: DataTable::new("Posts", model, "Search posts by title, content, or author...")
        .with_row_actions(),
    }
  }

  fn find(&self, id: u64) -> Option<&Post> {
    self.posts.data()?.iter().find(|p| p.id == id)
  }

  fn handle_table(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let posts = self.posts.data().map(|v| v.as_slice()).unwrap_or(&[]);
    match self.table.handle_key(key, posts) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(TableEvent::RowActivated(id)) => Some(ViewAction::Push(Box::new(
        DetailView::<Post>::new(id, &self.ctx),
      ))),
      KeyResult::Event(TableEvent::RowAction(action, id)) => {
        if let Some(post) = self.find(id).cloned() {
          match action {
            RowAction::Edit => self.editor.open_edit(&post),
            RowAction::Delete => self.editor.open_delete(&post),
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
        self.ctx.api.invalidate_query(ApiQueryKey::List(Post::KIND));
        self.ctx.api.invalidate_query(ApiQueryKey::List(User::KIND));
        self.posts.refetch();
        self.users.refetch();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }
}

fn columns(authors: &Authors) -> Vec<Column<Post>> {
  let authors = authors.clone();
  vec![
    Column::new("id", "ID")
      .width(5)
      .render(|p: &Post, _| CellValue::Mono(p.id.to_string())),
    Column::new("title", "Title"),
    Column::new("body", "Content").render(|p: &Post, _| CellValue::Muted(p.body.replace('\n', " "))),
    Column::new("author", "Author")
      .width(24)
      .render(move |p: &Post, _| CellValue::Badge(authors.name(p.user_id))),
  ]
}

fn search(authors: &Authors) -> SearchConfig<Post> {
  let authors = authors.clone();
  SearchConfig::new(&["title", "body", "author"]).with_extractor(move |p: &Post, field| {
    (field == "author").then(|| authors.name(p.user_id))
  })
}

impl View for PostsView {
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
    let refreshing = self.posts.is_fetching() && self.posts.data().is_some();
    let error = self.posts.error().map(|e| e.to_string());
    let data = match (&error, self.posts.data()) {
      (_, Some(posts)) => TableData::Ready(posts.as_slice()),
      (Some(message), None) => TableData::Failed(message),
      (None, None) => TableData::Loading,
    };
    self.table.render(frame, area, data, refreshing);
    self.editor.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Posts".to_string()
  }

  fn tick(&mut self) {
    if self.posts.poll() && self.posts.is_error() {
      self.ctx.notifier.error("Failed to fetch posts");
    }
    if self.users.poll() {
      // Posts still show with "User n" authors if this fails
      if let Some(users) = self.users.data() {
        self.authors.replace(users);
      }
    }
    if self.editor.tick().is_some() {
      self.posts.refetch();
    }
  }

  fn captures_input(&self) -> bool {
    self.editor.is_open() || self.table.is_capturing()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n", "new post").with_priority(15),
      ShortcutInfo::new("r", "reload").with_priority(60),
      ShortcutInfo::new("q", "back").with_priority(90),
    ];
    shortcuts.extend(self.table.shortcuts());
    shortcuts
  }
}
