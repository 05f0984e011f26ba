use crate::api::{Post, Resource, User};
use crate::forms::{PostForm, UserForm, ValidationErrors};
use crate::query::Mutation;
use crate::table::Row;
use crate::ui::components::{ConfirmDialog, ConfirmEvent, FormDialog, FormEvent, KeyResult};
use crate::ui::view::ViewContext;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A record that can be created, edited and deleted from a table screen
pub trait Editable: Resource + Row {
  /// Lowercase singular name used in messages ("user")
  const NOUN: &'static str;
  const TITLE: &'static str;

  /// Form prefilled from `record`, or empty for a new record
  fn form(record: Option<&Self>) -> FormDialog;

  fn create_payload(form: &FormDialog, ctx: &ViewContext) -> Result<Self::Create, ValidationErrors>;

  fn update_payload(form: &FormDialog, id: u64) -> Result<Self::Update, ValidationErrors>;

  /// How the delete dialog names the record
  fn label(&self) -> String;
}

impl Editable for User {
  const NOUN: &'static str = "user";
  const TITLE: &'static str = "User";

  fn form(record: Option<&User>) -> FormDialog {
    let values = record.map(UserForm::from).unwrap_or_default();
    let title = if record.is_some() { "Edit User" } else { "Add New User" };
    FormDialog::new(title)
      .field("name", "Name", &values.name)
      .field("username", "Username", &values.username)
      .field("email", "Email", &values.email)
      .field("phone", "Phone", &values.phone)
      .field("website", "Website (optional)", &values.website)
  }

  fn create_payload(form: &FormDialog, _ctx: &ViewContext) -> Result<Self::Create, ValidationErrors> {
    user_form(form).to_create()
  }

  fn update_payload(form: &FormDialog, id: u64) -> Result<Self::Update, ValidationErrors> {
    user_form(form).to_update(id)
  }

  fn label(&self) -> String {
    self.name.clone()
  }
}

fn user_form(form: &FormDialog) -> UserForm {
  UserForm {
    name: form.value("name"),
    username: form.value("username"),
    email: form.value("email"),
    phone: form.value("phone"),
    website: form.value("website"),
  }
}

impl Editable for Post {
  const NOUN: &'static str = "post";
  const TITLE: &'static str = "Post";

  fn form(record: Option<&Post>) -> FormDialog {
    let values = record.map(PostForm::from).unwrap_or_default();
    let title = if record.is_some() { "Edit Post" } else { "Add New Post" };
    FormDialog::new(title)
      .field("title", "Title", &values.title)
      .field("body", "Content", &values.body)
  }

  fn create_payload(form: &FormDialog, ctx: &ViewContext) -> Result<Self::Create, ValidationErrors> {
    let author = ctx.identity.as_ref().map_or(1, |identity| identity.user_id());
    post_form(form).to_create(author)
  }

  fn update_payload(form: &FormDialog, id: u64) -> Result<Self::Update, ValidationErrors> {
    post_form(form).to_update(id)
  }

  fn label(&self) -> String {
    self.title.clone()
  }
}

fn post_form(form: &FormDialog) -> PostForm {
  PostForm {
    title: form.value("title"),
    body: form.value("body"),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
  Create,
  Update,
  Delete,
}

impl Write {
  fn verb(self) -> &'static str {
    match self {
      Write::Create => "create",
      Write::Update => "update",
      Write::Delete => "delete",
    }
  }

  fn past(self) -> &'static str {
    match self {
      Write::Create => "created",
      Write::Update => "updated",
      Write::Delete => "deleted",
    }
  }
}

/// Create/edit form, delete confirmation and the write they trigger.
///
/// Only one write runs at a time. Dialogs stay open until it finishes; a
/// failed write leaves them open so the user can retry or cancel.
pub struct RecordEditor<R> {
  ctx: ViewContext,
  /// Open form plus the id being edited (`None` when creating)
  form: Option<(FormDialog, Option<u64>)>,
  confirm: ConfirmDialog,
  mutation: Mutation<Write>,
  pending: Option<Write>,
  _record: std::marker::PhantomData<R>,
}

impl<R: Editable> RecordEditor<R> {
  pub fn new(ctx: ViewContext) -> Self {
    Self {
      ctx,
      form: None,
      confirm: ConfirmDialog::new(R::NOUN),
      mutation: Mutation::new(),
      pending: None,
      _record: std::marker::PhantomData,
    }
  }

  /// A dialog is open and owns the keyboard
  pub fn is_open(&self) -> bool {
    self.form.is_some() || self.confirm.is_open()
  }

  pub fn open_create(&mut self) {
    self.form = Some((R::form(None), None));
  }

  pub fn open_edit(&mut self, record: &R) {
    self.form = Some((R::form(Some(record)), Some(record.id())));
  }

  pub fn open_delete(&mut self, record: &R) {
    self.confirm.open(record.id(), record.label());
  }

  /// Route a key to the open dialog. `None` when no dialog is open.
  pub fn handle_key(&mut self, key: KeyEvent) -> Option<()> {
    if self.confirm.is_open() {
      if let KeyResult::Event(ConfirmEvent::Confirmed(id)) = self.confirm.handle_key(key) {
        self.start_delete(id);
      }
      return Some(());
    }

    let (form, _) = self.form.as_mut()?;
    match form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => self.submit(),
      KeyResult::Event(FormEvent::Cancelled) => self.form = None,
      _ => {}
    }
    Some(())
  }

  fn submit(&mut self) {
    let Some((form, id)) = self.form.as_mut() else {
      return;
    };
    let api = self.ctx.api.clone();
    let started = match *id {
      Some(id) => match R::update_payload(form, id) {
        Ok(update) => self.mutation.start(async move {
          api.update::<R>(&update).await.map(|_| Write::Update)
        }),
        Err(errors) => {
          form.set_errors(errors);
          return;
        }
      },
      None => match R::create_payload(form, &self.ctx) {
        Ok(data) => self.mutation.start(async move {
          api.create::<R>(&data).await.map(|_| Write::Create)
        }),
        Err(errors) => {
          form.set_errors(errors);
          return;
        }
      },
    };
    if started {
      form.set_submitting(true);
      self.pending = Some(if id.is_some() { Write::Update } else { Write::Create });
    }
  }

  fn start_delete(&mut self, id: u64) {
    let api = self.ctx.api.clone();
    if self
      .mutation
      .start(async move { api.delete::<R>(id).await.map(|_| Write::Delete) })
    {
      self.confirm.set_busy(true);
      self.pending = Some(Write::Delete);
    }
  }

  /// Poll the running write. Returns the write once it succeeded, so the
  /// owner can reload its data.
  pub fn tick(&mut self) -> Option<Write> {
    let outcome = self.mutation.poll()?;
    let write = self.pending.take()?;
    match outcome {
      Ok(_) => {
        self
          .ctx
          .notifier
          .success(format!("{} {} successfully.", R::TITLE, write.past()));
        match write {
          Write::Delete => self.confirm.close(),
          _ => self.form = None,
        }
        Some(write)
      }
      Err(_) => {
        self
          .ctx
          .notifier
          .error(format!("Failed to {} {}.", write.verb(), R::NOUN));
        match write {
          Write::Delete => self.confirm.set_busy(false),
          _ => {
            if let Some((form, _)) = self.form.as_mut() {
              form.set_submitting(false);
            }
          }
        }
        None
      }
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if let Some((form, _)) = &self.form {
      form.render(frame, area);
    }
    self.confirm.render(frame, area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{post_json, FakeTransport};
  use crate::api::{ApiClient, ApiError, CachedApiClient, QueryPolicies};
  use crate::cache::CacheLayer;
  use crate::config::TableConfig;
  use crate::session::Identity;
  use crate::ui::components::{ToastKind, Toasts};
  use crossterm::event::{KeyCode, KeyModifiers};
  use reqwest::Method;
  use serde_json::json;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn context(transport: &Arc<FakeTransport>) -> (ViewContext, Toasts) {
    let (toasts, notifier) = Toasts::new();
    let api = CachedApiClient::new(
      ApiClient::with_transport(transport.clone()),
      CacheLayer::new(),
      QueryPolicies::default(),
    );
    let ctx = ViewContext {
      api,
      notifier,
      table: TableConfig::default(),
      identity: Some(Identity::from_email("ann@example.com")),
    };
    (ctx, toasts)
  }

  /// Tick until the pending write finishes
  async fn settle(editor: &mut RecordEditor<Post>) -> Option<Write> {
    for _ in 0..100 {
      let write = editor.tick();
      if write.is_some() || editor.pending.is_none() {
        return write;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
  }

  fn type_str(editor: &mut RecordEditor<Post>, s: &str) {
    for c in s.chars() {
      editor.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[tokio::test]
  async fn test_invalid_form_does_not_submit() {
    let transport = Arc::new(FakeTransport::new(|_, _, _| Ok(json!({}))));
    let (ctx, _toasts) = context(&transport);
    let mut editor = RecordEditor::<Post>::new(ctx);
    editor.open_create();
    type_str(&mut editor, "T");
    editor.handle_key(key(KeyCode::Enter));

    assert!(editor.is_open());
    assert!(editor.pending.is_none());
    assert!(transport.calls().is_empty());
  }

  #[tokio::test]
  async fn test_create_uses_identity_and_toasts() {
    let transport = Arc::new(FakeTransport::new(|_, _, _| Ok(json!({"id": 101}))));
    let (ctx, mut toasts) = context(&transport);
    let mut editor = RecordEditor::<Post>::new(ctx);
    editor.open_create();
    type_str(&mut editor, "Hello");
    editor.handle_key(key(KeyCode::Tab));
    type_str(&mut editor, "World");
    editor.handle_key(key(KeyCode::Enter));

    assert_eq!(settle(&mut editor).await, Some(Write::Create));
    assert!(!editor.is_open());

    let calls = transport.calls();
    assert_eq!(calls[0].0, Method::POST);
    let body = calls[0].2.clone().unwrap();
    assert_eq!(body["userId"], json!(1));
    assert_eq!(body["title"], json!("Hello"));

    toasts.tick();
    assert_eq!(toasts.visible()[0].kind, ToastKind::Success);
    assert_eq!(toasts.visible()[0].message, "Post created successfully.");
  }

  #[tokio::test]
  async fn test_failed_delete_keeps_dialog_open() {
    let transport = Arc::new(FakeTransport::new(|method, path, _| {
      if *method == Method::DELETE {
        Err(ApiError::status(500, path))
      } else {
        Ok(json!({}))
      }
    }));
    let (ctx, mut toasts) = context(&transport);
    let mut editor = RecordEditor::<Post>::new(ctx);
    let post: Post = serde_json::from_value(post_json(1, 1, "first", "body one")).unwrap();
    editor.open_delete(&post);
    editor.handle_key(key(KeyCode::Char('y')));

    assert_eq!(settle(&mut editor).await, None);
    assert!(editor.is_open());

    toasts.tick();
    assert_eq!(toasts.visible()[0].kind, ToastKind::Error);
    assert_eq!(toasts.visible()[0].message, "Failed to delete post.");
  }
}
