use crate::api::{ApiClient, CachedApiClient};
use crate::cache::CacheLayer;
use crate::commands::{self, Action};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::forms::LoginForm;
use crate::routes::Route;
use crate::session::{Session, SessionStore};
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Notifier, Toasts};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crate::ui::views::{DashboardView, LoginView, NotFoundView, PostsView, UsersView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How often unused cache entries are swept
const GC_INTERVAL: Duration = Duration::from_secs(30);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Command palette (after pressing :)
  command_input: CommandInput,

  toasts: Toasts,
  notifier: Notifier,

  config: Config,
  api: CachedApiClient,
  session: Session,

  last_gc: Instant,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let api = CachedApiClient::new(
      ApiClient::new(config.base_url()?),
      CacheLayer::new(),
      config.cache.policies(),
    );
    let session = Session::init(SessionStore::open(&config.session_path()?)?)?;
    Ok(Self::with_parts(config, api, session))
  }

  fn with_parts(config: Config, api: CachedApiClient, session: Session) -> Self {
    let (toasts, notifier) = Toasts::new();
    let mut app = Self {
      view_stack: Vec::new(),
      command_input: CommandInput::new(),
      toasts,
      notifier,
      config,
      api,
      session,
      last_gc: Instant::now(),
      should_quit: false,
    };
    app.navigate("/");
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(100));
    let result = self.main_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {} // Redrawn on the next loop iteration
      Event::Tick => self.tick(),
    }
  }

  fn tick(&mut self) {
    // Every view polls, so a pushed view does not stall the ones below it
    for view in &mut self.view_stack {
      view.tick();
    }
    self.toasts.tick();

    if self.last_gc.elapsed() >= GC_INTERVAL {
      self.last_gc = Instant::now();
      let removed = self.api.cache().gc();
      if removed > 0 {
        debug!(removed, remaining = self.api.cache().entry_count(), "collected unused cache entries");
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Command palette first: it swallows everything while open
    if self.command_input.is_active() || !self.view_captures_input() {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
      if key.code == KeyCode::Char('x') && self.toasts.dismiss() {
        return;
      }
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  fn view_captures_input(&self) -> bool {
    self
      .view_stack
      .last()
      .is_some_and(|view| view.captures_input())
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Navigate(path) => self.navigate(&path),
      ViewAction::Login(form) => self.login(&form),
      ViewAction::Logout => self.logout(),
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match commands::parse(cmd) {
      Action::Navigate(path) => self.navigate(&path),
      Action::Logout => self.logout(),
      Action::Quit => self.should_quit = true,
      Action::Unknown(input) if input.is_empty() => {}
      Action::Unknown(input) => self.notifier.error(format!("Unknown command: {}", input)),
    }
  }

  /// Replace the stack with the screen for `path`, honoring the session
  fn navigate(&mut self, path: &str) {
    let requested = Route::parse(path);
    let route = requested.clone().resolve(self.session.is_logged_in());
    if route != requested {
      info!(from = requested.path(), to = route.path(), "redirected");
    }

    let ctx = self.context();
    let view: Box<dyn View> = match route {
      Route::Login => Box::new(LoginView::new()),
      Route::Dashboard => Box::new(DashboardView::new(ctx)),
      Route::Users => Box::new(UsersView::new(ctx)),
      Route::Posts => Box::new(PostsView::new(ctx)),
      Route::NotFound(path) => Box::new(NotFoundView::new(path)),
    };
    self.view_stack = vec![view];
  }

  fn login(&mut self, form: &LoginForm) {
    match self.session.login(form) {
      Ok(Ok(_)) => {
        self.notifier.success("Welcome to the dashboard!");
        self.navigate("/dashboard");
      }
      Ok(Err(errors)) => {
        debug!(%errors, "login form rejected");
        self.notifier.error("Please check your credentials and try again.");
      }
      Err(e) => {
        error!(error = %e, "failed to persist session");
        self.notifier.error("Something went wrong. Please try again.");
      }
    }
  }

  fn logout(&mut self) {
    if let Err(e) = self.session.logout() {
      error!(error = %e, "failed to clear saved session");
    }
    // The next user must not see this one's cached records
    self.api.cache().clear();
    self.navigate("/login");
  }

  fn context(&self) -> ViewContext {
    ViewContext {
      api: self.api.clone(),
      notifier: self.notifier.clone(),
      table: self.config.table.clone(),
      identity: self.session.identity().cloned(),
    }
  }

  // Accessors for UI rendering
  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn user_name(&self) -> Option<&str> {
    self.session.identity().map(|i| i.name.as_str())
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }
}
