use crate::forms::LoginForm;
use crate::ui::components::{FormDialog, FormEvent, KeyResult};
use crate::ui::renderfns::centered_rect;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Sign-in screen. Any well-formed email and non-empty password work.
pub struct LoginView {
  form: FormDialog,
}

impl LoginView {
  pub fn new() -> Self {
    Self {
      form: Self::empty_form(),
    }
  }

  fn empty_form() -> FormDialog {
    FormDialog::new("Sign in")
      .field("email", "Email", "")
      .secret_field("password", "Password")
  }

  fn submit(&mut self) -> ViewAction {
    let form = LoginForm {
      email: self.form.value("email").trim().to_string(),
      password: self.form.value("password"),
    };
    match form.validate() {
      Ok(()) => ViewAction::Login(form),
      Err(errors) => {
        self.form.set_errors(errors);
        ViewAction::None
      }
    }
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => self.submit(),
      KeyResult::Event(FormEvent::Cancelled) => ViewAction::Quit,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rect = centered_rect(56, 15, area);
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(3), Constraint::Length(10), Constraint::Min(0)])
      .split(rect);

    let heading = vec![
      Line::styled("Sign in to your account", Style::default().fg(Color::Cyan).bold()),
      Line::styled(
        "Enter your email and password",
        Style::default().fg(Color::DarkGray),
      ),
    ];
    frame.render_widget(Paragraph::new(heading).alignment(Alignment::Center), chunks[0]);
    self.form.render_in(frame, chunks[1]);
    frame.render_widget(
      Paragraph::new(Line::styled(
        "Demo credentials: any email and password will work",
        Style::default().fg(Color::DarkGray),
      ))
      .alignment(Alignment::Center),
      chunks[2],
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "sign in").with_priority(10),
      ShortcutInfo::new("tab", "next field").with_priority(20),
      ShortcutInfo::new("esc", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(view: &mut LoginView, s: &str) {
    for c in s.chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_invalid_email_stays_on_form() {
    let mut view = LoginView::new();
    type_str(&mut view, "not-an-email");
    view.handle_key(key(KeyCode::Tab));
    type_str(&mut view, "pw");
    assert!(matches!(view.handle_key(key(KeyCode::Enter)), ViewAction::None));
  }

  #[test]
  fn test_valid_credentials_request_login() {
    let mut view = LoginView::new();
    type_str(&mut view, "ann@example.com");
    view.handle_key(key(KeyCode::Tab));
    type_str(&mut view, "secret");
    match view.handle_key(key(KeyCode::Enter)) {
      ViewAction::Login(form) => {
        assert_eq!(form.email, "ann@example.com");
        assert_eq!(form.password, "secret");
      }
      _ => panic!("expected a login action"),
    }
  }
}
