use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Shown for any path without a screen
pub struct NotFoundView {
  path: String,
}

impl NotFoundView {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: path.into() }
  }
}

impl View for NotFoundView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Enter => ViewAction::Navigate("/dashboard".to_string()),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let text = vec![
      Line::styled("404", Style::default().fg(Color::Yellow).bold()),
      Line::styled("Oops! Page not found", Style::default().fg(Color::Gray)),
      Line::styled(self.path.clone(), Style::default().fg(Color::DarkGray)),
      Line::default(),
      Line::from(vec![
        Span::styled("<enter>", Style::default().fg(Color::Cyan)),
        Span::raw(" Go to Dashboard"),
      ]),
    ];
    let top = area.height.saturating_sub(text.len() as u16) / 2;
    let rect = Rect::new(area.x, area.y + top, area.width, area.height - top);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
  }

  fn breadcrumb_label(&self) -> String {
    "Not Found".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("enter", "dashboard").with_priority(20),
    ]
  }
}
