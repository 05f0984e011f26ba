use super::KeyResult;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed(u64),
  Cancelled,
}

/// "Are you sure?" dialog for deleting one record
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  /// Record id and label while open
  target: Option<(u64, String)>,
  item_type: &'static str,
  /// Set while the delete runs; keys are ignored meanwhile
  busy: bool,
}

impl ConfirmDialog {
  pub fn new(item_type: &'static str) -> Self {
    Self {
      item_type,
      ..Self::default()
    }
  }

  pub fn open(&mut self, id: u64, label: impl Into<String>) {
    self.target = Some((id, label.into()));
    self.busy = false;
  }

  pub fn close(&mut self) {
    self.target = None;
    self.busy = false;
  }

  pub fn is_open(&self) -> bool {
    self.target.is_some()
  }

  pub fn set_busy(&mut self, busy: bool) {
    self.busy = busy;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    let Some(id) = self.target.as_ref().map(|(id, _)| *id) else {
      return KeyResult::NotHandled;
    };
    if self.busy {
      return KeyResult::Handled;
    }
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => KeyResult::Event(ConfirmEvent::Confirmed(id)),
      KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
        self.close();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let Some((_, label)) = &self.target else {
      return;
    };
    let rect = centered_rect(56, 8, area);
    frame.render_widget(Clear, rect);

    let text = vec![
      Line::from(vec![
        Span::raw("Are you sure you want to delete "),
        Span::styled(label.clone(), Style::default().bold()),
        Span::raw(format!(
          "? This action cannot be undone and will permanently remove the {} from the system.",
          self.item_type
        )),
      ]),
      Line::default(),
      if self.busy {
        Line::styled("Deleting...", Style::default().fg(Color::Yellow))
      } else {
        Line::from(vec![
          Span::styled("<y>", Style::default().fg(Color::Red)),
          Span::raw(" delete   "),
          Span::styled("<n>", Style::default().fg(Color::Cyan)),
          Span::raw(" cancel"),
        ])
      },
    ];

    let block = Block::default()
      .title(" Are you sure? ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), rect);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_confirm_and_cancel() {
    let mut dialog = ConfirmDialog::new("user");
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);

    dialog.open(3, "Clementine Bauch");
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed(3))
    );
    dialog.set_busy(true);
    assert_eq!(dialog.handle_key(key(KeyCode::Esc)), KeyResult::Handled);

    dialog.set_busy(false);
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert!(!dialog.is_open());
  }
}
