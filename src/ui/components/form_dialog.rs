use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::forms::ValidationErrors;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
  Submitted,
  Cancelled,
}

#[derive(Debug, Clone)]
struct Field {
  key: &'static str,
  label: &'static str,
  input: TextInput,
}

/// Modal form: labelled inputs, inline validation messages, a submit state.
///
/// Tab/Down and Shift-Tab/Up move between fields, Enter submits, Esc cancels.
#[derive(Debug, Clone, Default)]
pub struct FormDialog {
  title: String,
  fields: Vec<Field>,
  focus: usize,
  errors: ValidationErrors,
  submitting: bool,
  open: bool,
}

impl FormDialog {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      open: true,
      ..Self::default()
    }
  }

  pub fn field(mut self, key: &'static str, label: &'static str, value: &str) -> Self {
    self.fields.push(Field {
      key,
      label,
      input: TextInput::new().with_value(value),
    });
    self
  }

  pub fn secret_field(mut self, key: &'static str, label: &'static str) -> Self {
    self.fields.push(Field {
      key,
      label,
      input: TextInput::masked(),
    });
    self
  }

  pub fn value(&self, key: &str) -> String {
    self
      .fields
      .iter()
      .find(|f| f.key == key)
      .map(|f| f.input.value().to_string())
      .unwrap_or_default()
  }

  pub fn is_open(&self) -> bool {
    self.open
  }

  pub fn close(&mut self) {
    self.open = false;
    self.submitting = false;
  }

  pub fn set_errors(&mut self, errors: ValidationErrors) {
    // Jump to the first field that needs fixing
    if let Some(idx) = self.fields.iter().position(|f| errors.get(f.key).is_some()) {
      self.focus = idx;
    }
    self.errors = errors;
  }

  pub fn set_submitting(&mut self, submitting: bool) {
    self.submitting = submitting;
    if submitting {
      self.errors = ValidationErrors::default();
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.open {
      return KeyResult::NotHandled;
    }
    if self.submitting {
      return KeyResult::Handled;
    }
    let count = self.fields.len().max(1);
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % count;
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + count - 1) % count;
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focus) else {
      return KeyResult::Handled;
    };
    match field.input.handle_key(key) {
      InputResult::Submitted(_) => KeyResult::Event(FormEvent::Submitted),
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancelled),
      _ => KeyResult::Handled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if !self.open {
      return;
    }
    // label + input + error line per field, hint line, borders
    let height = self.fields.len() as u16 * 3 + 4;
    let rect = centered_rect(60, height, area);
    frame.render_widget(Clear, rect);
    self.render_in(frame, rect);
  }

  /// Draw into `rect` without clearing around it (full-screen forms)
  pub fn render_in(&self, frame: &mut Frame, rect: Rect) {
    let mut lines = Vec::new();
    for (idx, field) in self.fields.iter().enumerate() {
      let focused = idx == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::Gray)
      };
      lines.push(Line::styled(field.label, label_style));

      let input = Line::from(vec![Span::raw(" "), Span::raw(field.input.display())]);
      lines.push(input.style(Style::default().bg(Color::Black)));

      match self.errors.get(field.key) {
        Some(message) => lines.push(Line::styled(
          format!(" {}", message),
          Style::default().fg(Color::Red),
        )),
        None => lines.push(Line::default()),
      }
    }

    lines.push(if self.submitting {
      Line::styled("Saving...", Style::default().fg(Color::Yellow))
    } else {
      Line::from(vec![
        Span::styled("<enter>", Style::default().fg(Color::Cyan)),
        Span::styled(" submit  ", Style::default().fg(Color::DarkGray)),
        Span::styled("<tab>", Style::default().fg(Color::Cyan)),
        Span::styled(" next field  ", Style::default().fg(Color::DarkGray)),
        Span::styled("<esc>", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ])
    });

    let block = Block::default()
      .title(format!(" {} ", self.title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    frame.render_widget(Paragraph::new(lines).block(block), rect);

    // Border, then label line above and the leading space before the text
    if let Some(field) = self.fields.get(self.focus) {
      let column = field.input.cursor_position() as u16 + 2;
      let row = self.focus as u16 * 3 + 2;
      if column < rect.width.saturating_sub(1) && row < rect.height.saturating_sub(1) {
        frame.set_cursor_position((rect.x + column, rect.y + row));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn form() -> FormDialog {
    FormDialog::new("Edit Post")
      .field("title", "Title", "old")
      .field("body", "Body", "")
  }

  #[test]
  fn test_typing_goes_to_focused_field() {
    let mut dialog = form();
    dialog.handle_key(key(KeyCode::Char('!')));
    dialog.handle_key(key(KeyCode::Tab));
    dialog.handle_key(key(KeyCode::Char('b')));
    assert_eq!(dialog.value("title"), "old!");
    assert_eq!(dialog.value("body"), "b");
    assert_eq!(dialog.value("missing"), "");
  }

  #[test]
  fn test_submit_and_cancel_events() {
    let mut dialog = form();
    assert_eq!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submitted)
    );
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
  }

  #[test]
  fn test_keys_ignored_while_submitting() {
    let mut dialog = form();
    dialog.set_submitting(true);
    assert_eq!(dialog.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(dialog.value("title"), "old");
  }

  #[test]
  fn test_errors_focus_first_invalid_field() {
    let mut dialog = form();
    let errors = crate::forms::PostForm {
      title: "old".to_string(),
      body: String::new(),
    }
    .to_create(1)
    .unwrap_err();
    dialog.set_errors(errors);
    dialog.handle_key(key(KeyCode::Char('x')));
    assert_eq!(dialog.value("body"), "x");
  }
}
