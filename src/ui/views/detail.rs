use super::editor::Editable;
use crate::api::{ApiQueryKey, CachedApiClient};
use crate::query::{Query, QueryState};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use serde_json::Value;

/// View for a single record, read through the cache by id
pub struct DetailView<R> {
  id: u64,
  api: CachedApiClient,
  query: Query<R>,
  scroll: u16,
}

impl<R: Editable> DetailView<R> {
  pub fn new(id: u64, ctx: &ViewContext) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::new(move || {
      let api = api.clone();
      async move { api.get::<R>(id).await }
    });
    query.fetch();

    Self {
      id,
      api: ctx.api.clone(),
      query,
      scroll: 0,
    }
  }
}

/// Flatten a record into `(path, value)` lines, nested objects as `a.b`
fn fields(value: &Value) -> Vec<(String, String)> {
  let mut out = Vec::new();
  flatten("", value, &mut out);
  out
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
  match value {
    Value::Object(map) => {
      for (key, inner) in map {
        let path = if prefix.is_empty() {
          key.clone()
        } else {
          format!("{}.{}", prefix, key)
        };
        flatten(&path, inner, out);
      }
    }
    Value::String(s) => out.push((prefix.to_string(), s.clone())),
    Value::Null => out.push((prefix.to_string(), String::new())),
    other => out.push((prefix.to_string(), other.to_string())),
  }
}

impl<R: Editable> View for DetailView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.api.invalidate_query(ApiQueryKey::Detail(R::KIND, self.id));
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} #{} ", R::TITLE, self.id))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let lines: Vec<Line> = match self.query.state() {
      QueryState::Idle | QueryState::Loading => {
        vec![Line::styled("Loading...", Style::default().fg(Color::DarkGray))]
      }
      QueryState::Error(e) if e.is_not_found() => vec![
        Line::styled(
          format!("{} #{} no longer exists.", R::TITLE, self.id),
          Style::default().fg(Color::Yellow),
        ),
        Line::styled("Press 'q' to go back.", Style::default().fg(Color::DarkGray)),
      ],
      QueryState::Error(e) => vec![
        Line::styled(
          format!("Failed to load {}: {}", R::NOUN, e),
          Style::default().fg(Color::Red),
        ),
        Line::styled("Press 'r' to retry.", Style::default().fg(Color::DarkGray)),
      ],
      QueryState::Success(record) => {
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        let fields = fields(&value);
        let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        fields
          .into_iter()
          .map(|(key, text)| {
            Line::from(vec![
              Span::styled(format!("{:<width$}  ", key), Style::default().fg(Color::Cyan)),
              Span::raw(text),
            ])
          })
          .collect()
      }
    };

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    format!("{} #{}", R::TITLE, self.id)
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("j/k", "scroll").with_priority(20),
      ShortcutInfo::new("r", "reload").with_priority(60),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
