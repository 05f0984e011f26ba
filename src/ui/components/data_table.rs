use super::KeyResult;
use super::search_input::{SearchEvent, SearchInput};
use crate::table::{Align, CellValue, Column, PageView, Row as TableRow, RowAction, TableEvent, TableModel};
use crate::ui::renderfns::{ensure_valid_selection, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// What the owner has to show
pub enum TableData<'a, T> {
  /// First load, nothing to show yet
  Loading,
  /// Loading failed and there is no earlier data
  Failed(&'a str),
  Ready(&'a [T]),
}

/// Interactive table over a `TableModel`: live search, paging, row selection
/// and per-row actions.
pub struct DataTable<T> {
  title: &'static str,
  model: TableModel<T>,
  search: SearchInput,
  state: TableState,
  row_actions: bool,
  /// Ids of the rows on the page drawn last, for selection lookups
  page_ids: Vec<u64>,
}

impl<T: TableRow> DataTable<T> {
  pub fn new(title: &'static str, model: TableModel<T>, placeholder: &'static str) -> Self {
    Self {
      title,
      model,
      search: SearchInput::new(placeholder),
      state: TableState::default().with_selected(Some(0)),
      row_actions: false,
      page_ids: Vec::new(),
    }
  }

  /// Enable the `e`/`d` row actions
  pub fn with_row_actions(mut self) -> Self {
    self.row_actions = true;
    self
  }

  #[cfg(test)]
  pub fn model(&self) -> &TableModel<T> {
    &self.model
  }

  /// Search box is open and owns the keyboard
  pub fn is_capturing(&self) -> bool {
    self.search.is_active()
  }

  fn selected_id(&self) -> Option<u64> {
    self
      .state
      .selected()
      .and_then(|idx| self.page_ids.get(idx).copied())
  }

  fn reset_selection(&mut self) {
    self.state.select(Some(0));
  }

  fn sync_page(&mut self, records: &[T]) {
    let view = self.model.view(records);
    self.page_ids = view.rows.iter().map(|r| r.row_id()).collect();
    ensure_valid_selection(&mut self.state, self.page_ids.len());
  }

  /// Handle a key. `records` are the records currently shown.
  pub fn handle_key(&mut self, key: KeyEvent, records: &[T]) -> KeyResult<TableEvent> {
    self.sync_page(records);
    self
      .handle_search(key)
      .or_else(|| self.handle_paging(key, records))
      .or_else(|| self.handle_rows(key))
      .unwrap_or(KeyResult::NotHandled)
  }

  fn handle_search(&mut self, key: KeyEvent) -> Option<KeyResult<TableEvent>> {
    match self.search.handle_key(key) {
      KeyResult::Handled => Some(KeyResult::Handled),
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.model.set_query(query);
        self.reset_selection();
        Some(KeyResult::Handled)
      }
      KeyResult::Event(SearchEvent::Submitted) => Some(KeyResult::Handled),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_paging(&mut self, key: KeyEvent, records: &[T]) -> Option<KeyResult<TableEvent>> {
    match key.code {
      KeyCode::Char('h') | KeyCode::Left => self.model.previous_page(),
      KeyCode::Char('l') | KeyCode::Right => self.model.next_page(records),
      KeyCode::Char('H') | KeyCode::Home => self.model.first_page(),
      KeyCode::Char('L') | KeyCode::End => self.model.last_page(records),
      KeyCode::Char('s') => self.model.cycle_page_size(),
      _ => return None,
    }
    self.reset_selection();
    self.sync_page(records);
    Some(KeyResult::Handled)
  }

  fn handle_rows(&mut self, key: KeyEvent) -> Option<KeyResult<TableEvent>> {
    let len = self.page_ids.len();
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        if len > 0 {
          let next = self.state.selected().map_or(0, |i| (i + 1).min(len - 1));
          self.state.select(Some(next));
        }
        Some(KeyResult::Handled)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
        Some(KeyResult::Handled)
      }
      KeyCode::Enter => self
        .selected_id()
        .map(|id| KeyResult::Event(TableEvent::RowActivated(id))),
      KeyCode::Char('e') if self.row_actions => self
        .selected_id()
        .map(|id| KeyResult::Event(TableEvent::RowAction(RowAction::Edit, id))),
      KeyCode::Char('d') if self.row_actions => self
        .selected_id()
        .map(|id| KeyResult::Event(TableEvent::RowAction(RowAction::Delete, id))),
      _ => None,
    }
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect, data: TableData<'_, T>, refreshing: bool) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(3), Constraint::Length(1)])
      .split(area);

    let records = match data {
      TableData::Loading => {
        self.render_skeleton(frame, chunks[0]);
        return;
      }
      TableData::Failed(message) => {
        self.render_message(
          frame,
          chunks[0],
          "Failed to load data",
          &format!("{}. Press 'r' to retry.", message),
          Color::Red,
        );
        return;
      }
      TableData::Ready(records) => records,
    };

    let view = self.model.view(records);
    self.page_ids = view.rows.iter().map(|r| r.row_id()).collect();
    ensure_valid_selection(&mut self.state, self.page_ids.len());

    let title = format!(
      " {} ({}){} ",
      self.title,
      view.filtered_count,
      if refreshing { " refreshing..." } else { "" }
    );

    if let Some(empty) = view.empty {
      let (heading, description) = self.model.messages.for_state(empty, self.model.query());
      self.render_message(frame, chunks[0], &heading, &description, Color::DarkGray);
    } else {
      let table = self.build_table(&view, title);
      frame.render_stateful_widget(table, chunks[0], &mut self.state);
    }
    self.render_controls(frame, chunks[1], &view);
    self.search.render_overlay(frame, area);
  }

  fn widths(&self) -> Vec<Constraint> {
    self
      .model
      .columns()
      .iter()
      .map(|c| match c.width {
        Some(w) => Constraint::Length(w),
        None => Constraint::Fill(1),
      })
      .collect()
  }

  fn header(&self) -> Row<'static> {
    Row::new(self.model.columns().iter().map(|c| {
      Cell::from(Line::from(c.header).alignment(alignment(c.align)))
    }))
    .style(Style::default().fg(Color::Yellow).bold())
  }

  fn build_table<'a>(&self, view: &PageView<'_, T>, title: String) -> Table<'a> {
    let columns = self.model.columns();
    let rows = view.rows.iter().enumerate().map(|(i, record)| {
      Row::new(columns.iter().map(|c| styled_cell(c, record, view.offset + i)))
    });

    Table::new(rows, self.widths())
      .header(self.header())
      .block(self.block(title))
      .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ")
  }

  fn block(&self, title: String) -> Block<'static> {
    Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue))
  }

  /// Placeholder rows matching the page size, so the layout holds still
  fn render_skeleton(&self, frame: &mut Frame, area: Rect) {
    let columns = self.model.columns();
    let rows = (0..self.model.pagination().page_size()).map(|_| {
      Row::new(columns.iter().map(|_| Cell::from("░░░░░░░░")))
        .style(Style::default().fg(Color::DarkGray))
    });
    let table = Table::new(rows, self.widths())
      .header(self.header())
      .block(self.block(format!(" {} (loading...) ", self.title)));
    frame.render_widget(table, area);
  }

  fn render_message(&self, frame: &mut Frame, area: Rect, heading: &str, description: &str, color: Color) {
    let text = vec![
      Line::default(),
      Line::styled(heading.to_string(), Style::default().fg(color).bold()),
      Line::styled(description.to_string(), Style::default().fg(Color::DarkGray)),
    ];
    let paragraph = Paragraph::new(text)
      .alignment(Alignment::Center)
      .block(self.block(format!(" {} ", self.title)));
    frame.render_widget(paragraph, area);
  }

  fn render_controls(&self, frame: &mut Frame, area: Rect, view: &PageView<'_, T>) {
    let pagination = self.model.pagination();
    let shown = if view.rows.is_empty() {
      "0".to_string()
    } else {
      format!("{}-{}", view.offset + 1, view.offset + view.rows.len())
    };
    let nav = |enabled: bool, label: &'static str| {
      let color = if enabled { Color::Cyan } else { Color::DarkGray };
      Span::styled(label, Style::default().fg(color))
    };

    let showing = if view.filtered_count < view.total_count {
      format!(" Showing {} of {} (filtered from {}) ", shown, view.filtered_count, view.total_count)
    } else {
      format!(" Showing {} of {} ", shown, view.filtered_count)
    };
    let sizes = pagination
      .options()
      .iter()
      .map(|size| size.to_string())
      .collect::<Vec<_>>()
      .join("/");

    let mut spans = vec![
      Span::styled(showing, Style::default().fg(Color::Gray)),
      Span::styled("│ ", Style::default().fg(Color::DarkGray)),
      nav(pagination.has_previous(), "«H ‹h "),
      Span::raw(format!("Page {} of {} ", view.page, view.total_pages)),
      nav(pagination.has_next(view.filtered_count), "l› L» "),
      Span::styled("│ ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        format!("Rows per page: {} ", pagination.page_size()),
        Style::default().fg(Color::Gray),
      ),
      Span::styled(format!("<s> {}", sizes), Style::default().fg(Color::Cyan)),
    ];
    if let Some(line) = self.search.status_line() {
      spans.push(Span::raw("  "));
      spans.extend(line.spans);
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

impl<T> ShortcutProvider for DataTable<T> {
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("h/l", "page").with_priority(40),
      ShortcutInfo::new("s", "page size").with_priority(45),
      ShortcutInfo::new("enter", "open").with_priority(50),
    ];
    if self.row_actions {
      shortcuts.push(ShortcutInfo::new("e", "edit").with_priority(55));
      shortcuts.push(ShortcutInfo::new("d", "delete").with_priority(56));
    }
    shortcuts
  }
}

fn alignment(align: Align) -> Alignment {
  match align {
    Align::Left => Alignment::Left,
    Align::Center => Alignment::Center,
    Align::Right => Alignment::Right,
  }
}

fn styled_cell<'a, T: TableRow>(column: &Column<T>, record: &T, index: usize) -> Cell<'a> {
  let value = column.cell(record, index);
  let style = match &value {
    CellValue::Text(_) => Style::default(),
    CellValue::Badge(_) => Style::default().fg(Color::Green).bold(),
    CellValue::Mono(_) => Style::default().fg(Color::Cyan),
    CellValue::Muted(_) => Style::default().fg(Color::DarkGray),
  };
  let text = match column.width {
    Some(w) => truncate(value.text(), w as usize),
    None => value.text().to_string(),
  };
  Cell::from(Line::from(Span::styled(text, style)).alignment(alignment(column.align)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::{Pagination, SearchConfig};
  use crossterm::event::KeyModifiers;
  use serde::Serialize;

  #[derive(Serialize)]
  struct Item {
    id: u64,
    name: String,
  }

  impl TableRow for Item {
    fn row_id(&self) -> u64 {
      self.id
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn items(n: u64) -> Vec<Item> {
    (1..=n)
      .map(|id| Item {
        id,
        name: format!("name {}", id),
      })
      .collect()
  }

  fn table() -> DataTable<Item> {
    let model = TableModel::new(
      vec![Column::new("id", "ID"), Column::new("name", "Name")],
      SearchConfig::new(&["name"]),
      Pagination::new(5, &[5, 10]),
    );
    DataTable::new("Items", model, "Search...").with_row_actions()
  }

  #[test]
  fn test_enter_activates_selected_row() {
    let records = items(7);
    let mut table = table();
    table.handle_key(key(KeyCode::Down), &records);
    assert_eq!(
      table.handle_key(key(KeyCode::Enter), &records),
      KeyResult::Event(TableEvent::RowActivated(2))
    );
  }

  #[test]
  fn test_row_actions_do_not_activate_row() {
    let records = items(7);
    let mut table = table();
    assert_eq!(
      table.handle_key(key(KeyCode::Char('e')), &records),
      KeyResult::Event(TableEvent::RowAction(RowAction::Edit, 1))
    );
    assert_eq!(
      table.handle_key(key(KeyCode::Char('d')), &records),
      KeyResult::Event(TableEvent::RowAction(RowAction::Delete, 1))
    );
  }

  #[test]
  fn test_paging_moves_selection_to_new_page() {
    let records = items(7);
    let mut table = table();
    table.handle_key(key(KeyCode::Char('l')), &records);
    assert_eq!(table.model().pagination().page(), 2);
    assert_eq!(
      table.handle_key(key(KeyCode::Enter), &records),
      KeyResult::Event(TableEvent::RowActivated(6))
    );
    // Already on the last page
    table.handle_key(key(KeyCode::Char('L')), &records);
    table.handle_key(key(KeyCode::Char('l')), &records);
    assert_eq!(table.model().pagination().page(), 2);
  }

  #[test]
  fn test_search_keystrokes_filter_and_reset_page() {
    let records = items(12);
    let mut table = table();
    table.handle_key(key(KeyCode::Char('l')), &records);
    table.handle_key(key(KeyCode::Char('/')), &records);
    assert!(table.is_capturing());
    // 'l' and 'e' are search text now, not paging or editing
    table.handle_key(key(KeyCode::Char('1')), &records);
    assert_eq!(table.model().query(), "1");
    assert_eq!(table.model().pagination().page(), 1);
    table.handle_key(key(KeyCode::Char('e')), &records);
    assert_eq!(table.model().query(), "1e");
  }

  #[test]
  fn test_no_row_no_event() {
    let records: Vec<Item> = Vec::new();
    let mut table = table();
    assert_eq!(table.handle_key(key(KeyCode::Enter), &records), KeyResult::NotHandled);
  }
}
