//! Searchable, paginated tables over arbitrary records.
//!
//! Nothing here knows about the network or the cache: a table is a function
//! of the records it is handed, its columns, its search configuration and
//! its pagination state. Rendering lives in `ui::components::DataTable`.

mod column;
mod pagination;
mod search;

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

pub use column::{Align, CellValue, Column};
pub use pagination::Pagination;
pub use search::SearchConfig;

/// A record that can be shown as a table row
pub trait Row: Serialize {
  fn row_id(&self) -> u64;
}

/// What the table reports to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
  /// The row itself was activated
  RowActivated(u64),
  /// A per-row action was triggered; never accompanied by `RowActivated`
  RowAction(RowAction, u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
  Edit,
  Delete,
}

/// Why a table has no rows to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
  /// The search filtered everything out
  NoResults,
  /// There were no records to begin with
  NoData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyMessages {
  pub no_data_title: String,
  pub no_data_description: String,
  pub no_results_title: String,
}

impl Default for EmptyMessages {
  fn default() -> Self {
    Self {
      no_data_title: "No data available".to_string(),
      no_data_description: "There are currently no items to display.".to_string(),
      no_results_title: "No results found".to_string(),
    }
  }
}

impl EmptyMessages {
  /// Title and description for an empty state
  pub fn for_state(&self, state: EmptyState, query: &str) -> (String, String) {
    match state {
      EmptyState::NoData => (self.no_data_title.clone(), self.no_data_description.clone()),
      EmptyState::NoResults => (
        self.no_results_title.clone(),
        format!("No items match \"{}\". Try a different search.", query),
      ),
    }
  }
}

/// The rows of the current page plus what is needed to draw its controls
#[derive(Debug)]
pub struct PageView<'a, T> {
  pub rows: Vec<&'a T>,
  pub page: usize,
  pub total_pages: usize,
  pub filtered_count: usize,
  pub total_count: usize,
  /// Index of the first row of the page within the filtered records
  pub offset: usize,
  pub empty: Option<EmptyState>,
}

/// Columns, search and pagination state of one table instance.
pub struct TableModel<T> {
  columns: Vec<Column<T>>,
  search: SearchConfig<T>,
  query: String,
  pagination: Pagination,
  pub messages: EmptyMessages,
}

impl<T: Serialize> TableModel<T> {
  /// Columns whose key was already used are dropped
  pub fn new(columns: Vec<Column<T>>, search: SearchConfig<T>, pagination: Pagination) -> Self {
    let mut seen = HashSet::new();
    let columns = columns
      .into_iter()
      .filter(|c| {
        let fresh = seen.insert(c.key);
        if !fresh {
          warn!(key = c.key, "duplicate column key dropped");
        }
        fresh
      })
      .collect();
    Self {
      columns,
      search,
      query: String::new(),
      pagination,
      messages: EmptyMessages::default(),
    }
  }

  pub fn with_messages(mut self, messages: EmptyMessages) -> Self {
    self.messages = messages;
    self
  }

  pub fn columns(&self) -> &[Column<T>] {
    &self.columns
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn pagination(&self) -> &Pagination {
    &self.pagination
  }

  /// Replace the search query; the page returns to 1
  pub fn set_query(&mut self, query: impl Into<String>) {
    self.query = query.into();
    self.pagination.first();
  }

  pub fn cycle_page_size(&mut self) {
    self.pagination.cycle_page_size();
  }

  pub fn filtered<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
    self.search.filter(records, &self.query)
  }

  pub fn first_page(&mut self) {
    self.pagination.first();
  }

  pub fn previous_page(&mut self) {
    self.pagination.previous();
  }

  pub fn next_page(&mut self, records: &[T]) {
    let count = self.filtered(records).len();
    self.pagination.next(count);
  }

  pub fn last_page(&mut self, records: &[T]) {
    let count = self.filtered(records).len();
    self.pagination.last(count);
  }

  /// Compute the visible page. Also re-clamps the page, since the records
  /// may have changed since the last call.
  pub fn view<'a>(&mut self, records: &'a [T]) -> PageView<'a, T> {
    let filtered = self.filtered(records);
    let filtered_count = filtered.len();
    self.pagination.clamp(filtered_count);
    let range = self.pagination.range(filtered_count);

    let empty = match (records.is_empty(), filtered_count) {
      (true, _) => Some(EmptyState::NoData),
      (false, 0) => Some(EmptyState::NoResults),
      _ => None,
    };

    PageView {
      offset: range.start,
      rows: filtered[range].to_vec(),
      page: self.pagination.page(),
      total_pages: self.pagination.total_pages(filtered_count),
      filtered_count,
      total_count: records.len(),
      empty,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[derive(Serialize)]
  struct Item {
    id: u64,
    name: String,
  }

  fn items(n: u64) -> Vec<Item> {
    (1..=n)
      .map(|id| Item {
        id,
        name: format!("item {}", id),
      })
      .collect()
  }

  fn model() -> TableModel<Item> {
    TableModel::new(
      vec![Column::new("id", "ID"), Column::new("name", "Name")],
      SearchConfig::new(&["name"]),
      Pagination::new(5, &[5, 10, 20, 50]),
    )
  }

  fn ids(view: &PageView<'_, Item>) -> Vec<u64> {
    view.rows.iter().map(|i| i.id).collect()
  }

  #[test]
  fn test_seven_records_two_pages() {
    let records = items(7);
    let mut table = model();

    let page = table.view(&records);
    assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
    assert_eq!(page.total_pages, 2);

    table.next_page(&records);
    let page = table.view(&records);
    assert_eq!(ids(&page), vec![6, 7]);
    assert_eq!(page.offset, 5);
  }

  #[test]
  fn test_query_change_resets_page() {
    let records = items(30);
    let mut table = model();
    table.last_page(&records);
    assert_eq!(table.pagination().page(), 6);

    table.set_query("item");
    assert_eq!(table.pagination().page(), 1);
  }

  #[test]
  fn test_page_size_change_resets_page() {
    let records = items(30);
    let mut table = model();
    table.next_page(&records);
    table.cycle_page_size();
    assert_eq!(table.pagination().page(), 1);
    assert_eq!(table.pagination().page_size(), 10);
  }

  #[test]
  fn test_pages_over_filtered_records() {
    // "item 1", "item 10".."item 19" = 11 matches
    let records = items(20);
    let mut table = model();
    table.set_query("item 1");
    let page = table.view(&records);
    assert_eq!(page.filtered_count, 11);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_count, 20);
  }

  #[rstest]
  #[case(0, "", Some(EmptyState::NoData))]
  #[case(0, "x", Some(EmptyState::NoData))]
  #[case(3, "nothing", Some(EmptyState::NoResults))]
  #[case(3, "", None)]
  fn test_empty_state_cause(
    #[case] n: u64,
    #[case] query: &str,
    #[case] expected: Option<EmptyState>,
  ) {
    let records = items(n);
    let mut table = model();
    table.set_query(query);
    let page = table.view(&records);
    assert_eq!(page.empty, expected);
    assert_eq!(page.total_pages, 1);
  }

  #[test]
  fn test_records_shrinking_clamps_page() {
    let mut table = model();
    table.last_page(&items(30));
    let fewer = items(7);
    let page = table.view(&fewer);
    assert_eq!(page.page, 2);
    assert_eq!(ids(&page), vec![6, 7]);
  }

  #[test]
  fn test_duplicate_column_keys_are_dropped() {
    let table = TableModel::<Item>::new(
      vec![
        Column::new("id", "ID"),
        Column::new("name", "Name"),
        Column::new("id", "Again"),
      ],
      SearchConfig::new(&["name"]),
      Pagination::new(5, &[5]),
    );
    let headers: Vec<_> = table.columns().iter().map(|c| c.header).collect();
    assert_eq!(headers, vec!["ID", "Name"]);
  }

  #[test]
  fn test_no_results_message_mentions_query() {
    let (title, description) = EmptyMessages::default().for_state(EmptyState::NoResults, "zz");
    assert_eq!(title, "No results found");
    assert!(description.contains("\"zz\""));
  }
}
