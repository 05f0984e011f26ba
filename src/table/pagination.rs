/// Page position and size of one table.
///
/// Pages are 1-based. The page is clamped to `1..=total_pages(count)` with at
/// least one page even when nothing matches; moving past either edge is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
  page: usize,
  page_size: usize,
  options: Vec<usize>,
}

impl Pagination {
  /// `page_size` falls back to the first option when it is not one of `options`
  pub fn new(page_size: usize, options: &[usize]) -> Self {
    let mut options: Vec<usize> = options.iter().copied().filter(|&n| n > 0).collect();
    if options.is_empty() {
      options.push(page_size.max(1));
    }
    let page_size = if options.contains(&page_size) {
      page_size
    } else {
      options[0]
    };
    Self {
      page: 1,
      page_size,
      options,
    }
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn options(&self) -> &[usize] {
    &self.options
  }

  pub fn total_pages(&self, count: usize) -> usize {
    count.div_ceil(self.page_size).max(1)
  }

  /// Index range of the current page within `count` items
  pub fn range(&self, count: usize) -> std::ops::Range<usize> {
    let page = self.page.min(self.total_pages(count));
    let start = ((page - 1) * self.page_size).min(count);
    let end = (start + self.page_size).min(count);
    start..end
  }

  /// Re-apply the bounds after the item count changed
  pub fn clamp(&mut self, count: usize) {
    self.page = self.page.clamp(1, self.total_pages(count));
  }

  pub fn first(&mut self) {
    self.page = 1;
  }

  pub fn previous(&mut self) {
    self.page = self.page.saturating_sub(1).max(1);
  }

  pub fn next(&mut self, count: usize) {
    self.page = (self.page + 1).min(self.total_pages(count));
  }

  pub fn last(&mut self, count: usize) {
    self.page = self.total_pages(count);
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }

  pub fn has_next(&self, count: usize) -> bool {
    self.page < self.total_pages(count)
  }

  /// Change the page size; always returns to the first page.
  /// Sizes outside the allowed options are ignored.
  pub fn set_page_size(&mut self, page_size: usize) -> bool {
    if !self.options.contains(&page_size) {
      return false;
    }
    self.page_size = page_size;
    self.page = 1;
    true
  }

  /// Step to the next allowed size, wrapping around
  pub fn cycle_page_size(&mut self) {
    let idx = self
      .options
      .iter()
      .position(|&n| n == self.page_size)
      .map(|i| (i + 1) % self.options.len())
      .unwrap_or(0);
    self.set_page_size(self.options[idx]);
  }
}
