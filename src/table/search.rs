use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::column::field_text;

type Extractor<T> = Arc<dyn Fn(&T, &str) -> Option<String> + Send + Sync>;

/// Which fields a live search looks at, and how their values are read.
pub struct SearchConfig<T> {
  pub fields: Vec<&'static str>,
  /// Returns the searchable text for a field, or `None` to fall back to the
  /// record's own field. Used for derived values such as a post's author.
  extractor: Option<Extractor<T>>,
}

impl<T> Clone for SearchConfig<T> {
  fn clone(&self) -> Self {
    Self {
      fields: self.fields.clone(),
      extractor: self.extractor.clone(),
    }
  }
}

impl<T> fmt::Debug for SearchConfig<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SearchConfig")
      .field("fields", &self.fields)
      .field("extractor", &self.extractor.is_some())
      .finish()
  }
}

impl<T: Serialize> SearchConfig<T> {
  pub fn new(fields: &[&'static str]) -> Self {
    Self {
      fields: fields.to_vec(),
      extractor: None,
    }
  }

  pub fn with_extractor<F>(mut self, extractor: F) -> Self
  where
    F: Fn(&T, &str) -> Option<String> + Send + Sync + 'static,
  {
    self.extractor = Some(Arc::new(extractor));
    self
  }

  pub fn value(&self, record: &T, field: &str) -> String {
    self
      .extractor
      .as_ref()
      .and_then(|extract| extract(record, field))
      .unwrap_or_else(|| field_text(record, field))
  }

  /// Case-insensitive substring match on any configured field.
  /// A blank query matches everything.
  pub fn matches(&self, record: &T, query: &str) -> bool {
    if query.trim().is_empty() {
      return true;
    }
    let needle = query.to_lowercase();
    self
      .fields
      .iter()
      .any(|field| self.value(record, field).to_lowercase().contains(&needle))
  }

  pub fn filter<'a>(&self, records: &'a [T], query: &str) -> Vec<&'a T> {
    records.iter().filter(|r| self.matches(r, query)).collect()
  }
}
