use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

/// What a cell shows. The variant is a rendering hint; the text is the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
  Text(String),
  /// Short label drawn with emphasis (usernames, authors...)
  Badge(String),
  /// Identifiers and other fixed-width values
  Mono(String),
  /// Secondary text
  Muted(String),
}

impl CellValue {
  pub fn text(&self) -> &str {
    match self {
      Self::Text(s) | Self::Badge(s) | Self::Mono(s) | Self::Muted(s) => s,
    }
  }
}

impl fmt::Display for CellValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.text())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
  #[default]
  Left,
  Center,
  Right,
}

type RenderFn<T> = Arc<dyn Fn(&T, usize) -> CellValue + Send + Sync>;

/// Describes one column of a table.
pub struct Column<T> {
  /// Unique within a table; also the record field used when `render` is absent
  pub key: &'static str,
  pub header: &'static str,
  /// Fixed width in cells, `None` shares the remaining space
  pub width: Option<u16>,
  pub align: Align,
  render: Option<RenderFn<T>>,
}

impl<T> Clone for Column<T> {
  fn clone(&self) -> Self {
    Self {
      key: self.key,
      header: self.header,
      width: self.width,
      align: self.align,
      render: self.render.clone(),
    }
  }
}

impl<T> fmt::Debug for Column<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Column")
      .field("key", &self.key)
      .field("header", &self.header)
      .field("width", &self.width)
      .field("align", &self.align)
      .field("render", &self.render.is_some())
      .finish()
  }
}

impl<T: Serialize> Column<T> {
  pub fn new(key: &'static str, header: &'static str) -> Self {
    Self {
      key,
      header,
      width: None,
      align: Align::Left,
      render: None,
    }
  }

  pub fn width(mut self, width: u16) -> Self {
    self.width = Some(width);
    self
  }

  pub fn align(mut self, align: Align) -> Self {
    self.align = align;
    self
  }

  /// Render cells with `render(record, row_index)` instead of the raw field
  pub fn render<F>(mut self, render: F) -> Self
  where
    F: Fn(&T, usize) -> CellValue + Send + Sync + 'static,
  {
    self.render = Some(Arc::new(render));
    self
  }

  pub fn cell(&self, record: &T, index: usize) -> CellValue {
    match &self.render {
      Some(render) => render(record, index),
      None => CellValue::Text(field_text(record, self.key)),
    }
  }
}

/// String form of `record[key]`: strings verbatim, scalars via Display,
/// null or missing as "", nested values as JSON.
pub fn field_text<T: Serialize>(record: &T, key: &str) -> String {
  match serde_json::to_value(record) {
    Ok(Value::Object(map)) => map.get(key).map(value_text).unwrap_or_default(),
    _ => String::new(),
  }
}

fn value_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
    other => other.to_string(),
  }
}
