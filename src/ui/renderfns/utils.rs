use ratatui::prelude::*;
use ratatui::widgets::TableState;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

/// Box anchored to the top-left of `area` for palette-style prompts
pub fn overlay_rect(area: Rect, height: u16) -> Rect {
  let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
  Rect::new(
    area.x + 1.min(area.width),
    area.y + 1.min(area.height),
    width.min(area.width.saturating_sub(1)),
    height.min(area.height.saturating_sub(1)),
  )
}

/// Keep a table selection inside `len` rows; select the first row if none
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("Zoë Zoë Zoë", 6), "Zoë...");
  }

  #[test]
  fn test_overlay_rect_fits_small_areas() {
    let rect = overlay_rect(Rect::new(0, 0, 20, 2), 5);
    assert_eq!(rect, Rect::new(1, 1, 19, 1));

    let rect = overlay_rect(Rect::new(0, 0, 120, 40), 3);
    assert_eq!(rect, Rect::new(1, 1, 60, 3));
  }

  #[test]
  fn test_centered_rect() {
    let area = Rect::new(0, 0, 100, 40);
    assert_eq!(centered_rect(60, 10, area), Rect::new(20, 15, 60, 10));
    // Larger than the area
    assert_eq!(centered_rect(200, 80, area), area);
  }

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = TableState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
