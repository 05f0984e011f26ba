pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use renderfns::{draw_footer, draw_header};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Shortcuts
    ])
    .split(frame.area());

  draw_header(
    frame,
    chunks[0],
    &app.title(),
    &app.view_breadcrumb(),
    app.user_name(),
  );

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  draw_footer(frame, chunks[2], &app.shortcuts());

  // Overlays on top of everything
  app.command_input().render_overlay(frame, chunks[1]);
  app.toasts().render(frame, chunks[1]);
}
