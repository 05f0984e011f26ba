use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, title, breadcrumb and signed-in user
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  breadcrumb: &[String],
  user_name: Option<&str>,
) {
  let mut spans = vec![
    Span::styled(" d9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::raw(" "),
  ];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }

  let right = match user_name {
    Some(name) => Line::from(vec![
      Span::styled(name.to_string(), Style::default().fg(Color::Green)),
      Span::raw(" "),
    ]),
    None => Line::styled("signed out ", Style::default().fg(Color::DarkGray)),
  };

  let bar = Style::default().bg(Color::Black);
  frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
  frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), area);
}
