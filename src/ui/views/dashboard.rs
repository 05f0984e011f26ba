use crate::api::{ApiQueryKey, Stats};
use crate::query::{Query, QueryState};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

struct Card {
  title: &'static str,
  value: String,
  description: &'static str,
  trend: String,
}

/// Overview with user statistics and quick actions
pub struct DashboardView {
  ctx: ViewContext,
  query: Query<Stats>,
}

impl DashboardView {
  pub fn new(ctx: ViewContext) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::new(move || {
      let api = api.clone();
      async move { api.stats().await }
    });
    query.fetch();

    Self { ctx, query }
  }

  fn cards(stats: Option<&Stats>) -> [Card; 4] {
    let count = |f: fn(&Stats) -> usize| stats.map(f).unwrap_or(0).to_string();
    [
      Card {
        title: "Total Users",
        value: count(|s| s.total_users),
        description: "All registered users",
        trend: stats.map_or_else(|| "+0%".to_string(), |s| s.user_growth.clone()),
      },
      Card {
        title: "Active Users",
        value: count(|s| s.active_users),
        description: "Currently active",
        trend: "+5.2%".to_string(),
      },
      Card {
        title: "New This Month",
        value: count(|s| s.new_users_this_month),
        description: "Recent registrations",
        trend: "+23%".to_string(),
      },
      Card {
        title: "Growth Rate",
        value: "12.5%".to_string(),
        description: "Monthly growth",
        trend: "+2.1%".to_string(),
      },
    ]
  }

  fn render_card(frame: &mut Frame, area: Rect, card: &Card, loading: bool) {
    let block = Block::default()
      .title(format!(" {} ", card.title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let text = if loading {
      vec![
        Line::default(),
        Line::styled("░░░░░░", Style::default().fg(Color::DarkGray)),
      ]
    } else {
      vec![
        Line::default(),
        Line::styled(card.value.clone(), Style::default().fg(Color::White).bold()),
        Line::from(vec![
          Span::styled(card.trend.clone(), Style::default().fg(Color::Green)),
          Span::styled(" from last month", Style::default().fg(Color::DarkGray)),
        ]),
        Line::styled(card.description, Style::default().fg(Color::DarkGray)),
      ]
    };
    frame.render_widget(Paragraph::new(text).block(block), area);
  }

  fn render_actions(frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Quick Actions ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let action = |key: &'static str, label: &'static str| {
      Line::from(vec![
        Span::styled(format!(" <{}>", key), Style::default().fg(Color::Cyan)),
        Span::raw(format!(" {}", label)),
      ])
    };
    let text = vec![
      action("u", "View All Users"),
      action("p", "View All Posts"),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('u') => ViewAction::Navigate("/users".to_string()),
      KeyCode::Char('p') => ViewAction::Navigate("/posts".to_string()),
      KeyCode::Char('r') => {
        self.ctx.api.invalidate_query(ApiQueryKey::Stats);
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Min(0),
      ])
      .split(area);

    let heading = match self.query.state() {
      QueryState::Error(_) => Line::from(vec![
        Span::styled(" Dashboard Overview", Style::default().bold()),
        Span::styled("  (failed to load, press 'r' to retry)", Style::default().fg(Color::Red)),
      ]),
      _ => Line::styled(" Dashboard Overview", Style::default().bold()),
    };
    frame.render_widget(Paragraph::new(heading), chunks[0]);

    let loading = self.query.is_loading();
    let cards = Self::cards(self.query.data());
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 4); 4])
      .split(chunks[1]);
    for (card, area) in cards.iter().zip(columns.iter()) {
      Self::render_card(frame, *area, card, loading);
    }

    Self::render_actions(frame, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn tick(&mut self) {
    if self.query.poll() && self.query.is_error() {
      self.ctx.notifier.error("Failed to load dashboard stats.");
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("u", "users").with_priority(20),
      ShortcutInfo::new("p", "posts").with_priority(21),
      ShortcutInfo::new("r", "reload").with_priority(60),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cards_without_stats_show_zero() {
    let cards = DashboardView::cards(None);
    assert_eq!(cards[0].value, "0");
    assert_eq!(cards[0].trend, "+0%");
    assert_eq!(cards[3].value, "12.5%");
  }

  #[test]
  fn test_cards_show_stats() {
    let stats = Stats {
      total_users: 10,
      active_users: 8,
      new_users_this_month: 2,
      user_growth: "+12.5%".to_string(),
    };
    let cards = DashboardView::cards(Some(&stats));
    let values: Vec<_> = cards.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["10", "8", "2", "12.5%"]);
    assert_eq!(cards[0].trend, "+12.5%");
  }
}
