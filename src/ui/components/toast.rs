use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub kind: ToastKind,
  pub message: String,
  shown_at: Instant,
}

impl Toast {
  fn new(kind: ToastKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
      shown_at: Instant::now(),
    }
  }
}

/// Sending side of the notification sink; cheap to clone into views
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Toast>,
}

impl Notifier {
  pub fn success(&self, message: impl Into<String>) {
    let _ = self.tx.send(Toast::new(ToastKind::Success, message));
  }

  pub fn error(&self, message: impl Into<String>) {
    let _ = self.tx.send(Toast::new(ToastKind::Error, message));
  }
}

/// Notifications currently on screen
pub struct Toasts {
  rx: mpsc::UnboundedReceiver<Toast>,
  visible: Vec<Toast>,
}

impl Toasts {
  pub fn new() -> (Self, Notifier) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
      Self {
        rx,
        visible: Vec::new(),
      },
      Notifier { tx },
    )
  }

  /// Take in new toasts and drop expired ones
  pub fn tick(&mut self) {
    while let Ok(toast) = self.rx.try_recv() {
      self.visible.push(toast);
    }
    self.visible.retain(|t| t.shown_at.elapsed() < TOAST_TTL);
    let overflow = self.visible.len().saturating_sub(MAX_VISIBLE);
    self.visible.drain(..overflow);
  }

  /// Close the newest toast
  pub fn dismiss(&mut self) -> bool {
    self.visible.pop().is_some()
  }

  pub fn visible(&self) -> &[Toast] {
    &self.visible
  }

  /// Stack toasts in the bottom-right corner of `area`
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width);
    let mut bottom = area.y + area.height;

    for toast in self.visible.iter().rev() {
      if bottom < area.y + 3 {
        break;
      }
      let rect = Rect::new(area.x + area.width - width, bottom - 3, width, 3);
      bottom -= 3;

      let (color, label) = match toast.kind {
        ToastKind::Success => (Color::Green, " ok "),
        ToastKind::Error => (Color::Red, " error "),
      };
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(label, Style::default().fg(color).bold()));

      frame.render_widget(Clear, rect);
      frame.render_widget(
        Paragraph::new(toast.message.as_str())
          .wrap(Wrap { trim: true })
          .block(block),
        rect,
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_notifier_feeds_toasts() {
    let (mut toasts, notifier) = Toasts::new();
    notifier.success("User created successfully.");
    notifier.error("Failed to delete post.");
    toasts.tick();

    let kinds: Vec<_> = toasts.visible().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![ToastKind::Success, ToastKind::Error]);
    assert!(toasts.dismiss());
    assert_eq!(toasts.visible()[0].message, "User created successfully.");
  }

  #[tokio::test]
  async fn test_only_newest_stay_visible() {
    let (mut toasts, notifier) = Toasts::new();
    for i in 0..5 {
      notifier.success(format!("toast {}", i));
    }
    toasts.tick();
    assert_eq!(toasts.visible().len(), MAX_VISIBLE);
    assert_eq!(toasts.visible()[0].message, "toast 2");
  }
}
