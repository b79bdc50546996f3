//! TUI rendering: orchestrates all panes.

pub mod match_list;
pub mod report;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use warden_core::store::ActivityStore;

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, query, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(3), // query
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_query(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let left = Span::styled(
    " warden  [/] search  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!(
      "{} profiles from {} ",
      app.session.store().profiles().len(),
      app.session.settings().data_dir.display()
    ),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Query ────────────────────────────────────────────────────────────────────

fn draw_query(f: &mut Frame, area: Rect, app: &App) {
  let border = if app.editing { Color::Yellow } else { Color::DarkGray };
  let block = Block::default()
    .title(" Search (Name, ID, Email, Card, Device) ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut spans = vec![Span::raw(app.query.clone())];
  if app.editing {
    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    if let Some(top) = app.suggestions().first()
      && *top != app.query
    {
      spans.push(Span::styled(
        format!("   Tab → {top}"),
        Style::default().fg(Color::DarkGray),
      ));
    }
  }

  f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  // Split into left list pane (35%) and right report pane (65%).
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  match_list::draw(f, cols[0], app);
  report::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    _ if app.editing => (
      "SEARCH",
      "Type a query  Tab complete  Enter search  Esc cancel",
    ),
    Screen::Matches => (
      "NORMAL",
      "↑↓/jk move  t timeline  p predict  f face  r reload  / search  q quit",
    ),
    Screen::Report => (
      "REPORT",
      "↑↓/jk scroll  t/p/f switch  r reload  Esc back  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
