//! Match list pane: left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{App, Screen};

/// Render the profiles matching the last query into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let border = if app.screen == Screen::Matches && !app.editing {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(format!(" Matches ({}) ", app.matches.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = app
    .matches
    .iter()
    .map(|profile| {
      let kind = if profile.is_student() { "S " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(kind, Style::default().fg(Color::Cyan)),
        Span::raw(profile.name().unwrap_or("N/A").to_string()),
        Span::styled(
          format!("  {}", profile.entity_id().unwrap_or("N/A")),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if app.matches.is_empty() {
    None
  } else {
    Some(app.cursor)
  });

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
