//! Report pane: right panel. Shows the selected profile's summary, or the
//! timeline, prediction or face report once one is opened.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, Screen};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the report pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title = match &app.report {
    Some(report) => format!(" {} ", report.kind.title()),
    None => " Profile ".to_string(),
  };
  let border = if app.screen == Screen::Report {
    Color::Cyan
  } else {
    Color::DarkGray
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let lines: Vec<Line> = match (&app.report, app.selected()) {
    (Some(report), _) => report.body.lines().map(style_line).collect(),
    (None, Some(profile)) => {
      let mut lines: Vec<Line> = profile
        .fields()
        .map(|(field, value)| {
          Line::from(vec![
            Span::styled(
              format!("{field:<14}"),
              Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            ),
            Span::raw(value.to_string()),
          ])
        })
        .collect();
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        "[t] timeline  [p] predict location  [f] face image",
        Style::default().fg(Color::DarkGray),
      )));
      lines
    }
    (None, None) => vec![Line::from(Span::styled(
      "Search for a person, then select a match.",
      Style::default().fg(Color::DarkGray),
    ))],
  };

  let para = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: false })
    .scroll((app.report_scroll, 0));
  f.render_widget(para, area);
}

// ─── Line styling ─────────────────────────────────────────────────────────────

/// Highlight event headers and detail labels in a rendered report.
fn style_line(line: &str) -> Line<'static> {
  if let Some((label, value)) = line.strip_prefix("    ").and_then(|l| l.split_once(": ")) {
    return Line::from(vec![
      Span::raw("    "),
      Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
      Span::raw(value.to_string()),
    ]);
  }
  if line.contains(" | Source: ")
    || line.starts_with("TIMELINE FOR:")
    || line.starts_with("RESULT:")
  {
    return Line::from(Span::styled(
      line.to_string(),
      Style::default().add_modifier(Modifier::BOLD),
    ));
  }
  if line.starts_with("ERROR") || line.starts_with("Error:") {
    return Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Red)));
  }
  Line::from(line.to_string())
}
