//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use warden_core::profile::Profile;

use crate::session::{Search, Session};

/// Type-ahead entries shown under the query.
const MAX_SUGGESTIONS: usize = 8;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the match list; the right pane shows the selected summary.
  Matches,
  /// Focus on the report pane.
  Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
  Timeline,
  Prediction,
  Face,
}

impl ReportKind {
  pub fn title(self) -> &'static str {
    match self {
      Self::Timeline => "Timeline",
      Self::Prediction => "Prediction",
      Self::Face => "Face",
    }
  }
}

/// Text shown in the report pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub kind: ReportKind,
  pub body: String,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub session: Session,

  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Search query as typed.
  pub query: String,

  /// Whether keystrokes go into `query`.
  pub editing: bool,

  /// Identifier values offered for type-ahead.
  pub identifiers: Vec<String>,

  /// Profiles matching the last submitted query.
  pub matches: Vec<Profile>,

  /// Cursor position within `matches`.
  pub cursor: usize,

  pub report: Option<Report>,

  /// Scroll offset within the report.
  pub report_scroll: u16,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Query the current `matches` came from; re-run on reload.
  last_query: Option<String>,
}

impl App {
  pub fn new(session: Session) -> Self {
    let identifiers = session.suggestions();
    let status_msg = if session.predictor_ready() {
      String::new()
    } else {
      "Location predictor unavailable.".to_string()
    };
    Self {
      session,
      screen: Screen::Matches,
      query: String::new(),
      editing: true,
      identifiers,
      matches: Vec::new(),
      cursor: 0,
      report: None,
      report_scroll: 0,
      status_msg,
      last_query: None,
    }
  }

  // ── Type-ahead ────────────────────────────────────────────────────────────

  /// Identifiers fuzzily matching the query, best first.
  pub fn suggestions(&self) -> Vec<&str> {
    let query = self.query.trim();
    if query.is_empty() {
      return Vec::new();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = self
      .identifiers
      .iter()
      .filter_map(|id| matcher.fuzzy_match(id, query).map(|s| (s, id.as_str())))
      .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
      .into_iter()
      .take(MAX_SUGGESTIONS)
      .map(|(_, id)| id)
      .collect()
  }

  /// The profile under the cursor, if any.
  pub fn selected(&self) -> Option<&Profile> { self.matches.get(self.cursor) }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn run_search(&mut self) {
    let result = self.session.search(&self.query);
    self.cursor = 0;
    self.report = None;
    self.screen = Screen::Matches;
    self.last_query = Some(self.query.clone());
    self.status_msg = match &result {
      Search::Matches(found) => format!("{} match(es)", found.len()),
      other => other.to_string(),
    };
    self.matches = match result {
      Search::Matches(found) => found,
      _ => Vec::new(),
    };
  }

  fn open_report(&mut self, kind: ReportKind) {
    let Some(id) = self
      .selected()
      .and_then(|p| p.entity_id())
      .map(str::to_string)
    else {
      self.status_msg = "Select a match first.".into();
      return;
    };

    let body = match kind {
      ReportKind::Timeline => self.session.timeline(&id).map(|t| t.to_string()),
      ReportKind::Prediction => self.session.predict_for(&id).map(|r| r.to_string()),
      ReportKind::Face => self.session.face_image(&id).map(|f| f.to_string()),
    };
    let body = body.unwrap_or_else(|e| e.to_string());

    self.report = Some(Report { kind, body });
    self.report_scroll = 0;
    self.screen = Screen::Report;
    self.status_msg.clear();
  }

  fn reload(&mut self) {
    match self.session.reload() {
      Ok(()) => {
        self.identifiers = self.session.suggestions();
        if self.last_query.is_some() {
          self.run_search();
        }
        let warnings = self.session.store().warnings().len();
        self.status_msg = format!("Reloaded data ({warnings} warning(s)).");
      }
      Err(e) => self.status_msg = format!("Error: {e:#}"),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.editing {
      self.handle_query_key(key);
      return true;
    }

    match self.screen {
      Screen::Matches => self.handle_matches_key(key),
      Screen::Report => self.handle_report_key(key),
    }
  }

  fn handle_query_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.editing = false,
      KeyCode::Enter => {
        self.editing = false;
        self.run_search();
      }
      KeyCode::Tab => {
        let top = self.suggestions().first().map(|s| s.to_string());
        if let Some(top) = top {
          self.query = top;
        }
      }
      KeyCode::Backspace => {
        self.query.pop();
      }
      KeyCode::Char(c) => self.query.push(c),
      _ => {}
    }
  }

  fn handle_matches_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.matches.len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      KeyCode::Char('/') => {
        self.editing = true;
        self.query.clear();
      }
      KeyCode::Enter => self.run_search(),

      KeyCode::Char('t') => self.open_report(ReportKind::Timeline),
      KeyCode::Char('p') => self.open_report(ReportKind::Prediction),
      KeyCode::Char('f') => self.open_report(ReportKind::Face),
      KeyCode::Char('r') => self.reload(),

      _ => {}
    }
    true
  }

  fn handle_report_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Matches;
        self.report = None;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        self.report_scroll = self.report_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.report_scroll = self.report_scroll.saturating_sub(1);
      }

      KeyCode::Char('t') => self.open_report(ReportKind::Timeline),
      KeyCode::Char('p') => self.open_report(ReportKind::Prediction),
      KeyCode::Char('f') => self.open_report(ReportKind::Face),
      KeyCode::Char('r') => self.reload(),
      KeyCode::Char('/') => {
        self.screen = Screen::Matches;
        self.editing = true;
        self.query.clear();
      }

      _ => {}
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::fixture_session;

  fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  #[test]
  fn search_then_timeline_then_back() {
    let root = tempfile::tempdir().unwrap();
    let mut app = App::new(fixture_session(root.path()));

    type_str(&mut app, "ada");
    press(&mut app, KeyCode::Enter);
    assert!(!app.editing);
    assert_eq!(app.matches.len(), 1);

    press(&mut app, KeyCode::Char('t'));
    assert_eq!(app.screen, Screen::Report);
    let report = app.report.as_ref().unwrap();
    assert_eq!(report.kind, ReportKind::Timeline);
    assert!(report.body.starts_with("TIMELINE FOR: Ada Lovelace (ID: E1)"));

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.screen, Screen::Matches);
    assert!(app.report.is_none());
    assert!(!press(&mut app, KeyCode::Char('q')));
  }

  #[test]
  fn empty_and_missing_queries_set_status() {
    let root = tempfile::tempdir().unwrap();
    let mut app = App::new(fixture_session(root.path()));

    press(&mut app, KeyCode::Enter);
    assert_eq!(
      app.status_msg,
      "Please enter a search term (Name, ID, Email, etc.)."
    );

    press(&mut app, KeyCode::Char('/'));
    type_str(&mut app, "zzz");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.status_msg, "No profile matches found for 'zzz'.");
    assert!(app.matches.is_empty());

    press(&mut app, KeyCode::Char('p'));
    assert_eq!(app.status_msg, "Select a match first.");
    assert_eq!(app.screen, Screen::Matches);
  }

  #[test]
  fn tab_accepts_top_suggestion() {
    let root = tempfile::tempdir().unwrap();
    let mut app = App::new(fixture_session(root.path()));

    type_str(&mut app, "cb@");
    assert_eq!(app.suggestions().first().copied(), Some("cb@uni.edu"));
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.query, "cb@uni.edu");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.selected().and_then(|p| p.entity_id()), Some("E2"));
  }

  #[test]
  fn cursor_stays_in_bounds() {
    let root = tempfile::tempdir().unwrap();
    let mut app = App::new(fixture_session(root.path()));

    type_str(&mut app, "a");
    press(&mut app, KeyCode::Enter);
    let n = app.matches.len();
    assert!(n >= 1);
    for _ in 0..n + 3 {
      press(&mut app, KeyCode::Char('j'));
    }
    assert_eq!(app.cursor, n - 1);
    for _ in 0..n + 3 {
      press(&mut app, KeyCode::Char('k'));
    }
    assert_eq!(app.cursor, 0);
  }

  #[test]
  fn prediction_and_face_reports() {
    let root = tempfile::tempdir().unwrap();
    let mut app = App::new(fixture_session(root.path()));

    type_str(&mut app, "E1");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Char('p'));
    let body = &app.report.as_ref().unwrap().body;
    assert!(body.contains("RESULT: Predicted Next Location: GATE"));

    press(&mut app, KeyCode::Char('f'));
    let report = app.report.as_ref().unwrap();
    assert_eq!(report.kind, ReportKind::Face);
    assert!(report.body.contains("F1.jpg"));
  }
}
