//! Cross-source timeline assembly.
//!
//! Pipeline, per resolved profile:
//!   LogSource::ALL
//!     └─ join value from the profile     (absent → source skipped)
//!          └─ backing table + columns    (missing → source skipped)
//!               └─ rows_matching()       → TimelineEvent per row
//!                    └─ stable sort by EventTime → Timeline
//!
//! No step can fail. A source that cannot be queried contributes nothing and
//! the rest of the timeline is still produced.

use std::fmt;

use serde::Serialize;

use crate::{
  profile::Profile,
  source::{LogSource, field_label},
  store::ActivityStore,
  table::Row,
  time::EventTime,
};

const UNKNOWN_ENTITY: &str = "UNKNOWN ENTITY";
const NOT_AVAILABLE: &str = "N/A";
const RULE_WIDTH: usize = 30;

// ─── Types ───────────────────────────────────────────────────────────────────

/// One descriptive column of a log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
  pub field: &'static str,
  /// Absent cells and missing columns render as `N/A`.
  pub value: String,
}

impl Detail {
  pub fn label(&self) -> String { field_label(self.field) }
}

/// A log row normalized into the common event shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
  #[serde(skip)]
  pub time:          EventTime,
  /// The timestamp exactly as recorded in the source file.
  pub raw_timestamp: Option<String>,
  pub source:        LogSource,
  pub details:       Vec<Detail>,
  pub subject_name:  String,
}

/// Every event found for one profile, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
  pub subject_name: String,
  pub entity_id:    Option<String>,
  pub events:       Vec<TimelineEvent>,
}

impl Timeline {
  pub fn is_empty(&self) -> bool { self.events.is_empty() }
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Collect and order every event for `profile` across all registered sources.
pub fn assemble<S: ActivityStore + ?Sized>(store: &S, profile: &Profile) -> Timeline {
  let subject_name = profile.name().unwrap_or(UNKNOWN_ENTITY).to_string();

  let mut events: Vec<TimelineEvent> = LogSource::ALL
    .into_iter()
    .flat_map(|source| source_events(store, profile, source, &subject_name))
    .collect();

  // Stable: equal and unparsed times keep registry order, then row order.
  events.sort_by_key(|e| e.time);

  Timeline {
    subject_name,
    entity_id: profile.entity_id().map(str::to_string),
    events,
  }
}

/// The events a single source contributes for `profile`; empty when the
/// source cannot be queried.
pub fn source_events<S: ActivityStore + ?Sized>(
  store: &S,
  profile: &Profile,
  source: LogSource,
  subject_name: &str,
) -> Vec<TimelineEvent> {
  let desc = source.descriptor();

  let Some(join_value) = profile.get(desc.join_key) else {
    tracing::debug!(%source, key = desc.join_key, "profile lacks join key; skipping");
    return Vec::new();
  };
  let Some(table) = store.log_table(source) else {
    tracing::debug!(%source, "log table not loaded; skipping");
    return Vec::new();
  };
  if !table.has_column(desc.join_key) || !table.has_column(desc.timestamp_field) {
    tracing::debug!(%source, "log table lacks join or timestamp column; skipping");
    return Vec::new();
  }

  table
    .rows_matching(desc.join_key, join_value)
    .map(|row| event_from_row(source, &row, subject_name))
    .collect()
}

fn event_from_row(source: LogSource, row: &Row<'_>, subject_name: &str) -> TimelineEvent {
  let desc = source.descriptor();
  let raw = row.get(desc.timestamp_field);
  TimelineEvent {
    time:          EventTime::from_cell(raw),
    raw_timestamp: raw.map(str::to_string),
    source,
    details:       desc
      .descriptive_fields
      .iter()
      .map(|&field| Detail {
        field,
        value: row.get(field).unwrap_or(NOT_AVAILABLE).to_string(),
      })
      .collect(),
    subject_name:  subject_name.to_string(),
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

impl fmt::Display for Timeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "TIMELINE FOR: {} (ID: {})",
      self.subject_name,
      self.entity_id.as_deref().unwrap_or(NOT_AVAILABLE)
    )?;
    write!(f, "{}", "=".repeat(RULE_WIDTH))?;

    if self.events.is_empty() {
      return write!(f, "\nNo logged activities found.");
    }

    for (i, event) in self.events.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "\n{event}")?;
    }
    Ok(())
  }
}

impl fmt::Display for TimelineEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} | Source: {}",
      self.raw_timestamp.as_deref().unwrap_or(NOT_AVAILABLE),
      self.source.label().to_uppercase()
    )?;
    for detail in &self.details {
      write!(f, "\n    {}: {}", detail.label(), detail.value)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::{MemoryStore, profile};

  fn alice() -> Profile {
    profile(&[
      ("entity_id", "E1"),
      ("card_id", "C1"),
      ("name", "Alice"),
      ("face_id", "F1"),
    ])
  }

  #[test]
  fn single_card_swipe() {
    let mut s = MemoryStore::default();
    s.insert_log(LogSource::CardSwipes, &["card_id", "timestamp", "location_id"], &[
      &["C1", "2024-01-01 09:00:00", "GATE1"],
      &["C2", "2024-01-01 10:00:00", "GATE2"],
    ]);

    let timeline = assemble(&s, &alice());
    assert_eq!(timeline.events.len(), 1);
    let event = &timeline.events[0];
    assert_eq!(event.source.label(), "Card Swipe");
    assert_eq!(event.raw_timestamp.as_deref(), Some("2024-01-01 09:00:00"));
    assert_eq!(event.details, vec![Detail {
      field: "location_id",
      value: "GATE1".into(),
    }]);

    let text = timeline.to_string();
    assert_eq!(
      text,
      "TIMELINE FOR: Alice (ID: E1)\n\
       ==============================\n\
       2024-01-01 09:00:00 | Source: CARD SWIPE\n    \
       Location Id: GATE1"
    );
    assert!(!text.contains("No logged activities found."));
  }

  #[test]
  fn events_interleave_by_time_not_registry_order() {
    let mut s = MemoryStore::default();
    s.insert_log(LogSource::CardSwipes, &["card_id", "timestamp", "location_id"], &[
      &["C1", "2024-01-02 08:00:00", "GATE1"],
    ]);
    s.insert_log(
      LogSource::LibraryCheckouts,
      &["entity_id", "timestamp", "book_id"],
      &[&["E1", "2024-01-01 12:00:00", "B7"]],
    );
    s.insert_log(
      LogSource::LabBookings,
      &["entity_id", "start_time", "room_id", "end_time", "attended (YES/NO)"],
      &[&["E1", "2024-01-03 14:00:00", "LAB2", "2024-01-03 16:00:00", "YES"]],
    );

    let timeline = assemble(&s, &alice());
    let order: Vec<_> = timeline.events.iter().map(|e| e.source).collect();
    assert_eq!(order, vec![
      LogSource::LibraryCheckouts,
      LogSource::CardSwipes,
      LogSource::LabBookings,
    ]);
    assert!(timeline.to_string().contains("    Attended: YES"));
  }

  #[test]
  fn ties_and_unparsable_times_are_stable() {
    let mut s = MemoryStore::default();
    s.insert_log(LogSource::CardSwipes, &["card_id", "timestamp", "location_id"], &[
      &["C1", "not a time", "GATE9"],
      &["C1", "2024-01-01 09:00:00", "GATE1"],
    ]);
    s.insert_log(LogSource::CameraFrames, &["face_id", "timestamp", "location_id"], &[
      &["F1", "2024-01-01 09:00:00", "CAM1"],
      &["F1", "", "CAM2"],
    ]);

    let timeline = assemble(&s, &alice());
    let details: Vec<_> = timeline
      .events
      .iter()
      .map(|e| e.details[0].value.as_str())
      .collect();
    assert_eq!(details, vec!["GATE1", "CAM1", "GATE9", "CAM2"]);
    assert!(timeline.to_string().contains("N/A | Source: CAMERA/FACIAL REC"));
  }

  #[test]
  fn missing_identifier_skips_only_that_source() {
    let mut s = MemoryStore::default();
    s.insert_log(LogSource::WifiAssociations, &["device_hash", "timestamp", "ap_id"], &[
      &["", "2024-01-01 08:00:00", "AP1"],
    ]);
    s.insert_log(LogSource::CardSwipes, &["card_id", "timestamp", "location_id"], &[
      &["C1", "2024-01-01 09:00:00", "GATE1"],
    ]);

    let timeline = assemble(&s, &alice());
    assert_eq!(timeline.events.len(), 1);
    assert_eq!(timeline.events[0].source, LogSource::CardSwipes);
  }

  #[test]
  fn missing_tables_and_columns_degrade_gracefully() {
    let mut s = MemoryStore::default();
    // No timestamp column at all.
    s.insert_log(LogSource::CameraFrames, &["face_id", "location_id"], &[&["F1", "CAM1"]]);
    // Descriptive column missing: rendered as N/A.
    s.insert_log(LogSource::CardSwipes, &["card_id", "timestamp"], &[
      &["C1", "2024-01-01 09:00:00"],
    ]);

    let timeline = assemble(&s, &alice());
    assert_eq!(timeline.events.len(), 1);
    assert_eq!(timeline.events[0].details[0].value, "N/A");
  }

  #[test]
  fn empty_timeline_renders_a_single_notice() {
    let s = MemoryStore::default();
    let p = profile(&[("entity_id", "E5")]);
    let timeline = assemble(&s, &p);
    assert!(timeline.is_empty());
    assert_eq!(
      timeline.to_string(),
      "TIMELINE FOR: UNKNOWN ENTITY (ID: E5)\n\
       ==============================\n\
       No logged activities found."
    );
  }

  #[test]
  fn events_are_separated_by_blank_lines_and_assembly_is_idempotent() {
    let mut s = MemoryStore::default();
    s.insert_log(
      LogSource::FreeTextNotes,
      &["entity_id", "timestamp", "category", "text"],
      &[
        &["E1", "2024-02-01 10:00:00", "helpdesk", "printer jam"],
        &["E1", "2024-02-02 10:00:00", "rsvp", ""],
      ],
    );

    let first = assemble(&s, &alice());
    let text = first.to_string();
    assert!(text.contains("printer jam\n\n2024-02-02 10:00:00 | Source: FREE TEXT NOTE"));
    assert!(text.ends_with("    Text: N/A"));
    assert_eq!(first, assemble(&s, &alice()));
  }
}
