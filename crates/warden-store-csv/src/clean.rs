//! One-shot cleaning of raw exports into the directory [`crate::CsvStore`]
//! reads.
//!
//! Per input file the plan says which timestamp columns to normalize and
//! whether the profile identifier dedupe applies. A missing or unreadable
//! input is skipped; the rest of the plan still runs.

use std::{
  collections::{BTreeMap, HashSet},
  fs,
  path::PathBuf,
};

use serde::Serialize;
use warden_core::{
  profile::{ENTITY_ID, STAFF_ID, STUDENT_ID},
  source::LogSource,
  time::{CANONICAL_FORMAT, EventTime, check_format},
};

use crate::{
  Result,
  csv_io::{RawTable, read_raw, write_raw},
  store::PROFILES_FILE,
};

/// File name of the raw profiles export.
pub const RAW_PROFILES_FILE: &str = "student or staff profiles.csv";

/// Exports copied through untouched.
const PASSTHROUGH_FILES: &[&str] = &["face_embeddings.csv"];

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CleanerConfig {
  pub source_dir:       PathBuf,
  pub output_dir:       PathBuf,
  /// `strftime` layout every timestamp column is rewritten to.
  pub timestamp_format: String,
}

impl CleanerConfig {
  pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
    Self {
      source_dir:       source_dir.into(),
      output_dir:       output_dir.into(),
      timestamp_format: CANONICAL_FORMAT.to_string(),
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

struct Step {
  input:             String,
  output:            String,
  timestamp_columns: Vec<&'static str>,
  dedupe_ids:        bool,
}

fn plan() -> Vec<Step> {
  let mut steps = vec![Step {
    input:             RAW_PROFILES_FILE.to_string(),
    output:            PROFILES_FILE.to_string(),
    timestamp_columns: Vec::new(),
    dedupe_ids:        true,
  }];
  for source in LogSource::ALL {
    let desc = source.descriptor();
    let mut timestamp_columns = vec![desc.timestamp_field];
    if source == LogSource::LabBookings {
      timestamp_columns.push("end_time");
    }
    steps.push(Step {
      input: desc.file_name.to_string(),
      output: desc.file_name.to_string(),
      timestamp_columns,
      dedupe_ids: false,
    });
  }
  for &file in PASSTHROUGH_FILES {
    steps.push(Step {
      input:             file.to_string(),
      output:            file.to_string(),
      timestamp_columns: Vec::new(),
      dedupe_ids:        false,
    });
  }
  steps
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// A duplicate secondary identifier that was given a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdReassignment {
  pub column:    &'static str,
  pub entity_id: Option<String>,
  pub old:       String,
  pub new:       String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
  pub written:       Vec<PathBuf>,
  /// `(input file, reason)` for every step that did not produce output.
  pub skipped:       Vec<(String, String)>,
  pub reassignments: Vec<IdReassignment>,
}

// ─── Cleaner ─────────────────────────────────────────────────────────────────

pub struct Cleaner {
  config: CleanerConfig,
}

impl Cleaner {
  pub fn new(config: CleanerConfig) -> Self { Self { config } }

  /// Run every step of the plan. Only an unusable timestamp format or
  /// failing to create the output directory is an error.
  pub fn run(&self) -> Result<CleanReport> {
    check_format(&self.config.timestamp_format)?;
    tracing::info!(
      from = %self.config.source_dir.display(),
      to = %self.config.output_dir.display(),
      "starting data cleaning"
    );
    fs::create_dir_all(&self.config.output_dir)?;

    let mut report = CleanReport::default();
    for step in plan() {
      let input = self.config.source_dir.join(&step.input);
      if !input.is_file() {
        tracing::warn!("'{}' not found; skipping", step.input);
        report.skipped.push((step.input, "not found".into()));
        continue;
      }

      let mut table = match read_raw(&input) {
        Ok(t) => t,
        Err(e) => {
          tracing::error!(error = %e, "could not process '{}'", step.input);
          report.skipped.push((step.input, e.to_string()));
          continue;
        }
      };

      if step.dedupe_ids {
        report
          .reassignments
          .extend(correct_duplicate_ids(&mut table, STUDENT_ID, 'S'));
        report
          .reassignments
          .extend(correct_duplicate_ids(&mut table, STAFF_ID, 'T'));
      }
      for column in &step.timestamp_columns {
        standardize_timestamps(&mut table, column, &self.config.timestamp_format);
      }

      let output = self.config.output_dir.join(&step.output);
      match write_raw(&output, &table) {
        Ok(()) => {
          tracing::info!("saved cleaned file to '{}'", output.display());
          report.written.push(output);
        }
        Err(e) => {
          tracing::error!(error = %e, "could not write '{}'", output.display());
          report.skipped.push((step.input, e.to_string()));
        }
      }
    }

    tracing::info!(
      written = report.written.len(),
      skipped = report.skipped.len(),
      reassigned = report.reassignments.len(),
      "data cleaning finished"
    );
    Ok(report)
  }
}

// ─── Transformations ─────────────────────────────────────────────────────────

/// Rewrite `column` in `format`; unreadable values become empty. A missing
/// column is left alone.
pub(crate) fn standardize_timestamps(table: &mut RawTable, column: &str, format: &str) {
  let Some(idx) = table.column(column) else {
    return;
  };
  for row in &mut table.rows {
    let cell = &mut row[idx];
    *cell = EventTime::from_cell(cell.as_deref()).format(format);
  }
}

/// Give every repeated value of `column` after its first occurrence a fresh
/// `<prefix><n>` identifier, with `n` continuing past the largest existing
/// numeric suffix.
pub(crate) fn correct_duplicate_ids(
  table: &mut RawTable,
  column: &'static str,
  prefix: char,
) -> Vec<IdReassignment> {
  let Some(idx) = table.column(column) else {
    return Vec::new();
  };
  let entity_idx = table.column(ENTITY_ID);

  // Row indices per value, values in first-appearance order.
  let mut order: Vec<String> = Vec::new();
  let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
  for (row_idx, row) in table.rows.iter().enumerate() {
    if let Some(v) = &row[idx] {
      let slot = positions.entry(v.clone()).or_default();
      if slot.is_empty() {
        order.push(v.clone());
      }
      slot.push(row_idx);
    }
  }
  let duplicated: Vec<&String> =
    order.iter().filter(|v| positions[*v].len() > 1).collect();
  if duplicated.is_empty() {
    tracing::debug!("no duplicates in '{column}'");
    return Vec::new();
  }

  // `None` once the counter has run past `u64::MAX`.
  let mut next = match positions
    .keys()
    .filter_map(|v| numeric_suffix(v, prefix))
    .max()
  {
    Some(max) => max.checked_add(1),
    None => Some(1),
  };
  let mut taken: HashSet<String> = positions.keys().cloned().collect();

  let mut out = Vec::new();
  for value in duplicated {
    for &row_idx in &positions[value][1..] {
      let Some(fresh) = fresh_id(prefix, &mut next, &taken) else {
        tracing::warn!(
          column,
          "no '{prefix}' identifiers left; leaving duplicate '{value}' in place"
        );
        continue;
      };
      taken.insert(fresh.clone());

      let row = &mut table.rows[row_idx];
      let entity_id = entity_idx.and_then(|i| row[i].clone());
      tracing::info!(
        column,
        entity_id = entity_id.as_deref().unwrap_or("?"),
        "changed '{value}' to '{fresh}'"
      );
      row[idx] = Some(fresh.clone());
      out.push(IdReassignment {
        column,
        entity_id,
        old: value.clone(),
        new: fresh,
      });
    }
  }
  out
}

/// The next `<prefix><n>` not in `taken`, advancing `next` past it.
fn fresh_id(prefix: char, next: &mut Option<u64>, taken: &HashSet<String>) -> Option<String> {
  loop {
    let n = (*next)?;
    *next = n.checked_add(1);
    let candidate = format!("{prefix}{n}");
    if !taken.contains(&candidate) {
      return Some(candidate);
    }
  }
}

/// `S12` → `Some(12)` for prefix `S`.
fn numeric_suffix(value: &str, prefix: char) -> Option<u64> {
  let rest = value.strip_prefix(prefix)?;
  let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
  digits.parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable {
      headers: headers.iter().map(|h| h.to_string()).collect(),
      rows:    rows
        .iter()
        .map(|r| {
          r.iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect()
        })
        .collect(),
    }
  }

  fn column<'a>(t: &'a RawTable, name: &str) -> Vec<Option<&'a str>> {
    let idx = t.column(name).unwrap();
    t.rows.iter().map(|r| r[idx].as_deref()).collect()
  }

  #[test]
  fn second_duplicate_gets_a_fresh_id_with_the_same_prefix() {
    let mut t = raw(&["entity_id", "student_id"], &[
      &["E1", "S10"],
      &["E2", "S10"],
      &["E3", "S4"],
      &["E4", ""],
    ]);
    let changes = correct_duplicate_ids(&mut t, STUDENT_ID, 'S');
    assert_eq!(column(&t, "student_id"), vec![
      Some("S10"),
      Some("S11"),
      Some("S4"),
      None
    ]);
    assert_eq!(changes, vec![IdReassignment {
      column:    STUDENT_ID,
      entity_id: Some("E2".into()),
      old:       "S10".into(),
      new:       "S11".into(),
    }]);
  }

  #[test]
  fn every_later_occurrence_is_renumbered_in_order() {
    let mut t = raw(&["staff_id"], &[&["T2"], &["T1"], &["T2"], &["T1"], &["T2"]]);
    correct_duplicate_ids(&mut t, STAFF_ID, 'T');
    assert_eq!(column(&t, "staff_id"), vec![
      Some("T2"),
      Some("T1"),
      Some("T3"),
      Some("T5"),
      Some("T4"),
    ]);
  }

  #[test]
  fn counter_starts_at_one_without_numeric_ids() {
    let mut t = raw(&["student_id"], &[&["abc"], &["abc"]]);
    correct_duplicate_ids(&mut t, STUDENT_ID, 'S');
    assert_eq!(column(&t, "student_id"), vec![Some("abc"), Some("S1")]);
  }

  #[test]
  fn exhausted_counter_leaves_duplicates_in_place() {
    let max = format!("S{}", u64::MAX);
    let max = max.as_str();
    let mut t = raw(&["student_id"], &[&[max], &[max], &["S3"]]);
    assert!(correct_duplicate_ids(&mut t, STUDENT_ID, 'S').is_empty());
    assert_eq!(column(&t, "student_id"), vec![
      Some(max),
      Some(max),
      Some("S3"),
    ]);

    let near = format!("T{}", u64::MAX - 1);
    let near = near.as_str();
    let mut t = raw(&["staff_id"], &[&[near], &[near], &[near]]);
    let changes = correct_duplicate_ids(&mut t, STAFF_ID, 'T');
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].new, format!("T{}", u64::MAX));
    assert_eq!(column(&t, "staff_id")[2], Some(near));
  }

  #[test]
  fn unique_or_missing_columns_are_untouched() {
    let mut t = raw(&["student_id"], &[&["S1"], &["S2"]]);
    assert!(correct_duplicate_ids(&mut t, STUDENT_ID, 'S').is_empty());
    assert!(correct_duplicate_ids(&mut t, STAFF_ID, 'T').is_empty());
    assert_eq!(column(&t, "student_id"), vec![Some("S1"), Some("S2")]);
  }

  #[test]
  fn timestamps_are_normalized_and_garbage_is_blanked() {
    let mut t = raw(&["timestamp"], &[
      &["2024-01-01T09:00:00"],
      &["01/02/2024 13:30"],
      &["whenever"],
      &[""],
    ]);
    standardize_timestamps(&mut t, "timestamp", CANONICAL_FORMAT);
    assert_eq!(column(&t, "timestamp"), vec![
      Some("2024-01-01 09:00:00"),
      Some("2024-01-02 13:30:00"),
      None,
      None,
    ]);
  }
}
