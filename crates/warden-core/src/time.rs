//! Tolerant timestamp parsing.
//!
//! Exports from the various campus systems do not agree on a timestamp
//! format. [`EventTime::parse`] never fails: anything it cannot read becomes
//! [`EventTime::Unparsed`], which orders after every real instant.

use std::{cmp::Ordering, fmt::Write as _};

use chrono::{
  DateTime, NaiveDate, NaiveDateTime,
  format::{Item, StrftimeItems},
};

use crate::{Error, Result};

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M",
  "%m/%d/%Y %H:%M:%S",
  "%m/%d/%Y %H:%M",
];

/// Date-only layouts; these resolve to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// The canonical layout written by the cleaner.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── EventTime ───────────────────────────────────────────────────────────────

/// A best-effort parsed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
  At(NaiveDateTime),
  /// Missing or unreadable; sorts last and compares equal to other
  /// unparsed values so a stable sort keeps their relative order.
  Unparsed,
}

impl EventTime {
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();
    if raw.is_empty() {
      return Self::Unparsed;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
      return Self::At(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
      if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
        return Self::At(dt);
      }
    }
    for fmt in DATE_FORMATS {
      if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
        return d.and_hms_opt(0, 0, 0).map_or(Self::Unparsed, Self::At);
      }
    }
    Self::Unparsed
  }

  /// Parse an optional cell; an absent cell is unparsed.
  pub fn from_cell(cell: Option<&str>) -> Self {
    cell.map_or(Self::Unparsed, Self::parse)
  }

  pub fn instant(&self) -> Option<NaiveDateTime> {
    match self {
      Self::At(dt) => Some(*dt),
      Self::Unparsed => None,
    }
  }

  /// Re-render with `format`, or `None` when unparsed or when `format`
  /// cannot render this instant.
  pub fn format(&self, format: &str) -> Option<String> {
    let dt = self.instant()?;
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).ok()?;
    Some(out)
  }
}

/// Reject a `strftime` layout chrono cannot interpret.
pub fn check_format(format: &str) -> Result<()> {
  if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
    return Err(Error::InvalidTimeFormat(format.to_string()));
  }
  Ok(())
}

impl Ord for EventTime {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::At(a), Self::At(b)) => a.cmp(b),
      (Self::At(_), Self::Unparsed) => Ordering::Less,
      (Self::Unparsed, Self::At(_)) => Ordering::Greater,
      (Self::Unparsed, Self::Unparsed) => Ordering::Equal,
    }
  }
}

impl PartialOrd for EventTime {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
