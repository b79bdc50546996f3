//! Last known location of a profile.
//!
//! Only the sources that report a place (card swipes and Wi-Fi access points)
//! are consulted. Staleness is judged against the dataset horizon, the newest
//! readable timestamp in any loaded log, so the answer does not depend on the
//! wall clock.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::{
  profile::Profile,
  source::LogSource,
  store::ActivityStore,
  time::EventTime,
};

/// Sources that locate a subject, with the column holding the place.
pub const LOCATING_SOURCES: &[(LogSource, &str)] = &[
  (LogSource::CardSwipes, "location_id"),
  (LogSource::WifiAssociations, "ap_id"),
];

// ─── Types ───────────────────────────────────────────────────────────────────

/// One place a subject was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sighting {
  pub location:      String,
  pub raw_timestamp: Option<String>,
  #[serde(skip)]
  pub time:          EventTime,
  pub source:        LogSource,
}

/// The most recent sighting plus whether it is older than the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastSighting {
  pub sighting: Sighting,
  pub stale:    bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationLookup {
  Found(LastSighting),
  NoHistory,
}

impl LocationLookup {
  pub fn location(&self) -> Option<&str> {
    match self {
      Self::Found(last) => Some(&last.sighting.location),
      Self::NoHistory => None,
    }
  }
}

/// Human justification shown next to a prediction.
impl fmt::Display for LocationLookup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NoHistory => {
        f.write_str("No location history found to make a prediction.")
      }
      Self::Found(last) => {
        write!(
          f,
          "Last known location was '{}' at {}.",
          last.sighting.location,
          last.sighting.raw_timestamp.as_deref().unwrap_or("an unknown time")
        )?;
        if last.stale {
          f.write_str(" (stale)")?;
        }
        Ok(())
      }
    }
  }
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Every location observation for `profile`, in registry then row order.
pub fn sightings<S: ActivityStore + ?Sized>(store: &S, profile: &Profile) -> Vec<Sighting> {
  let mut out = Vec::new();
  for &(source, location_field) in LOCATING_SOURCES {
    let desc = source.descriptor();
    let (Some(key), Some(table)) = (profile.get(desc.join_key), store.log_table(source))
    else {
      continue;
    };
    for row in table.rows_matching(desc.join_key, key) {
      let Some(location) = row.get(location_field) else {
        continue;
      };
      let raw = row.get(desc.timestamp_field);
      out.push(Sighting {
        location:      location.to_string(),
        raw_timestamp: raw.map(str::to_string),
        time:          EventTime::from_cell(raw),
        source,
      });
    }
  }
  out
}

/// Where `profile` was most recently seen.
///
/// The newest readable sighting wins; a later-collected sighting wins a tie.
/// When no sighting has a readable time the last one collected is used.
pub fn last_known_location<S: ActivityStore + ?Sized>(
  store: &S,
  profile: &Profile,
  stale_after: Duration,
) -> LocationLookup {
  let all = sightings(store, profile);
  let latest = all
    .iter()
    .filter(|s| s.time.instant().is_some())
    .max_by_key(|s| s.time)
    .or_else(|| all.last());

  let Some(sighting) = latest.cloned() else {
    return LocationLookup::NoHistory;
  };

  let stale = match (sighting.time.instant(), horizon(store)) {
    (Some(seen), Some(newest)) => newest - seen > stale_after,
    (Some(_), None) => false,
    (None, _) => true,
  };
  LocationLookup::Found(LastSighting { sighting, stale })
}

/// The newest readable timestamp across every loaded log table.
pub fn horizon<S: ActivityStore + ?Sized>(store: &S) -> Option<NaiveDateTime> {
  LogSource::ALL
    .into_iter()
    .filter_map(|source| {
      let field = source.descriptor().timestamp_field;
      store.log_table(source).map(|t| (t, field))
    })
    .flat_map(|(table, field)| {
      table
        .rows()
        .filter_map(move |row| EventTime::from_cell(row.get(field)).instant())
    })
    .max()
}
