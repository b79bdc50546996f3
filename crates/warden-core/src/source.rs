//! The log source registry.
//!
//! Every activity log is described by a static [`SourceDescriptor`]: which
//! file backs it, which identifier joins it to a profile, which column holds
//! the timestamp and which columns describe the event. The set of sources is
//! closed; adding one means adding a variant here.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  profile::{CARD_ID, DEVICE_HASH, ENTITY_ID, FACE_ID},
};

/// Lab-booking column whose label is rendered as plain `Attended`.
pub const ATTENDED_FIELD: &str = "attended (YES/NO)";

// ─── LogSource ───────────────────────────────────────────────────────────────

/// A registered activity log. Declaration order is registry order, which is
/// also the tie-break order for events sharing a timestamp.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogSource {
  CardSwipes,
  WifiAssociations,
  CameraFrames,
  LabBookings,
  LibraryCheckouts,
  FreeTextNotes,
}

/// Static description of one log source.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceDescriptor {
  pub source:             LogSource,
  pub file_name:          &'static str,
  /// Names both the profile field and the log column used for the join.
  pub join_key:           &'static str,
  pub timestamp_field:    &'static str,
  pub descriptive_fields: &'static [&'static str],
  pub label:              &'static str,
}

const CARD_SWIPES: SourceDescriptor = SourceDescriptor {
  source:             LogSource::CardSwipes,
  file_name:          "campus card_swipes.csv",
  join_key:           CARD_ID,
  timestamp_field:    "timestamp",
  descriptive_fields: &["location_id"],
  label:              "Card Swipe",
};

const WIFI_ASSOCIATIONS: SourceDescriptor = SourceDescriptor {
  source:             LogSource::WifiAssociations,
  file_name:          "wifi_associations_logs.csv",
  join_key:           DEVICE_HASH,
  timestamp_field:    "timestamp",
  descriptive_fields: &["ap_id"],
  label:              "WiFi Connection",
};

const CAMERA_FRAMES: SourceDescriptor = SourceDescriptor {
  source:             LogSource::CameraFrames,
  file_name:          "cctv_frames.csv",
  join_key:           FACE_ID,
  timestamp_field:    "timestamp",
  descriptive_fields: &["location_id"],
  label:              "Camera/Facial Rec",
};

const LAB_BOOKINGS: SourceDescriptor = SourceDescriptor {
  source:             LogSource::LabBookings,
  file_name:          "lab_bookings.csv",
  join_key:           ENTITY_ID,
  timestamp_field:    "start_time",
  descriptive_fields: &["room_id", "end_time", ATTENDED_FIELD],
  label:              "Lab Booking",
};

const LIBRARY_CHECKOUTS: SourceDescriptor = SourceDescriptor {
  source:             LogSource::LibraryCheckouts,
  file_name:          "library_checkouts.csv",
  join_key:           ENTITY_ID,
  timestamp_field:    "timestamp",
  descriptive_fields: &["book_id"],
  label:              "Library Checkout",
};

const FREE_TEXT_NOTES: SourceDescriptor = SourceDescriptor {
  source:             LogSource::FreeTextNotes,
  file_name:          "free_text_notes (helpdesk or RSVPs).csv",
  join_key:           ENTITY_ID,
  timestamp_field:    "timestamp",
  descriptive_fields: &["category", "text"],
  label:              "Free Text Note",
};

impl LogSource {
  pub const ALL: [LogSource; 6] = [
    LogSource::CardSwipes,
    LogSource::WifiAssociations,
    LogSource::CameraFrames,
    LogSource::LabBookings,
    LogSource::LibraryCheckouts,
    LogSource::FreeTextNotes,
  ];

  pub fn descriptor(self) -> &'static SourceDescriptor {
    match self {
      Self::CardSwipes => &CARD_SWIPES,
      Self::WifiAssociations => &WIFI_ASSOCIATIONS,
      Self::CameraFrames => &CAMERA_FRAMES,
      Self::LabBookings => &LAB_BOOKINGS,
      Self::LibraryCheckouts => &LIBRARY_CHECKOUTS,
      Self::FreeTextNotes => &FREE_TEXT_NOTES,
    }
  }

  /// Short name accepted on the command line.
  pub fn slug(self) -> &'static str {
    match self {
      Self::CardSwipes => "card_swipes",
      Self::WifiAssociations => "wifi",
      Self::CameraFrames => "camera",
      Self::LabBookings => "lab_bookings",
      Self::LibraryCheckouts => "library",
      Self::FreeTextNotes => "notes",
    }
  }

  pub fn label(self) -> &'static str { self.descriptor().label }

  pub fn file_name(self) -> &'static str { self.descriptor().file_name }
}

impl fmt::Display for LogSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for LogSource {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|src| src.slug().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownSource(s.to_string()))
  }
}

// ─── Field labels ────────────────────────────────────────────────────────────

/// Human label for a descriptive column: `location_id` → `Location Id`.
pub fn field_label(field: &str) -> String {
  if field == ATTENDED_FIELD {
    return "Attended".to_string();
  }
  let spaced = field.replace('_', " ");
  let mut out = String::with_capacity(spaced.len());
  let mut prev_is_letter = false;
  for c in spaced.trim().chars() {
    if c.is_alphabetic() {
      if prev_is_letter {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      prev_is_letter = true;
    } else {
      out.push(c);
      prev_is_letter = false;
    }
  }
  out
}
