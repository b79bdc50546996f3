//! Profiles: one row of the cleaned profiles table.
//!
//! `entity_id` is the canonical identifier. The remaining identifier fields
//! (`card_id`, `device_hash`, `face_id`, ...) are secondary keys; each log
//! source is queried with whichever one its sensor observes.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::table::Row;

// ─── Field names ─────────────────────────────────────────────────────────────

pub const NAME: &str = "name";
pub const ENTITY_ID: &str = "entity_id";
pub const EMAIL: &str = "email";
pub const CARD_ID: &str = "card_id";
pub const DEVICE_HASH: &str = "device_hash";
pub const FACE_ID: &str = "face_id";
pub const STUDENT_ID: &str = "student_id";
pub const STAFF_ID: &str = "staff_id";
pub const ROLE: &str = "role";
pub const DEPARTMENT: &str = "department";

/// Fields consulted by [`crate::resolve::search`], in match order.
pub const SEARCH_FIELDS: &[&str] = &[
  NAME,
  ENTITY_ID,
  EMAIL,
  CARD_ID,
  DEVICE_HASH,
  FACE_ID,
  STUDENT_ID,
  STAFF_ID,
];

/// Fields offered as type-ahead suggestions in the shell.
pub const SUGGESTION_FIELDS: &[&str] =
  &[NAME, ENTITY_ID, EMAIL, CARD_ID, DEVICE_HASH];

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A person known to the campus systems. Only present values are stored, so
/// a staff member simply has no `student_id` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
  fields: BTreeMap<String, String>,
}

impl Profile {
  /// Build a profile from `(field, value)` pairs; `None` values are dropped.
  pub fn from_pairs<I>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (String, Option<String>)>,
  {
    let fields = pairs
      .into_iter()
      .filter_map(|(k, v)| v.map(|v| (k, v)))
      .collect();
    Self { fields }
  }

  pub fn from_row(row: &Row<'_>) -> Self {
    Self::from_pairs(
      row
        .cells()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string))),
    )
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.fields.get(field).map(String::as_str)
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn name(&self) -> Option<&str> { self.get(NAME) }

  pub fn entity_id(&self) -> Option<&str> { self.get(ENTITY_ID) }

  pub fn card_id(&self) -> Option<&str> { self.get(CARD_ID) }

  pub fn device_hash(&self) -> Option<&str> { self.get(DEVICE_HASH) }

  pub fn face_id(&self) -> Option<&str> { self.get(FACE_ID) }

  pub fn role(&self) -> Option<&str> { self.get(ROLE) }

  pub fn is_student(&self) -> bool {
    self.role().is_some_and(|r| r.eq_ignore_ascii_case("student"))
  }

  /// One-line description used in match lists.
  pub fn summary(&self) -> ProfileSummary<'_> { ProfileSummary(self) }
}

/// `Name: … | ID: … | Type: …[ | Dept: …]`
pub struct ProfileSummary<'a>(&'a Profile);

impl fmt::Display for ProfileSummary<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let p = self.0;
    write!(
      f,
      "Name: {} | ID: {} | Type: {}",
      p.name().unwrap_or("N/A"),
      p.entity_id().unwrap_or("N/A"),
      p.role().unwrap_or("N/A"),
    )?;
    if p.is_student() {
      write!(f, " | Dept: {}", p.get(DEPARTMENT).unwrap_or("N/A"))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::{profile, table};

  #[test]
  fn from_row_drops_empty_cells() {
    let t = table(&["entity_id", "name", "device_hash"], &[&["E1", "Bob", ""]]);
    let row = t.rows().next().unwrap();
    let p = Profile::from_row(&row);
    assert_eq!(p.entity_id(), Some("E1"));
    assert_eq!(p.name(), Some("Bob"));
    assert_eq!(p.device_hash(), None);
  }

  #[test]
  fn summary_adds_department_for_students_only() {
    let student = profile(&[
      ("name", "Alice Smith"),
      ("entity_id", "E1"),
      ("role", "Student"),
      ("department", "Physics"),
    ]);
    assert_eq!(
      student.summary().to_string(),
      "Name: Alice Smith | ID: E1 | Type: Student | Dept: Physics"
    );

    let staff = profile(&[("name", "Bob"), ("role", "staff"), ("department", "IT")]);
    assert_eq!(staff.summary().to_string(), "Name: Bob | ID: N/A | Type: staff");
  }

  #[test]
  fn serializes_as_a_flat_object() {
    let p = profile(&[("entity_id", "E1"), ("name", "Alice")]);
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json, serde_json::json!({ "entity_id": "E1", "name": "Alice" }));
  }
}
