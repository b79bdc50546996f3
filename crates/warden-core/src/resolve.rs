//! Entity resolution: from a human query to candidate profiles.

use std::collections::BTreeSet;

use crate::{
  profile::{ENTITY_ID, NAME, Profile, SEARCH_FIELDS, SUGGESTION_FIELDS},
  store::ActivityStore,
  table::join_key,
};

/// Find profiles matching `term`.
///
/// `name` matches on a case-insensitive substring; every other identifier
/// field must equal the term case-insensitively. A profile matches if any
/// field does. Results keep table order. An empty term matches nothing.
pub fn search<S: ActivityStore + ?Sized>(store: &S, term: &str) -> Vec<Profile> {
  let needle = term.trim().to_lowercase();
  if needle.is_empty() {
    return Vec::new();
  }
  store
    .profiles()
    .iter()
    .filter(|p| matches_term(p, &needle))
    .cloned()
    .collect()
}

fn matches_term(profile: &Profile, needle: &str) -> bool {
  SEARCH_FIELDS.iter().any(|&field| {
    let Some(value) = profile.get(field) else {
      return false;
    };
    let value = value.to_lowercase();
    if field == NAME {
      value.contains(needle)
    } else {
      value == needle
    }
  })
}

/// Exact lookup of the profile carrying `entity_id`.
pub fn find_by_entity_id<S: ActivityStore + ?Sized>(
  store: &S,
  entity_id: &str,
) -> Option<Profile> {
  let wanted = join_key(entity_id);
  store
    .profiles()
    .iter()
    .find(|p| p.get(ENTITY_ID).is_some_and(|v| join_key(v) == wanted))
    .cloned()
}

/// Sorted, de-duplicated identifier values for type-ahead.
pub fn identifier_suggestions<S: ActivityStore + ?Sized>(store: &S) -> Vec<String> {
  let mut seen = BTreeSet::new();
  for profile in store.profiles() {
    for &field in SUGGESTION_FIELDS {
      if let Some(v) = profile.get(field) {
        seen.insert(v.to_string());
      }
    }
  }
  seen.into_iter().collect()
}
