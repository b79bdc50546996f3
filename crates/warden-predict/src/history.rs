//! Location histories: who was where, and when.
//!
//! Card swipes and Wi-Fi associations carry only secondary identifiers, so
//! each row is joined back to an `entity_id` through the profiles before it
//! can become training data.

use std::collections::HashMap;

use warden_core::{
  location::LOCATING_SOURCES,
  profile::Profile,
  store::ActivityStore,
  table::join_key,
  time::EventTime,
};

use crate::encoder::LabelEncoder;

/// One location observation attributed to an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
  pub entity_id: String,
  pub location:  String,
  pub time:      EventTime,
}

/// Encoded `(entity, location) → next location` examples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
  pub features: Vec<[usize; 2]>,
  pub targets:  Vec<usize>,
}

impl Transitions {
  pub fn len(&self) -> usize { self.targets.len() }

  pub fn is_empty(&self) -> bool { self.targets.is_empty() }
}

/// Whether `store` has every table the history needs.
pub fn has_required_data<S: ActivityStore + ?Sized>(store: &S) -> bool {
  !store.profiles().is_empty()
    && LOCATING_SOURCES
      .iter()
      .all(|(source, _)| store.log_table(*source).is_some())
}

/// Every attributable observation, in registry then row order. Rows whose
/// identifier is unknown or whose location is empty are dropped.
pub fn observations<S: ActivityStore + ?Sized>(store: &S) -> Vec<Observation> {
  let mut out = Vec::new();
  for &(source, location_field) in LOCATING_SOURCES {
    let desc = source.descriptor();
    let owners = owner_index(store.profiles(), desc.join_key);
    let Some(table) = store.log_table(source) else {
      continue;
    };
    for row in table.rows() {
      let entity = row
        .get(desc.join_key)
        .and_then(|key| owners.get(&join_key(key)));
      let (Some(entity_id), Some(location)) = (entity, row.get(location_field)) else {
        continue;
      };
      out.push(Observation {
        entity_id: entity_id.clone(),
        location:  location.to_string(),
        time:      EventTime::from_cell(row.get(desc.timestamp_field)),
      });
    }
  }
  tracing::debug!(count = out.len(), "collected location observations");
  out
}

/// `normalized secondary id → entity_id` for the profiles carrying `field`.
fn owner_index(profiles: &[Profile], field: &str) -> HashMap<String, String> {
  profiles
    .iter()
    .filter_map(|p| Some((join_key(p.get(field)?), p.entity_id()?.to_string())))
    .collect()
}

/// Fit both encoders and derive consecutive-location examples per entity.
pub fn transitions(
  observations: &[Observation],
) -> (LabelEncoder, LabelEncoder, Transitions) {
  let entities = LabelEncoder::fit(observations.iter().map(|o| &o.entity_id));
  let locations = LabelEncoder::fit(observations.iter().map(|o| &o.location));

  let mut per_entity: Vec<Vec<&Observation>> = vec![Vec::new(); entities.len()];
  for obs in observations {
    if let Some(e) = entities.transform(&obs.entity_id) {
      per_entity[e].push(obs);
    }
  }

  let mut out = Transitions::default();
  for (entity_idx, mut seen) in per_entity.into_iter().enumerate() {
    seen.sort_by_key(|o| o.time);
    for pair in seen.windows(2) {
      let (Some(from), Some(to)) = (
        locations.transform(&pair[0].location),
        locations.transform(&pair[1].location),
      ) else {
        continue;
      };
      out.features.push([entity_idx, from]);
      out.targets.push(to);
    }
  }
  (entities, locations, out)
}
