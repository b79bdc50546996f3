//! Core types and correlation logic for Warden.
//!
//! This crate is deliberately free of file-system and terminal dependencies.
//! Tables arrive through the [`store::ActivityStore`] trait; everything here
//! is a pure read over them.

pub mod error;
pub mod location;
pub mod profile;
pub mod resolve;
pub mod source;
pub mod store;
pub mod table;
pub mod time;
pub mod timeline;

pub use error::{Error, Result};

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use std::collections::BTreeMap;

  use crate::{
    profile::Profile,
    source::LogSource,
    store::ActivityStore,
    table::Table,
  };

  /// An [`ActivityStore`] assembled in memory for unit tests.
  #[derive(Default)]
  pub(crate) struct MemoryStore {
    pub(crate) profiles: Vec<Profile>,
    pub(crate) logs:     BTreeMap<LogSource, Table>,
  }

  impl MemoryStore {
    pub(crate) fn with_profiles(rows: &[&[(&str, &str)]]) -> Self {
      Self {
        profiles: rows.iter().map(|r| profile(r)).collect(),
        logs:     BTreeMap::new(),
      }
    }

    pub(crate) fn insert_log(
      &mut self,
      source: LogSource,
      headers: &[&str],
      rows: &[&[&str]],
    ) {
      self.logs.insert(source, table(headers, rows));
    }
  }

  impl ActivityStore for MemoryStore {
    fn profiles(&self) -> &[Profile] { &self.profiles }

    fn log_table(&self, source: LogSource) -> Option<&Table> {
      self.logs.get(&source)
    }
  }

  pub(crate) fn profile(fields: &[(&str, &str)]) -> Profile {
    Profile::from_pairs(
      fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), Some((*v).to_string()))),
    )
  }

  pub(crate) fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
    Table::new(
      headers.iter().map(|h| (*h).to_string()).collect(),
      rows
        .iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect(),
    )
  }
}
