//! The `ActivityStore` trait.
//!
//! Implemented by storage backends (e.g. `warden-store-csv`). The resolver,
//! the timeline assembler and the predictor depend on this abstraction, not on
//! any concrete backend.

use crate::{profile::Profile, source::LogSource, table::Table};

/// Read-only access to the loaded profile and log tables.
///
/// Tables are loaded once and not mutated while borrowed; a backend that
/// supports reloading does so through `&mut self` on its own type.
pub trait ActivityStore {
  /// All profiles, in file order.
  fn profiles(&self) -> &[Profile];

  /// The backing table for `source`, or `None` when it was not loaded.
  fn log_table(&self, source: LogSource) -> Option<&Table>;
}
