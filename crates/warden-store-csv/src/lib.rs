//! Flat-file backend for Warden.
//!
//! Loads a directory of cleaned CSV exports into memory once, validates it
//! against the log source registry, and serves it through
//! [`warden_core::store::ActivityStore`]. The [`clean`] module holds the
//! one-shot ETL step that produces that directory from raw exports.

pub mod clean;
mod csv_io;
pub mod error;
mod store;

pub use clean::{CleanReport, Cleaner, CleanerConfig, IdReassignment};
pub use error::{Error, Result};
pub use store::{CsvStore, PROFILES_FILE, SourceWarning, WarningKind};

#[cfg(test)]
mod tests;
