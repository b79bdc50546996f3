//! Error type for `warden-store-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] warden_core::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("data directory not found: {}", .0.display())]
  DataDirMissing(PathBuf),

  /// The profiles table is the one input the store cannot run without.
  #[error("profile data unavailable at {}: {reason}", .path.display())]
  ProfilesUnavailable { path: PathBuf, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
