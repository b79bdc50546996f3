//! Error types for `warden-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown log source: {0:?}")]
  UnknownSource(String),

  #[error("invalid timestamp format: {0:?}")]
  InvalidTimeFormat(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
