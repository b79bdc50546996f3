//! Error type for `warden-predict`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("feature matrix error: {0}")]
  Shape(#[from] ndarray::ShapeError),

  #[error("training failed: {0}")]
  Training(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
