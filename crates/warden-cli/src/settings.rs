//! Layered settings: optional TOML file, then `WARDEN_*` environment
//! (`WARDEN_PREDICTOR__SEED=7` sets `predictor.seed`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use warden_core::time::{CANONICAL_FORMAT, check_format};
use warden_predict::ForestParams;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Cleaned CSV exports the store loads.
  pub data_dir:          PathBuf,
  /// Raw exports the cleaner reads.
  pub raw_dir:           PathBuf,
  pub model_dir:         PathBuf,
  pub face_image_dir:    PathBuf,
  pub timestamp_format:  String,
  /// A last sighting older than this, relative to the newest log entry, is
  /// flagged stale.
  pub stale_after_hours: i64,
  /// Where logs go while the terminal UI owns the screen.
  pub log_file:          Option<PathBuf>,
  pub predictor:         ForestParams,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir:          PathBuf::from("clean_data"),
      raw_dir:           PathBuf::from("data"),
      model_dir:         PathBuf::from("models"),
      face_image_dir:    PathBuf::from("data/face_images"),
      timestamp_format:  CANONICAL_FORMAT.to_string(),
      stale_after_hours: 24,
      log_file:          None,
      predictor:         ForestParams::default(),
    }
  }
}

impl Settings {
  /// Read `path` (if it exists) and the environment, then expand `~/` in
  /// every path.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("WARDEN")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.validate()?;
    Ok(settings.expanded())
  }

  fn validate(&self) -> anyhow::Result<()> {
    check_format(&self.timestamp_format).context("bad `timestamp_format`")?;
    anyhow::ensure!(
      self.stale_after_hours >= 0,
      "`stale_after_hours` must not be negative, got {}",
      self.stale_after_hours
    );
    chrono::Duration::try_hours(self.stale_after_hours).with_context(|| {
      format!("`stale_after_hours` is out of range: {}", self.stale_after_hours)
    })?;
    Ok(())
  }

  fn expanded(mut self) -> Self {
    self.data_dir = expand_tilde(&self.data_dir);
    self.raw_dir = expand_tilde(&self.raw_dir);
    self.model_dir = expand_tilde(&self.model_dir);
    self.face_image_dir = expand_tilde(&self.face_image_dir);
    self.log_file = self.log_file.as_deref().map(expand_tilde);
    self
  }

  /// Saturates for values [`Settings::load`] would have rejected.
  pub fn stale_after(&self) -> chrono::Duration {
    chrono::Duration::try_hours(self.stale_after_hours)
      .unwrap_or(chrono::Duration::MAX)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let s = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(s.data_dir, PathBuf::from("clean_data"));
    assert_eq!(s.face_image_dir, PathBuf::from("data/face_images"));
    assert_eq!(s.stale_after_hours, 24);
    assert_eq!(s.predictor, ForestParams::default());
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warden.toml");
    std::fs::write(
      &path,
      "data_dir = \"/srv/clean\"\nstale_after_hours = 6\n\n[predictor]\nn_estimators = 5\n",
    )
    .unwrap();

    let s = Settings::load(&path).unwrap();
    assert_eq!(s.data_dir, PathBuf::from("/srv/clean"));
    assert_eq!(s.stale_after_hours, 6);
    assert_eq!(s.predictor.n_estimators, 5);
    assert_eq!(s.predictor.seed, 42);
    assert_eq!(s.raw_dir, PathBuf::from("data"));
  }

  fn load_str(toml: &str) -> anyhow::Result<Settings> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warden.toml");
    std::fs::write(&path, toml).unwrap();
    Settings::load(&path)
  }

  #[test]
  fn out_of_range_stale_hours_are_rejected() {
    let err = load_str("stale_after_hours = 9000000000000000\n").unwrap_err();
    assert!(format!("{err:#}").contains("out of range"));
    let err = load_str("stale_after_hours = -1\n").unwrap_err();
    assert!(format!("{err:#}").contains("must not be negative"));

    let s = Settings { stale_after_hours: i64::MAX, ..Settings::default() };
    assert_eq!(s.stale_after(), chrono::Duration::MAX);
    assert_eq!(Settings::default().stale_after(), chrono::Duration::hours(24));
  }

  #[test]
  fn unusable_timestamp_format_is_rejected() {
    let err = load_str("timestamp_format = \"%Y-%m-%d %Q\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("timestamp_format"));
    assert!(load_str("timestamp_format = \"%d/%m/%Y %H:%M\"\n").is_ok());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/models")),
      PathBuf::from(home).join("models")
    );
    assert_eq!(expand_tilde(Path::new("models")), PathBuf::from("models"));
  }
}
