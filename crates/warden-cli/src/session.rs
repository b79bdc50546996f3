//! The loaded dataset and predictor, shared by every command and the TUI.

use std::{fmt, path::PathBuf};

use anyhow::Context as _;
use warden_core::{
  location::{self, LocationLookup},
  profile::Profile,
  resolve,
  timeline::{self, Timeline},
};
use warden_predict::{LocationPredictor, Prediction, TrainOutcome};
use warden_store_csv::{CleanReport, Cleaner, CleanerConfig, CsvStore};

use crate::settings::Settings;

/// No profile carries the requested `entity_id`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error: Could not find profile details for ID {0}.")]
pub struct UnknownEntity(pub String);

// ─── Answers ──────────────────────────────────────────────────────────────────

/// Result of a free-text profile search.
#[derive(Debug, Clone)]
pub enum Search {
  EmptyTerm,
  NoMatches(String),
  Matches(Vec<Profile>),
}

impl Search {
  pub fn matches(&self) -> &[Profile] {
    match self {
      Self::Matches(found) => found,
      _ => &[],
    }
  }
}

impl fmt::Display for Search {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EmptyTerm => {
        f.write_str("Please enter a search term (Name, ID, Email, etc.).")
      }
      Self::NoMatches(term) => write!(f, "No profile matches found for '{term}'."),
      Self::Matches(found) => {
        for (i, p) in found.iter().enumerate() {
          if i > 0 {
            writeln!(f)?;
          }
          write!(f, "{}", p.summary())?;
        }
        Ok(())
      }
    }
  }
}

/// Last sighting plus the model's guess at what comes next.
#[derive(Debug, Clone)]
pub struct PredictionReport {
  pub last:       LocationLookup,
  /// `None` when there is no current location to predict from.
  pub prediction: Option<Prediction>,
}

impl fmt::Display for PredictionReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Justification: {}", self.last)?;
    if let Some(prediction) = &self.prediction {
      write!(f, "\n\nRESULT: {prediction}")?;
    }
    Ok(())
  }
}

/// Where the face image for a profile is expected to live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceImage {
  pub name:   String,
  /// `None` when the profile has no `face_id`.
  pub path:   Option<PathBuf>,
  pub exists: bool,
}

impl fmt::Display for FaceImage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.path {
      None => write!(f, "Facial Profile for: {}\n\nNo face ID on record.", self.name),
      Some(path) if self.exists => {
        write!(f, "Facial Profile: {}\nImage: {}", self.name, path.display())
      }
      Some(path) => write!(
        f,
        "Facial Profile for: {}\n\nERROR: Image not found.\nExpected file: {}",
        self.name,
        path.display()
      ),
    }
  }
}

// ─── Session ──────────────────────────────────────────────────────────────────

pub struct Session {
  settings:  Settings,
  store:     CsvStore,
  predictor: LocationPredictor,
}

impl Session {
  /// Load the cleaned data (cleaning raw exports first if there is none
  /// yet), then load the persisted model or train one.
  pub fn open(settings: Settings) -> anyhow::Result<Self> {
    if !settings.data_dir.exists() && settings.raw_dir.is_dir() {
      tracing::info!(
        raw = %settings.raw_dir.display(),
        "no cleaned data found; running cleaner"
      );
      clean(&settings)?;
    }

    let store = CsvStore::open(&settings.data_dir).with_context(|| {
      format!("failed to open data directory {}", settings.data_dir.display())
    })?;

    let mut predictor =
      LocationPredictor::new(&settings.model_dir, settings.predictor);
    match predictor.load() {
      Ok(true) => {}
      Ok(false) => train_logged(&mut predictor, &store),
      Err(e) => {
        tracing::warn!(error = %e, "persisted model unreadable; retraining");
        train_logged(&mut predictor, &store);
      }
    }

    Ok(Self { settings, store, predictor })
  }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub fn store(&self) -> &CsvStore { &self.store }

  pub fn predictor_ready(&self) -> bool { self.predictor.is_trained() }

  pub fn search(&self, term: &str) -> Search {
    let term = term.trim();
    if term.is_empty() {
      return Search::EmptyTerm;
    }
    let found = resolve::search(&self.store, term);
    if found.is_empty() {
      Search::NoMatches(term.to_string())
    } else {
      Search::Matches(found)
    }
  }

  pub fn suggestions(&self) -> Vec<String> {
    resolve::identifier_suggestions(&self.store)
  }

  pub fn profile(&self, entity_id: &str) -> Result<Profile, UnknownEntity> {
    resolve::find_by_entity_id(&self.store, entity_id)
      .ok_or_else(|| UnknownEntity(entity_id.to_string()))
  }

  pub fn timeline(&self, entity_id: &str) -> Result<Timeline, UnknownEntity> {
    let profile = self.profile(entity_id)?;
    Ok(timeline::assemble(&self.store, &profile))
  }

  pub fn predict_for(
    &self,
    entity_id: &str,
  ) -> Result<PredictionReport, UnknownEntity> {
    let profile = self.profile(entity_id)?;
    let last = location::last_known_location(
      &self.store,
      &profile,
      self.settings.stale_after(),
    );
    let id = profile.entity_id().unwrap_or(entity_id);
    let prediction = last
      .location()
      .map(|current| self.predictor.predict(id, Some(current)));
    Ok(PredictionReport { last, prediction })
  }

  pub fn face_image(&self, entity_id: &str) -> Result<FaceImage, UnknownEntity> {
    let profile = self.profile(entity_id)?;
    let path = profile
      .face_id()
      .map(|face| self.settings.face_image_dir.join(format!("{face}.jpg")));
    let exists = path.as_deref().is_some_and(|p| p.is_file());
    Ok(FaceImage {
      name: profile.name().unwrap_or("N/A").to_string(),
      path,
      exists,
    })
  }

  /// Re-read the data directory. The model is left as is.
  pub fn reload(&mut self) -> anyhow::Result<()> {
    self.store.reload().context("failed to reload data directory")
  }

  pub fn retrain(&mut self) -> anyhow::Result<TrainOutcome> {
    self
      .predictor
      .train(&self.store)
      .context("failed to train location predictor")
  }
}

/// Run the cleaner from `raw_dir` into `data_dir`.
pub fn clean(settings: &Settings) -> anyhow::Result<CleanReport> {
  let config = CleanerConfig {
    timestamp_format: settings.timestamp_format.clone(),
    ..CleanerConfig::new(&settings.raw_dir, &settings.data_dir)
  };
  Cleaner::new(config)
    .run()
    .context("failed to clean raw exports")
}

fn train_logged(predictor: &mut LocationPredictor, store: &CsvStore) {
  match predictor.train(store) {
    Ok(outcome) => tracing::info!(%outcome, "startup training finished"),
    Err(e) => tracing::error!(error = %e, "startup training failed"),
  }
}
