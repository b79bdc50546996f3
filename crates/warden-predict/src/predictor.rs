//! The trained predictor, its persistence and its answers.

use std::{
  fmt, fs,
  path::{Path, PathBuf},
};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use warden_core::store::ActivityStore;

use crate::{
  Result,
  encoder::LabelEncoder,
  forest::{Forest, ForestParams},
  history::{self, Transitions},
};

/// Serialized forest, relative to the model directory.
pub const MODEL_FILE: &str = "location_model.json";
/// Serialized entity and location encoders, relative to the model directory.
pub const ENCODERS_FILE: &str = "location_encoders.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Encoders {
  entities:  LabelEncoder,
  locations: LabelEncoder,
}

#[derive(Debug, Clone)]
struct Model {
  forest:   Forest,
  encoders: Encoders,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What a call to [`LocationPredictor::train`] achieved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainOutcome {
  /// A model was fitted and saved. `accuracy` is `None` when nothing was
  /// held out.
  Trained {
    accuracy: Option<f64>,
    samples:  usize,
  },
  /// Profiles, card swipes or Wi-Fi associations are not loaded.
  MissingData,
  /// No entity has two consecutive observations.
  NotEnoughData,
}

impl fmt::Display for TrainOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Trained { accuracy: Some(a), samples } => {
        write!(f, "trained on {samples} transitions, accuracy {:.2}", a)
      }
      Self::Trained { accuracy: None, samples } => {
        write!(f, "trained on {samples} transitions, accuracy N/A")
      }
      Self::MissingData => f.write_str("missing data required for training"),
      Self::NotEnoughData => f.write_str("not enough location history to train"),
    }
  }
}

/// A single prediction request's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "location", rename_all = "snake_case")]
pub enum Prediction {
  Next(String),
  Unavailable,
  UnseenEntity,
  UnseenLocation,
}

impl fmt::Display for Prediction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Next(loc) => write!(f, "Predicted Next Location: {loc}"),
      Self::Unavailable => {
        f.write_str("Predictor not available or current location is unknown.")
      }
      Self::UnseenEntity => f.write_str("Entity ID not seen during training."),
      Self::UnseenLocation => f.write_str("Location not seen during training."),
    }
  }
}

// ─── Predictor ───────────────────────────────────────────────────────────────

/// Owns the model directory and, once trained or loaded, the model.
#[derive(Debug, Clone)]
pub struct LocationPredictor {
  model_dir: PathBuf,
  params:    ForestParams,
  model:     Option<Model>,
}

impl LocationPredictor {
  pub fn new(model_dir: impl Into<PathBuf>, params: ForestParams) -> Self {
    Self {
      model_dir: model_dir.into(),
      params,
      model: None,
    }
  }

  pub fn model_dir(&self) -> &Path { &self.model_dir }

  pub fn is_trained(&self) -> bool { self.model.is_some() }

  /// Load a persisted model. Returns `Ok(false)` when either file is absent.
  pub fn load(&mut self) -> Result<bool> {
    let model_path = self.model_dir.join(MODEL_FILE);
    let encoders_path = self.model_dir.join(ENCODERS_FILE);
    if !model_path.is_file() || !encoders_path.is_file() {
      tracing::info!(dir = %self.model_dir.display(), "no persisted location model");
      return Ok(false);
    }

    let forest: Forest = serde_json::from_slice(&fs::read(&model_path)?)?;
    let encoders: Encoders = serde_json::from_slice(&fs::read(&encoders_path)?)?;
    tracing::info!(
      entities = encoders.entities.len(),
      locations = encoders.locations.len(),
      "loaded location model"
    );
    self.model = Some(Model { forest, encoders });
    Ok(true)
  }

  /// Write the current model, if any, to the model directory.
  pub fn save(&self) -> Result<()> {
    let Some(model) = &self.model else {
      return Ok(());
    };
    fs::create_dir_all(&self.model_dir)?;
    fs::write(
      self.model_dir.join(MODEL_FILE),
      serde_json::to_vec(&model.forest)?,
    )?;
    fs::write(
      self.model_dir.join(ENCODERS_FILE),
      serde_json::to_vec_pretty(&model.encoders)?,
    )?;
    tracing::debug!(dir = %self.model_dir.display(), "saved location model");
    Ok(())
  }

  /// Fit a fresh model from `store` and persist it. A previously loaded
  /// model is kept unless training succeeds.
  pub fn train<S: ActivityStore + ?Sized>(
    &mut self,
    store: &S,
  ) -> Result<TrainOutcome> {
    if !history::has_required_data(store) {
      tracing::warn!("location predictor: missing data required for training");
      return Ok(TrainOutcome::MissingData);
    }

    let (entities, locations, transitions) =
      history::transitions(&history::observations(store));
    if transitions.is_empty() {
      tracing::warn!("location predictor: not enough location history to train");
      return Ok(TrainOutcome::NotEnoughData);
    }

    let mut rng = StdRng::seed_from_u64(self.params.seed);
    let (train, test) = split(&transitions, self.params.test_size, &mut rng);
    let forest = Forest::fit(
      &train.features,
      &train.targets,
      locations.len(),
      self.params.n_estimators,
      &mut rng,
    )?;

    let accuracy = if test.is_empty() {
      None
    } else {
      let predicted = forest.predict(&test.features)?;
      let hits = predicted
        .iter()
        .zip(&test.targets)
        .filter(|(p, t)| p == t)
        .count();
      Some(hits as f64 / test.len() as f64)
    };

    let outcome = TrainOutcome::Trained {
      accuracy,
      samples: transitions.len(),
    };
    tracing::info!(%outcome, "location predictor trained");

    self.model = Some(Model {
      forest,
      encoders: Encoders { entities, locations },
    });
    self.save()?;
    Ok(outcome)
  }

  pub fn predict(
    &self,
    entity_id: &str,
    current_location: Option<&str>,
  ) -> Prediction {
    let (Some(model), Some(current)) = (&self.model, current_location) else {
      return Prediction::Unavailable;
    };
    let Some(entity) = model.encoders.entities.transform(entity_id) else {
      return Prediction::UnseenEntity;
    };
    let Some(location) = model.encoders.locations.transform(current) else {
      return Prediction::UnseenLocation;
    };

    match model.forest.predict_one([entity, location]) {
      Ok(Some(next)) => match model.encoders.locations.inverse(next) {
        Some(label) => Prediction::Next(label.to_string()),
        None => Prediction::Unavailable,
      },
      Ok(None) => Prediction::Unavailable,
      Err(e) => {
        tracing::error!(error = %e, "location prediction failed");
        Prediction::Unavailable
      }
    }
  }
}

/// Shuffle, then hold out `ceil(n * test_size)` examples, always leaving at
/// least one for training.
fn split(
  all: &Transitions,
  test_size: f64,
  rng: &mut StdRng,
) -> (Transitions, Transitions) {
  let n = all.len();
  let mut order: Vec<usize> = (0..n).collect();
  order.shuffle(rng);

  let wanted = (n as f64 * test_size.clamp(0.0, 1.0)).ceil() as usize;
  let n_test = wanted.min(n.saturating_sub(1));

  let pick = |idx: &[usize]| Transitions {
    features: idx.iter().map(|&i| all.features[i]).collect(),
    targets:  idx.iter().map(|&i| all.targets[i]).collect(),
  };
  let (test, train) = order.split_at(n_test);
  (pick(train), pick(test))
}
