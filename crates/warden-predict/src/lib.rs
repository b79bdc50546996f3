//! Next-location prediction for Warden.
//!
//! Location observations from card swipes and Wi-Fi associations are joined
//! back to entities, ordered per entity, and turned into
//! `(entity, current location) → next location` examples. A bagged forest of
//! decision trees learns those transitions; the forest and its two label
//! encoders are persisted as JSON next to each other.
//!
//! # Quick start
//!
//! ```no_run
//! use warden_predict::{ForestParams, LocationPredictor};
//! # fn demo(store: &impl warden_core::store::ActivityStore) -> warden_predict::Result<()> {
//! let mut predictor = LocationPredictor::new("models", ForestParams::default());
//! if !predictor.load()? {
//!   predictor.train(store)?;
//! }
//! println!("{}", predictor.predict("E1", Some("GATE1")));
//! # Ok(())
//! # }
//! ```

pub mod encoder;
pub mod error;
mod forest;
pub mod history;
mod predictor;

pub use error::{Error, Result};
pub use forest::ForestParams;
pub use predictor::{
  ENCODERS_FILE, LocationPredictor, MODEL_FILE, Prediction, TrainOutcome,
};
