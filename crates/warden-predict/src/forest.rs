//! A bagged forest of `linfa-trees` decision trees.
//!
//! Each tree is fitted on a bootstrap sample of the training rows drawn from
//! a seeded RNG, so the same data and seed always produce the same forest.
//! Prediction is a majority vote; ties go to the lowest class index.

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Training knobs; deserialized from the `[predictor]` settings table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
  pub n_estimators: usize,
  /// Share of examples held out to report accuracy.
  pub test_size:    f64,
  pub seed:         u64,
}

impl Default for ForestParams {
  fn default() -> Self {
    Self {
      n_estimators: 50,
      test_size:    0.2,
      seed:         42,
    }
  }
}

// ─── Forest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Forest {
  trees:     Vec<DecisionTree<f64, usize>>,
  n_classes: usize,
}

impl Forest {
  /// Fit `n_estimators` trees. `features` and `targets` must be non-empty
  /// and of equal length; every target must be below `n_classes`.
  pub(crate) fn fit(
    features: &[[usize; 2]],
    targets: &[usize],
    n_classes: usize,
    n_estimators: usize,
    rng: &mut StdRng,
  ) -> Result<Self> {
    if features.is_empty() || features.len() != targets.len() {
      return Err(Error::Training(format!(
        "{} feature rows for {} targets",
        features.len(),
        targets.len()
      )));
    }

    let n = features.len();
    let mut trees = Vec::with_capacity(n_estimators.max(1));
    for _ in 0..n_estimators.max(1) {
      let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
      let records = matrix(sample.iter().map(|&i| features[i]))?;
      let labels: Array1<usize> = sample.iter().map(|&i| targets[i]).collect();
      let dataset = Dataset::new(records, labels);

      let fitted: Result<DecisionTree<f64, usize>, linfa::Error> =
        DecisionTree::params()
          .split_quality(SplitQuality::Gini)
          .fit(&dataset);
      trees.push(fitted.map_err(|e| Error::Training(e.to_string()))?);
    }

    Ok(Self { trees, n_classes })
  }

  /// Majority vote for each row of `features`.
  pub(crate) fn predict(&self, features: &[[usize; 2]]) -> Result<Vec<usize>> {
    if features.is_empty() {
      return Ok(Vec::new());
    }
    let records = matrix(features.iter().copied())?;
    let mut votes = vec![vec![0usize; self.n_classes.max(1)]; features.len()];
    for tree in &self.trees {
      let predicted: Array1<usize> = tree.predict(&records);
      for (row, &class) in predicted.iter().enumerate() {
        if let Some(slot) = votes[row].get_mut(class) {
          *slot += 1;
        }
      }
    }
    Ok(votes.iter().map(|counts| majority(counts)).collect())
  }

  pub(crate) fn predict_one(&self, sample: [usize; 2]) -> Result<Option<usize>> {
    Ok(self.predict(&[sample])?.first().copied())
  }
}

fn matrix(rows: impl Iterator<Item = [usize; 2]>) -> Result<Array2<f64>> {
  let flat: Vec<f64> = rows.flat_map(|r| r.map(|v| v as f64)).collect();
  let n = flat.len() / 2;
  Ok(Array2::from_shape_vec((n, 2), flat)?)
}

/// Index of the highest count; the first one on ties.
fn majority(counts: &[usize]) -> usize {
  let mut best = 0;
  for (i, &c) in counts.iter().enumerate() {
    if c > counts[best] {
      best = i;
    }
  }
  best
}
