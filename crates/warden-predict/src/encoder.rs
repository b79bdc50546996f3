//! Label encoding between string labels and dense class indices.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Maps each distinct label to its position in the sorted class list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
  classes: Vec<String>,
}

impl LabelEncoder {
  pub fn fit<I, S>(labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let set: BTreeSet<String> =
      labels.into_iter().map(|s| s.as_ref().to_string()).collect();
    Self { classes: set.into_iter().collect() }
  }

  pub fn classes(&self) -> &[String] { &self.classes }

  pub fn len(&self) -> usize { self.classes.len() }

  pub fn is_empty(&self) -> bool { self.classes.is_empty() }

  pub fn contains(&self, label: &str) -> bool { self.transform(label).is_some() }

  pub fn transform(&self, label: &str) -> Option<usize> {
    self
      .classes
      .binary_search_by(|c| c.as_str().cmp(label))
      .ok()
  }

  pub fn inverse(&self, index: usize) -> Option<&str> {
    self.classes.get(index).map(String::as_str)
  }
}
