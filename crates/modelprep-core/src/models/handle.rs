//! Loaded model handle and its label mapping.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mapping from class index to class name, ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<u32, String>);

impl LabelMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label at `index`, if any.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    /// Iterate entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(i, name)| (*i, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare the label at `index` against `expected`.
    pub fn check(&self, index: u32, expected: &str) -> LabelCheck {
        match self.get(index) {
            Some(found) if found == expected => LabelCheck::Match {
                index,
                label: found.to_string(),
            },
            found => LabelCheck::Mismatch {
                index,
                expected: expected.to_string(),
                found: found.map(str::to_string),
            },
        }
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for LabelMap {
    fn from_iter<T: IntoIterator<Item = (u32, S)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(i, s)| (i, s.into())).collect())
    }
}

/// Outcome of the label sanity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelCheck {
    /// The expected label sits at the expected index.
    Match { index: u32, label: String },
    /// Something else (or nothing) sits at the index.
    Mismatch {
        index: u32,
        expected: String,
        found: Option<String>,
    },
}

impl LabelCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, LabelCheck::Match { .. })
    }
}

/// Handle to a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    /// Identifier the model was loaded from.
    pub model_id: String,

    /// Class index to name mapping reported by the model.
    pub names: LabelMap,

    /// Checkpoint file the loader resolved `model_id` to, when known.
    pub weights: Option<PathBuf>,
}

impl ModelHandle {
    pub fn new(model_id: impl Into<String>, names: LabelMap) -> Self {
        Self {
            model_id: model_id.into(),
            names,
            weights: None,
        }
    }

    /// Record the resolved checkpoint file.
    pub fn with_weights(mut self, weights: impl Into<PathBuf>) -> Self {
        self.weights = Some(weights.into());
        self
    }

    /// What to hand the exporter so it converts the model that was loaded:
    /// the resolved checkpoint when known, the identifier otherwise.
    pub fn export_source(&self) -> String {
        self.weights
            .as_ref()
            .map(|w| w.display().to_string())
            .unwrap_or_else(|| self.model_id.clone())
    }
}
