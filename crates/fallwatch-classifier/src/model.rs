use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_ORDER};
use crate::{Classifier, ClassifierError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{artifact} columns {found:?} do not match the feature order {expected:?}")]
    SchemaMismatch {
        artifact: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Invalid {artifact}: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },
}

/// Per-feature standardization `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self) -> Result<(), ArtifactError> {
        check_columns("scaler", &self.feature_names)?;
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid {
                artifact: "scaler",
                reason: format!(
                    "expected {FEATURE_COUNT} means and scales, got {} and {}",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        Ok(())
    }

    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in features.iter().enumerate() {
            // Constant training columns have zero spread and are left unscaled.
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            out[i] = (value - self.mean[i]) / scale;
        }
        out
    }
}

/// k-nearest-neighbours model over standardized features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    pub feature_names: Vec<String>,
    pub k: usize,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl KnnModel {
    fn validate(&self) -> Result<(), ArtifactError> {
        check_columns("model", &self.feature_names)?;
        let invalid = |reason: String| ArtifactError::Invalid {
            artifact: "model",
            reason,
        };
        if self.k == 0 {
            return Err(invalid("k must be at least 1".into()));
        }
        if self.samples.is_empty() {
            return Err(invalid("no training samples".into()));
        }
        if self.samples.len() != self.labels.len() {
            return Err(invalid(format!(
                "{} samples but {} labels",
                self.samples.len(),
                self.labels.len()
            )));
        }
        if let Some(row) = self.samples.iter().position(|s| s.len() != FEATURE_COUNT) {
            return Err(invalid(format!(
                "sample {row} has {} values, expected {FEATURE_COUNT}",
                self.samples[row].len()
            )));
        }
        Ok(())
    }

    /// Majority label among the `k` nearest samples.
    ///
    /// Ties go to the lexicographically smallest label.
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> Option<String> {
        let mut by_distance: Vec<(f64, &str)> = self
            .samples
            .iter()
            .zip(&self.labels)
            .map(|(s, label)| {
                let d2: f64 = s.iter().zip(x).map(|(a, b)| (a - b).powi(2)).sum();
                (d2, label.as_str())
            })
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, label) in by_distance.iter().take(self.k) {
            *votes.entry(*label).or_default() += 1;
        }

        // BTreeMap iterates in label order; keep the first maximum.
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in votes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label.to_string())
    }
}

/// Classifier backed by a scaler and a k-NN model stored as JSON artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    scaler: StandardScaler,
    model: KnnModel,
}

impl ArtifactClassifier {
    pub fn new(scaler: StandardScaler, model: KnnModel) -> Result<Self, ArtifactError> {
        scaler.validate()?;
        model.validate()?;
        Ok(Self { scaler, model })
    }

    /// Load both artifacts from disk and check them against the feature order.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, ArtifactError> {
        let model: KnnModel = read_json(model_path)?;
        let scaler: StandardScaler = read_json(scaler_path)?;
        let classifier = Self::new(scaler, model)?;
        tracing::info!(
            model = ?model_path,
            k = classifier.model.k,
            samples = classifier.model.samples.len(),
            "Classifier loaded"
        );
        Ok(classifier)
    }
}

impl Classifier for ArtifactClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let scaled = self.scaler.transform(features.as_array());
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::Internal(
                "non-finite value after scaling".into(),
            ));
        }
        self.model
            .predict(&scaled)
            .ok_or_else(|| ClassifierError::Unavailable("model has no neighbours".into()))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_columns(artifact: &'static str, found: &[String]) -> Result<(), ArtifactError> {
    let expected: Vec<String> = FEATURE_ORDER.iter().map(|f| f.as_str().to_string()).collect();
    if found != expected.as_slice() {
        return Err(ArtifactError::SchemaMismatch {
            artifact,
            expected,
            found: found.to_vec(),
        });
    }
    Ok(())
}
