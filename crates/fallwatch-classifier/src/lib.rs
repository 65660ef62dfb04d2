pub mod features;
pub mod model;

use thiserror::Error;

pub use features::{build_features, FeatureName, FeatureVector, FEATURE_COUNT, FEATURE_ORDER};
pub use model::{ArtifactClassifier, ArtifactError, KnnModel, StandardScaler};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
    #[error("Classifier failed: {0}")]
    Internal(String),
}

/// Posture classifier: maps one feature vector to a label such as `"stand"`
/// or `"fall_forward"`.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError>;
}
