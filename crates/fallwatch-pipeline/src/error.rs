use fallwatch_classifier::ClassifierError;
use fallwatch_imu::SensorError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a poll did not produce a fresh classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    SensorUnavailable,
    MalformedSample,
    ClassifierUnavailable,
    ModelNotLoaded,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::SensorUnavailable => "SensorUnavailable",
            FailureKind::MalformedSample => "MalformedSample",
            FailureKind::ClassifierUnavailable => "ClassifierUnavailable",
            FailureKind::ModelNotLoaded => "ModelNotLoaded",
        };
        f.write_str(name)
    }
}

/// A failed stage, carried alongside the fallback result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn model_not_loaded() -> Self {
        Self::new(FailureKind::ModelNotLoaded, "Classifier artifacts were not loaded")
    }
}

impl From<SensorError> for Failure {
    fn from(e: SensorError) -> Self {
        let kind = match e {
            SensorError::Unavailable(_) | SensorError::Timeout(_) => FailureKind::SensorUnavailable,
            SensorError::Malformed(_) => FailureKind::MalformedSample,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ClassifierError> for Failure {
    fn from(e: ClassifierError) -> Self {
        Self::new(FailureKind::ClassifierUnavailable, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallwatch_imu::protocol::PayloadError;
    use std::time::Duration;

    #[test]
    fn sensor_errors_map_to_kinds() {
        let timeout: Failure = SensorError::Timeout(Duration::from_secs(1)).into();
        assert_eq!(timeout.kind, FailureKind::SensorUnavailable);

        let malformed: Failure = SensorError::Malformed(PayloadError::MissingField("g")).into();
        assert_eq!(malformed.kind, FailureKind::MalformedSample);
        assert!(malformed.message.contains("`g`"));
    }

    #[test]
    fn display_includes_kind_and_message() {
        let failure = Failure::new(FailureKind::ClassifierUnavailable, "boom");
        assert_eq!(failure.to_string(), "ClassifierUnavailable: boom");
    }
}
