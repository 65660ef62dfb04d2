//! Polling pipeline for the fall-detection service.
//!
//! Each poll fetches one IMU sample, advances the orientation filter, builds
//! the feature vector and asks the classifier for a posture label. Whatever
//! fails along the way, the caller still gets an answer: the last good
//! prediction (or the startup placeholder), annotated with the failure.

pub mod cache;
pub mod error;
pub mod label;
pub mod payload;
pub mod pipeline;

pub use cache::{PredictionCache, PredictionResult};
pub use error::{Failure, FailureKind};
pub use payload::{fixed_prediction, PredictionResponse};
pub use pipeline::{PipelineState, PollOutcome, PollingPipeline, DEFAULT_FETCH_TIMEOUT};
