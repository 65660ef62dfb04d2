use crate::cache::{PredictionCache, PredictionResult};
use crate::error::{Failure, FailureKind};
use crate::label::{decorate, MODEL_NOT_LOADED_LABEL};
use crate::payload::PredictionResponse;
use fallwatch_classifier::{build_features, Classifier, ClassifierError, FeatureVector};
use fallwatch_imu::types::RawSample;
use fallwatch_imu::{FilterStep, OrientationFilter, SensorError, SensorSource};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default bound on one sensor fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Stages of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Fusing,
    Predicting,
    Succeeded,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of one poll: always carries a complete prediction.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub result: Arc<PredictionResult>,
    pub failure: Option<Failure>,
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn state(&self) -> PipelineState {
        if self.is_success() {
            PipelineState::Succeeded
        } else {
            PipelineState::Failed
        }
    }

    pub fn to_response(&self) -> PredictionResponse {
        PredictionResponse::new(&self.result, self.failure.clone())
    }
}

/// Poll → fuse → classify → fall back.
///
/// One pipeline tracks one sensor stream. Every call to [`poll`](Self::poll)
/// answers with either a fresh prediction or the cached one annotated with
/// what went wrong; it never returns an error.
pub struct PollingPipeline {
    source: Box<dyn SensorSource>,
    classifier: Option<Arc<dyn Classifier>>,
    filter: Mutex<OrientationFilter>,
    cache: PredictionCache,
    fetch_timeout: Duration,
}

impl PollingPipeline {
    /// `classifier` is `None` when the model artifacts failed to load; polls
    /// then run in degraded mode.
    pub fn new(
        source: Box<dyn SensorSource>,
        classifier: Option<Arc<dyn Classifier>>,
        filter: OrientationFilter,
    ) -> Self {
        Self {
            source,
            classifier,
            filter: Mutex::new(filter),
            cache: PredictionCache::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Run one poll and render it for clients.
    pub async fn get_prediction(&self) -> PredictionResponse {
        self.poll().await.to_response()
    }

    /// Latest cached prediction, without polling.
    pub fn current(&self) -> PredictionResponse {
        PredictionResponse::new(&self.cache.current(), None)
    }

    /// Run one poll.
    pub async fn poll(&self) -> PollOutcome {
        transition(PipelineState::Idle, PipelineState::Fetching);
        let sample = match self.fetch().await {
            Ok(sample) => sample,
            Err(e) => return self.fail(PipelineState::Fetching, e.into()),
        };

        // Fuse, classify and commit under the filter lock so concurrent polls
        // reach the cache in the order they advanced the filter. The lock is
        // async: waiting polls yield instead of parking a worker thread.
        let mut filter = self.filter.lock().await;

        transition(PipelineState::Fetching, PipelineState::Fusing);
        let step = filter.update(sample.gyro, sample.accel);
        if step != FilterStep::Applied {
            tracing::debug!(?step, "Orientation estimate kept");
        }
        let quaternion = filter.quaternion();
        tracing::trace!(euler = ?filter.euler_angles(), "Orientation");

        transition(PipelineState::Fusing, PipelineState::Predicting);
        let Some(classifier) = &self.classifier else {
            // Degraded mode: fresh readings, placeholder label, cache untouched.
            let result = PredictionResult::new(MODEL_NOT_LOADED_LABEL, sample, quaternion);
            transition(PipelineState::Predicting, PipelineState::Failed);
            return PollOutcome {
                result: Arc::new(result),
                failure: Some(Failure::model_not_loaded()),
            };
        };

        let features = build_features(&quaternion, &sample);
        tracing::trace!(features = ?features.as_array(), "Features built");
        let raw = match predict_blocking(classifier, features).await {
            Ok(raw) => raw,
            Err(e) => return self.fail(PipelineState::Predicting, e.into()),
        };

        let result = self
            .cache
            .store(PredictionResult::new(decorate(&raw), sample, quaternion));
        drop(filter);

        transition(PipelineState::Predicting, PipelineState::Succeeded);
        tracing::debug!(label = %result.label, "Prediction updated");
        PollOutcome {
            result,
            failure: None,
        }
    }

    async fn fetch(&self) -> Result<RawSample, SensorError> {
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SensorError::Timeout(self.fetch_timeout)),
        }
    }

    fn fail(&self, from: PipelineState, failure: Failure) -> PollOutcome {
        transition(from, PipelineState::Failed);
        match failure.kind {
            FailureKind::SensorUnavailable => {
                tracing::warn!(%failure, "Sensor fetch failed, serving cached prediction")
            }
            _ => tracing::warn!(%failure, "Poll failed, serving cached prediction"),
        }
        PollOutcome {
            result: self.cache.current(),
            failure: Some(failure),
        }
    }
}

/// Run the classifier on the blocking pool; a k-NN scan over a large training
/// set must not stall the runtime.
async fn predict_blocking(
    classifier: &Arc<dyn Classifier>,
    features: FeatureVector,
) -> Result<String, ClassifierError> {
    let classifier = Arc::clone(classifier);
    tokio::task::spawn_blocking(move || classifier.predict(&features))
        .await
        .map_err(|e| ClassifierError::Internal(format!("prediction task failed: {e}")))?
}

fn transition(from: PipelineState, to: PipelineState) {
    tracing::debug!(%from, %to, "Pipeline state");
}
