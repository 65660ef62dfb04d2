use crate::label::INITIALIZING_LABEL;
use fallwatch_imu::types::RawSample;
use fallwatch_imu::Quaternion;
use std::sync::Arc;
use tokio::sync::watch;

/// Local-time timestamp format, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One classified sample.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Display label (already decorated).
    pub label: String,
    pub timestamp: String,
    pub sample: RawSample,
    pub quaternion: Quaternion,
}

impl PredictionResult {
    /// Result stamped with the current local time.
    pub fn new(label: impl Into<String>, sample: RawSample, quaternion: Quaternion) -> Self {
        Self {
            label: label.into(),
            timestamp: timestamp_now(),
            sample,
            quaternion,
        }
    }

    /// Value served before anything has been classified.
    pub fn placeholder() -> Self {
        Self::new(INITIALIZING_LABEL, RawSample::at_rest(), Quaternion::IDENTITY)
    }
}

/// Last known good prediction.
///
/// Always holds a complete result: it starts with the placeholder and is only
/// ever replaced as a whole, so readers never see a partial value.
pub struct PredictionCache {
    tx: watch::Sender<Arc<PredictionResult>>,
}

impl PredictionCache {
    pub fn new(initial: PredictionResult) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    pub fn current(&self) -> Arc<PredictionResult> {
        self.tx.borrow().clone()
    }

    /// Replace the cached result, returning the shared handle now stored.
    pub fn store(&self, result: PredictionResult) -> Arc<PredictionResult> {
        let result = Arc::new(result);
        self.tx.send_replace(result.clone());
        result
    }

    /// Watch for replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PredictionResult>> {
        self.tx.subscribe()
    }
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new(PredictionResult::placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_placeholder() {
        let cache = PredictionCache::default();
        let current = cache.current();
        assert_eq!(current.label, INITIALIZING_LABEL);
        assert_eq!(current.sample, RawSample::at_rest());
        assert_eq!(current.quaternion, Quaternion::IDENTITY);
        assert!(!current.timestamp.is_empty());
    }

    #[test]
    fn store_replaces_whole_value() {
        let cache = PredictionCache::default();
        let sample = RawSample::new([0.1, 0.2, 0.9], [1.0, 2.0, 3.0]);
        cache.store(PredictionResult::new("Normal - stand", sample, Quaternion::IDENTITY));

        let current = cache.current();
        assert_eq!(current.label, "Normal - stand");
        assert_eq!(current.sample, sample);
    }

    #[test]
    fn earlier_reads_keep_their_snapshot() {
        let cache = PredictionCache::default();
        let before = cache.current();
        cache.store(PredictionResult::new("Normal - sit", RawSample::at_rest(), Quaternion::IDENTITY));

        assert_eq!(before.label, INITIALIZING_LABEL);
        assert_eq!(cache.current().label, "Normal - sit");
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let cache = PredictionCache::default();
        let mut rx = cache.subscribe();
        cache.store(PredictionResult::new("Normal - walk", RawSample::at_rest(), Quaternion::IDENTITY));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().label, "Normal - walk");
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = timestamp_now();
        // "YYYY-MM-DD HH:MM:SS.mmm"
        assert_eq!(ts.len(), 23);
        assert_eq!(&ts[19..20], ".");
    }
}
