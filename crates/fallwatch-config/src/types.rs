use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Shortest delay the poll loop and the sensor client accept.
pub const MIN_DURATION: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sensor device connection.
    pub sensor: SensorConfig,
    /// Orientation filter tuning.
    pub filter: FilterConfig,
    /// Classifier artifacts.
    pub classifier: ClassifierConfig,
    /// Background polling.
    pub poll: PollConfig,
}

impl AppConfig {
    /// Replace zero durations with their defaults.
    ///
    /// A zero poll interval cannot drive a timer and a zero fetch timeout
    /// fails every poll, so neither is honoured.
    pub fn sanitize(&mut self) {
        if self.poll.interval_ms == 0 {
            let fallback = PollConfig::default().interval_ms;
            warn!(fallback, "poll.interval_ms is 0, using default");
            self.poll.interval_ms = fallback;
        }
        if self.sensor.fetch_timeout_ms == 0 {
            let fallback = SensorConfig::default().fetch_timeout_ms;
            warn!(fallback, "sensor.fetch_timeout_ms is 0, using default");
            self.sensor.fetch_timeout_ms = fallback;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Base URL of the sensor device; readings are served on `{base_url}/data`.
    pub base_url: String,
    /// Upper bound on one fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl SensorConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms).max(MIN_DURATION)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.213.84".into(),
            fetch_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Madgwick gain. Higher = converges faster on gravity, noisier.
    pub beta: f64,
    /// Expected sample rate (Hz); scales each integration step.
    pub sample_freq: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            beta: 0.1,
            sample_freq: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// k-NN model artifact (JSON).
    pub model_path: PathBuf,
    /// Feature scaler artifact (JSON).
    pub scaler_path: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("knn_model.json"),
            scaler_path: PathBuf::from("data_scaler.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between polls, in milliseconds.
    pub interval_ms: u64,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms).max(MIN_DURATION)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}
