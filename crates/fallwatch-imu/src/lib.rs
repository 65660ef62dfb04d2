pub mod fusion;
pub mod protocol;
pub mod types;

use async_trait::async_trait;
use protocol::{parse_payload, PayloadError};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use types::RawSample;

pub use fusion::{FilterStep, OrientationFilter};
pub use types::Quaternion;

/// Path the sensor device serves its latest reading on.
const DATA_PATH: &str = "/data";

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),
    #[error("Sensor did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Malformed sample: {0}")]
    Malformed(#[from] PayloadError),
}

/// Source of raw IMU samples.
///
/// One call yields one complete sample or an error; partial samples are never
/// returned.
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn fetch(&self) -> Result<RawSample, SensorError>;
}

/// Client for the sensor device's HTTP endpoint (`GET {base_url}/data`).
pub struct HttpSensorSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSensorSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SensorError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), DATA_PATH);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SensorError::Unavailable(e.to_string()))?;
        tracing::info!(%url, ?timeout, "Sensor source configured");
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SensorSource for HttpSensorSource {
    async fn fetch(&self) -> Result<RawSample, SensorError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SensorError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SensorError::Unavailable(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SensorError::Unavailable(e.to_string()))?;

        let sample = parse_payload(&body)?;
        tracing::trace!(?sample, "Sample received");
        Ok(sample)
    }
}

/// One scripted answer of a [`MockSensorSource`].
#[derive(Debug)]
pub enum MockReading {
    Sample(RawSample),
    Fail(SensorError),
    /// Sleep before answering with the inner reading.
    Stall(Duration, Box<MockReading>),
}

/// Sensor source for development without the device connected.
///
/// Plays back scripted readings in order, then keeps answering with the
/// fallback sample (a device at rest unless configured otherwise).
pub struct MockSensorSource {
    script: Mutex<VecDeque<MockReading>>,
    fallback: RawSample,
}

impl MockSensorSource {
    pub fn at_rest() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(readings: impl IntoIterator<Item = MockReading>) -> Self {
        Self {
            script: Mutex::new(readings.into_iter().collect()),
            fallback: RawSample::at_rest(),
        }
    }

    pub fn with_fallback(mut self, sample: RawSample) -> Self {
        self.fallback = sample;
        self
    }
}

#[async_trait]
impl SensorSource for MockSensorSource {
    async fn fetch(&self) -> Result<RawSample, SensorError> {
        let next = self.script.lock().await.pop_front();
        let mut reading = match next {
            Some(reading) => reading,
            None => return Ok(self.fallback),
        };
        loop {
            match reading {
                MockReading::Sample(sample) => return Ok(sample),
                MockReading::Fail(e) => return Err(e),
                MockReading::Stall(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reading = *inner;
                }
            }
        }
    }
}
