//! JSON shapes served to clients.

use crate::cache::PredictionResult;
use crate::error::Failure;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuatData {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Sensor readings as surfaced to clients: accel and quaternion to 3 decimal
/// places, gyro to 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorData {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub gx: f64,
    pub gy: f64,
    pub gz: f64,
    pub quat: QuatData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub timestamp: String,
    pub sensor_data: SensorData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl PredictionResponse {
    pub fn new(result: &PredictionResult, failure: Option<Failure>) -> Self {
        let a = result.sample.accel;
        let g = result.sample.gyro;
        let q = result.quaternion;
        Self {
            prediction: result.label.clone(),
            timestamp: result.timestamp.clone(),
            sensor_data: SensorData {
                ax: round_to(a.x, 3),
                ay: round_to(a.y, 3),
                az: round_to(a.z, 3),
                gx: round_to(g.x, 2),
                gy: round_to(g.y, 2),
                gz: round_to(g.z, 2),
                quat: QuatData {
                    w: round_to(q.w, 3),
                    x: round_to(q.x, 3),
                    y: round_to(q.y, 3),
                    z: round_to(q.z, 3),
                },
            },
            error: failure,
        }
    }
}

/// Hardcoded response for client contract testing. Independent of any live state.
pub fn fixed_prediction() -> PredictionResponse {
    PredictionResponse {
        prediction: "🚨 Fall Detected! fall_forward".into(),
        timestamp: "2025-04-20 14:23:45.123".into(),
        sensor_data: SensorData {
            ax: 0.012,
            ay: -0.034,
            az: 0.989,
            gx: 0.50,
            gy: 1.20,
            gz: 0.10,
            quat: QuatData {
                w: 0.998,
                x: 0.015,
                y: 0.010,
                z: 0.045,
            },
        },
        error: None,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use fallwatch_imu::types::RawSample;
    use fallwatch_imu::Quaternion;

    #[test]
    fn rounds_accel_and_quat_to_3_gyro_to_2() {
        let result = PredictionResult {
            label: "Normal - stand".into(),
            timestamp: "2025-01-01 00:00:00.000".into(),
            sample: RawSample::new([0.12345, -0.98765, 1.00049], [12.346, -0.126, 3.3]),
            quaternion: Quaternion::new(0.99951, 0.01234, -0.00049, 0.03051),
        };
        let data = PredictionResponse::new(&result, None).sensor_data;

        assert_eq!(data.ax, 0.123);
        assert_eq!(data.ay, -0.988);
        assert_eq!(data.az, 1.0);
        assert_eq!(data.gx, 12.35);
        assert_eq!(data.gy, -0.13);
        assert_eq!(data.gz, 3.3);
        assert_eq!(data.quat.w, 1.0);
        assert_eq!(data.quat.x, 0.012);
        assert_eq!(data.quat.y, -0.0);
        assert_eq!(data.quat.z, 0.031);
    }

    #[test]
    fn error_is_omitted_on_success() {
        let json = serde_json::to_value(fixed_prediction()).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["prediction"], "🚨 Fall Detected! fall_forward");
        assert_eq!(json["timestamp"], "2025-04-20 14:23:45.123");
        assert_eq!(json["sensor_data"]["gy"], 1.2);
        assert_eq!(json["sensor_data"]["quat"]["z"], 0.045);
    }

    #[test]
    fn error_is_serialized_with_kind_and_message() {
        let response = PredictionResponse::new(
            &PredictionResult::placeholder(),
            Some(Failure::new(FailureKind::SensorUnavailable, "timed out")),
        );
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["error"]["kind"], "SensorUnavailable");
        assert_eq!(json["error"]["message"], "timed out");
        assert_eq!(json["prediction"], "Initializing...");
    }

    #[test]
    fn fixed_prediction_is_stable() {
        let json = serde_json::to_value(fixed_prediction()).unwrap();
        assert_eq!(json["prediction"], "🚨 Fall Detected! fall_forward");
        assert_eq!(json["timestamp"], "2025-04-20 14:23:45.123");
        assert_eq!(json["sensor_data"]["az"], 0.989);
        assert_eq!(json["sensor_data"]["gy"], 1.2);
        assert_eq!(json["sensor_data"]["quat"]["z"], 0.045);
        assert!(json.get("error").is_none());
        assert_eq!(fixed_prediction(), fixed_prediction());
    }
}
