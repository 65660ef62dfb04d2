use crate::types::RawSample;
use serde::Deserialize;
use thiserror::Error;

/// Payload field carrying the accelerometer triple (g).
pub const ACCEL_FIELD: &str = "a";
/// Payload field carrying the gyroscope triple (deg/s).
pub const GYRO_FIELD: &str = "g";

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Payload is not valid JSON: {0}")]
    Decode(String),
    #[error("Payload is missing the `{0}` field")]
    MissingField(&'static str),
}

/// JSON body served by the sensor device, e.g. `{"a":[0,0,1],"g":[0,0,0]}`.
///
/// Both fields are optional at the decode level so that an absent field can be
/// reported by name rather than as a generic decode error.
#[derive(Debug, Deserialize)]
struct DevicePayload {
    a: Option<[f64; 3]>,
    g: Option<[f64; 3]>,
}

/// Parse one device payload into a sample.
pub fn parse_payload(body: &[u8]) -> Result<RawSample, PayloadError> {
    let payload: DevicePayload =
        serde_json::from_slice(body).map_err(|e| PayloadError::Decode(e.to_string()))?;

    let accel = payload.a.ok_or(PayloadError::MissingField(ACCEL_FIELD))?;
    let gyro = payload.g.ok_or(PayloadError::MissingField(GYRO_FIELD))?;

    Ok(RawSample::new(accel, gyro))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_complete_payload() {
        let sample = parse_payload(br#"{"a":[0.01,-0.03,0.98],"g":[0.5,1.2,0.1]}"#).unwrap();
        assert!((sample.accel.x - 0.01).abs() < 1e-12);
        assert!((sample.accel.y + 0.03).abs() < 1e-12);
        assert!((sample.accel.z - 0.98).abs() < 1e-12);
        assert!((sample.gyro.x - 0.5).abs() < 1e-12);
        assert!((sample.gyro.y - 1.2).abs() < 1e-12);
        assert!((sample.gyro.z - 0.1).abs() < 1e-12);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let sample = parse_payload(br#"{"a":[0,0,1],"g":[0,0,0],"t":12345}"#).unwrap();
        assert_eq!(sample, RawSample::at_rest());
    }

    #[test]
    fn missing_gyro_is_reported_by_name() {
        let err = parse_payload(br#"{"a":[0,0,1]}"#).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("g"));
    }

    #[test]
    fn missing_accel_is_reported_by_name() {
        let err = parse_payload(br#"{"g":[0,0,0]}"#).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("a"));
    }

    #[test]
    fn short_triple_fails_to_decode() {
        let err = parse_payload(br#"{"a":[0,1],"g":[0,0,0]}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Decode(_)));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            parse_payload(b"<html>not found</html>"),
            Err(PayloadError::Decode(_))
        ));
    }
}
