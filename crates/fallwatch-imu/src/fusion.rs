use crate::types::Quaternion;
use glam::DVec3;

/// Default filter gain.
pub const DEFAULT_BETA: f64 = 0.1;
/// Default sample rate (Hz) used to scale the integration step.
pub const DEFAULT_SAMPLE_FREQ: f64 = 50.0;

/// What a single [`OrientationFilter::update`] call did with its sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStep {
    /// The estimate was advanced.
    Applied,
    /// Accelerometer magnitude was zero; estimate kept.
    ZeroAcceleration,
    /// Corrective gradient was zero; estimate kept.
    ZeroGradient,
    /// Integrated quaternion collapsed to zero length; estimate kept.
    ZeroQuaternion,
}

/// Gradient-descent orientation filter (Madgwick, IMU-only).
///
/// Fuses gyroscope rates with the gravity direction measured by the
/// accelerometer. There is no magnetometer term, so yaw is only ever
/// integrated from the gyroscope.
///
/// Degenerate samples never raise: they leave the estimate untouched and are
/// reported through [`FilterStep`].
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    q: Quaternion,
    beta: f64,
    sample_freq: f64,
}

impl OrientationFilter {
    pub fn new(beta: f64, sample_freq: f64) -> Self {
        Self {
            q: Quaternion::IDENTITY,
            beta,
            sample_freq,
        }
    }

    /// Advance the estimate with one sample.
    ///
    /// `gyro` is in deg/s, `accel` in any consistent unit (only its direction
    /// is used).
    pub fn update(&mut self, gyro: DVec3, accel: DVec3) -> FilterStep {
        let g = DVec3::new(
            gyro.x.to_radians(),
            gyro.y.to_radians(),
            gyro.z.to_radians(),
        );

        let accel_norm = accel.length();
        if accel_norm == 0.0 {
            return FilterStep::ZeroAcceleration;
        }
        let a = accel / accel_norm;

        let Quaternion {
            w: q0,
            x: q1,
            y: q2,
            z: q3,
        } = self.q;

        let _2q0 = 2.0 * q0;
        let _2q1 = 2.0 * q1;
        let _2q2 = 2.0 * q2;
        let _2q3 = 2.0 * q3;
        let _4q0 = 4.0 * q0;
        let _4q1 = 4.0 * q1;
        let _4q2 = 4.0 * q2;
        let _8q1 = 8.0 * q1;
        let _8q2 = 8.0 * q2;
        let q0q0 = q0 * q0;
        let q1q1 = q1 * q1;
        let q2q2 = q2 * q2;
        let q3q3 = q3 * q3;

        // Gradient of the gravity residual, J^T * f.
        let s0 = _4q0 * q2q2 + _2q2 * a.x + _4q0 * q1q1 - _2q1 * a.y;
        let s1 = _4q1 * q3q3 - _2q3 * a.x + 4.0 * q0q0 * q1 - _2q0 * a.y - _4q1
            + _8q1 * q1q1
            + _8q1 * q2q2
            + _4q1 * a.z;
        let s2 = 4.0 * q0q0 * q2 + _2q0 * a.x + _4q2 * q3q3 - _2q3 * a.y - _4q2
            + _8q2 * q1q1
            + _8q2 * q2q2
            + _4q2 * a.z;
        let s3 = 4.0 * q1q1 * q3 - _2q1 * a.x + 4.0 * q2q2 * q3 - _2q2 * a.y;

        let step_norm = (s0 * s0 + s1 * s1 + s2 * s2 + s3 * s3).sqrt();
        if step_norm == 0.0 {
            return FilterStep::ZeroGradient;
        }
        let (s0, s1, s2, s3) = (
            s0 / step_norm,
            s1 / step_norm,
            s2 / step_norm,
            s3 / step_norm,
        );

        let beta = self.beta;
        let q_dot = [
            0.5 * (-q1 * g.x - q2 * g.y - q3 * g.z) - beta * s0,
            0.5 * (q0 * g.x + q2 * g.z - q3 * g.y) - beta * s1,
            0.5 * (q0 * g.y - q1 * g.z + q3 * g.x) - beta * s2,
            0.5 * (q0 * g.z + q1 * g.y - q2 * g.x) - beta * s3,
        ];

        let integrated = Quaternion::new(
            q0 + q_dot[0] / self.sample_freq,
            q1 + q_dot[1] / self.sample_freq,
            q2 + q_dot[2] / self.sample_freq,
            q3 + q_dot[3] / self.sample_freq,
        );

        match integrated.try_normalize() {
            Some(q) => {
                self.q = q;
                FilterStep::Applied
            }
            None => FilterStep::ZeroQuaternion,
        }
    }

    /// Current attitude estimate.
    pub fn quaternion(&self) -> Quaternion {
        self.q
    }

    /// Roll, pitch and yaw of the current estimate in radians.
    pub fn euler_angles(&self) -> [f64; 3] {
        self.q.euler_angles()
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn sample_freq(&self) -> f64 {
        self.sample_freq
    }
}

impl Default for OrientationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BETA, DEFAULT_SAMPLE_FREQ)
    }
}
