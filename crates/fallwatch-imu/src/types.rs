use glam::{DQuat, DVec3, EulerRot};

/// Raw sensor reading from the wearable IMU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Accelerometer linear acceleration (g).
    pub accel: DVec3,
    /// Gyroscope angular velocity (deg/s).
    pub gyro: DVec3,
}

impl RawSample {
    pub fn new(accel: [f64; 3], gyro: [f64; 3]) -> Self {
        Self {
            accel: DVec3::from_array(accel),
            gyro: DVec3::from_array(gyro),
        }
    }

    /// Sample reported before the device has produced anything: at rest, z up.
    pub fn at_rest() -> Self {
        Self::new([0.0, 0.0, 1.0], [0.0, 0.0, 0.0])
    }
}

/// Attitude quaternion in `(w, x, y, z)` order, `w` being the scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy, or `None` when the magnitude is zero (or not finite).
    pub fn try_normalize(&self) -> Option<Self> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self::new(
            self.w / norm,
            self.x / norm,
            self.y / norm,
            self.z / norm,
        ))
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Roll, pitch and yaw in radians.
    pub fn euler_angles(&self) -> [f64; 3] {
        let (roll, pitch, yaw) = DQuat::from(*self).to_euler(EulerRot::XYZ);
        [roll, pitch, yaw]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Quaternion> for DQuat {
    fn from(q: Quaternion) -> Self {
        DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quaternion_does_not_normalize() {
        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).try_normalize().is_none());
    }

    #[test]
    fn normalize_yields_unit_length() {
        let q = Quaternion::new(2.0, 2.0, 2.0, 2.0).try_normalize().unwrap();
        assert!((q.norm() - 1.0).abs() < 1e-12);
        assert!((q.w - 0.5).abs() < 1e-12);
    }

    #[test]
    fn identity_has_zero_euler_angles() {
        let euler = Quaternion::IDENTITY.euler_angles();
        assert!(euler.iter().all(|a| a.abs() < 1e-12));
    }
}
