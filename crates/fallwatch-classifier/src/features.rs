//! Feature vector fed to the posture classifier.
//!
//! The classifier consumes a positional array and carries no schema of its
//! own, so the column order lives here as [`FEATURE_ORDER`] and classifier
//! artifacts are checked against it when they are loaded.

use fallwatch_imu::types::RawSample;
use fallwatch_imu::Quaternion;
use std::fmt;

/// Number of features per sample.
pub const FEATURE_COUNT: usize = 10;

/// Named feature columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureName {
    W,
    X,
    Y,
    Z,
    DRoll,
    DPitch,
    DYaw,
    Ax,
    Ay,
    Az,
}

impl FeatureName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::W => "w",
            FeatureName::X => "x",
            FeatureName::Y => "y",
            FeatureName::Z => "z",
            FeatureName::DRoll => "droll",
            FeatureName::DPitch => "dpitch",
            FeatureName::DYaw => "dyaw",
            FeatureName::Ax => "ax",
            FeatureName::Ay => "ay",
            FeatureName::Az => "az",
        }
    }

    /// Column index of this feature in a [`FeatureVector`].
    pub fn index(&self) -> usize {
        match self {
            FeatureName::W => 0,
            FeatureName::X => 1,
            FeatureName::Y => 2,
            FeatureName::Z => 3,
            FeatureName::DRoll => 4,
            FeatureName::DPitch => 5,
            FeatureName::DYaw => 6,
            FeatureName::Ax => 7,
            FeatureName::Ay => 8,
            FeatureName::Az => 9,
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column order the classifier was trained with.
pub const FEATURE_ORDER: [FeatureName; FEATURE_COUNT] = [
    FeatureName::W,
    FeatureName::X,
    FeatureName::Y,
    FeatureName::Z,
    FeatureName::DRoll,
    FeatureName::DPitch,
    FeatureName::DYaw,
    FeatureName::Ax,
    FeatureName::Ay,
    FeatureName::Az,
];

/// Feature values in [`FEATURE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn get(&self, name: FeatureName) -> f64 {
        self.0[name.index()]
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

/// Build the classifier input from the current attitude and the raw sample.
///
/// The rate features are the raw gyroscope readings in deg/s.
pub fn build_features(q: &Quaternion, sample: &RawSample) -> FeatureVector {
    FeatureVector([
        q.w,
        q.x,
        q.y,
        q.z,
        sample.gyro.x,
        sample.gyro.y,
        sample.gyro.z,
        sample.accel.x,
        sample.accel.y,
        sample.accel.z,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn order_matches_training_columns() {
        let names: Vec<&str> = FEATURE_ORDER.iter().map(FeatureName::as_str).collect();
        assert_eq!(
            names,
            ["w", "x", "y", "z", "droll", "dpitch", "dyaw", "ax", "ay", "az"]
        );
    }

    #[test]
    fn index_agrees_with_order() {
        for (i, name) in FEATURE_ORDER.iter().enumerate() {
            assert_eq!(name.index(), i, "{name}");
        }
    }

    proptest! {
        #[test]
        fn features_are_laid_out_field_by_field(
            q in prop::array::uniform4(-1.0f64..1.0),
            accel in prop::array::uniform3(-4.0f64..4.0),
            gyro in prop::array::uniform3(-500.0f64..500.0),
        ) {
            let quat = Quaternion::new(q[0], q[1], q[2], q[3]);
            let sample = RawSample::new(accel, gyro);
            let f = build_features(&quat, &sample);
            let v = f.as_array();

            prop_assert_eq!(v[0], quat.w);
            prop_assert_eq!(v[1], quat.x);
            prop_assert_eq!(v[2], quat.y);
            prop_assert_eq!(v[3], quat.z);
            prop_assert_eq!(v[4], gyro[0]);
            prop_assert_eq!(v[5], gyro[1]);
            prop_assert_eq!(v[6], gyro[2]);
            prop_assert_eq!(v[7], accel[0]);
            prop_assert_eq!(v[8], accel[1]);
            prop_assert_eq!(v[9], accel[2]);

            prop_assert_eq!(f.get(FeatureName::DPitch), gyro[1]);
            prop_assert_eq!(f.get(FeatureName::Az), accel[2]);
        }
    }
}
