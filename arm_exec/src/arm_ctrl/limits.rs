//! Joint limits table

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths;

// Internal
use super::{ArmCtrlError, JointAngle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Legal angle range of every joint of the arm.
///
/// Fixed once constructed. Every range satisfies `min <= max`, which is
/// checked on construction. Indexing a joint outside `[0, N)` is a
/// programming error and panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointLimits<A, const N: usize> {
    min: [A; N],
    max: [A; N],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointAngle, const N: usize> JointLimits<A, N> {
    /// Create a new limits table from the per-joint minimums and maximums.
    pub fn new(min: [A; N], max: [A; N]) -> Result<Self, ArmCtrlError> {
        for joint in 0..N {
            if min[joint] > max[joint] {
                return Err(ArmCtrlError::InvertedLimits {
                    joint,
                    min: Into::<i64>::into(min[joint]),
                    max: Into::<i64>::into(max[joint]),
                });
            }
        }

        Ok(Self { min, max })
    }

    /// Build the table from limits loaded from a parameter file.
    ///
    /// The number of limits must match the joint count of the arm and every
    /// limit must fit in the angle storage type.
    pub fn from_slices(min: &[i64], max: &[i64]) -> Result<Self, ArmCtrlError> {
        Self::new(to_angles(min)?, to_angles(max)?)
    }

    /// Minimum angle of the given joint.
    pub fn min(&self, joint: usize) -> A {
        self.min[joint]
    }

    /// Maximum angle of the given joint.
    pub fn max(&self, joint: usize) -> A {
        self.max[joint]
    }

    /// Limit an angle to the range of the given joint.
    pub fn clamp(&self, joint: usize, angle: A) -> A {
        maths::clamp(angle, self.min[joint], self.max[joint])
    }

    /// Returns true if every angle lies within its joint's range.
    pub fn contains(&self, angles: &[A; N]) -> bool {
        angles
            .iter()
            .enumerate()
            .all(|(i, a)| !maths::is_outside(a, &self.min[i], &self.max[i]))
    }

    /// Limit all angles, returning which joints had to be limited.
    pub fn clamp_all(&self, angles: &[A; N]) -> ([A; N], [bool; N]) {
        let mut clamped = *angles;
        let mut limited = [false; N];

        for i in 0..N {
            clamped[i] = self.clamp(i, angles[i]);
            limited[i] = clamped[i] != angles[i];
        }

        (clamped, limited)
    }

    /// The middle of every joint's range.
    pub fn mid_range(&self) -> [A; N] {
        let mut mid = [A::default(); N];

        for (i, m) in mid.iter_mut().enumerate() {
            *m = A::mid_range(self.min[i], self.max[i]);
        }

        mid
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn to_angles<A: JointAngle, const N: usize>(values: &[i64]) -> Result<[A; N], ArmCtrlError> {
    if values.len() != N {
        return Err(ArmCtrlError::JointCountMismatch {
            expected: N,
            found: values.len(),
        });
    }

    let mut angles = [A::default(); N];

    for (joint, (angle, &value)) in angles.iter_mut().zip(values).enumerate() {
        *angle = A::from_i64(value)
            .ok_or(ArmCtrlError::LimitNotRepresentable { joint, value })?;
    }

    Ok(angles)
}
