//! Arm state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::fmt;

// Internal
use super::{JointAction, JointAngle};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration of the arm: the angle of every joint, and on arms with an
/// auxiliary output the state of that output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmState<A, const N: usize> {
    /// Angle of each joint.
    ///
    /// Units: degrees
    pub joint_angles: [A; N],

    /// State of the auxiliary digital output, `None` on arms without one.
    pub aux: Option<bool>,
}

/// One step of experience for the learner: the state before an action, the
/// joint deltas that were commanded, and the state that resulted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition<A, const N: usize> {
    pub previous: ArmState<A, N>,
    pub action: JointAction<N>,
    pub current: ArmState<A, N>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointAngle, const N: usize> ArmState<A, N> {
    /// State with the given joint angles and no auxiliary output.
    pub fn from_angles(joint_angles: [A; N]) -> Self {
        Self {
            joint_angles,
            aux: None,
        }
    }

    /// Largest absolute per-joint distance to another state.
    pub fn max_distance_to(&self, other: &Self) -> u32 {
        self.joint_angles
            .iter()
            .zip(other.joint_angles.iter())
            .map(|(a, b)| (a.delta_to(*b) as i32).abs() as u32)
            .max()
            .unwrap_or(0)
    }
}

impl<A: JointAngle, const N: usize> Default for ArmState<A, N> {
    fn default() -> Self {
        Self::from_angles([A::default(); N])
    }
}

/// Joint angles separated by spaces, followed by the auxiliary bit as `0` or
/// `1` if the arm has one.
impl<A: JointAngle, const N: usize> fmt::Display for ArmState<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, angle) in self.joint_angles.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", angle)?;
        }

        if let Some(aux) = self.aux {
            write!(f, " {}", aux as u8)?;
        }

        Ok(())
    }
}

// Serde only implements arrays up to fixed lengths, so serialise the angles
// as a slice.
impl<A: Serialize, const N: usize> Serialize for ArmState<A, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ArmState", 2)?;
        state.serialize_field("joint_angles", &self.joint_angles[..])?;
        state.serialize_field("aux", &self.aux)?;
        state.end()
    }
}
