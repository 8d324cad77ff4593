//! Arm control module
//!
//! Joint-space actuation of the arm: the joint limits table, the arm state
//! kept for the learner, the action model, and the engine which applies
//! actions to the state and drives the servos.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod action;
mod angle;
mod arm_state;
mod limits;
mod params;
mod smooth;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use action::*;
pub use angle::*;
pub use arm_state::*;
pub use limits::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the two-joint (base and elbow) arm.
pub const NUM_TWO_JOINT_AXES: usize = 2;

/// The number of joints on the six-joint arm.
pub const NUM_SIX_JOINT_AXES: usize = 6;

/// Size of one discrete symbolic step on the two-joint arm.
///
/// Units: degrees
pub const DISCRETE_STEP_DEG: Delta = 10;

/// Default per-joint rate limit of the smooth interpolation controller.
///
/// Units: degrees/step
pub const SMOOTH_RATE_LIMIT_DEG: Delta = 1;

// ---------------------------------------------------------------------------
// TYPE ALIASES
// ---------------------------------------------------------------------------

/// Base and elbow angles, stored signed so that a step below zero cannot wrap.
pub type TwoJointState = ArmState<i16, NUM_TWO_JOINT_AXES>;

/// Six joint angles, stored unsigned as the servo library expects.
pub type SixJointState = ArmState<u16, NUM_SIX_JOINT_AXES>;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while configuring ArmCtrl.
///
/// Actuation itself never fails, illegal positions are always clamped.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ArmCtrlError {
    #[error("Expected limits for {expected} joints but found {found}")]
    JointCountMismatch { expected: usize, found: usize },

    #[error("Joint {joint} has a minimum ({min}) greater than its maximum ({max})")]
    InvertedLimits { joint: usize, min: i64, max: i64 },

    #[error("Limit {value} of joint {joint} cannot be stored as a joint angle")]
    LimitNotRepresentable { joint: usize, value: i64 },

    #[error("The smooth interpolation rate limit must be positive, found {0}")]
    InvalidRateLimit(Delta),

    #[error("The exploration step limit must be positive, found {0}")]
    InvalidStepLimit(Delta),
}
