//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Internal
use super::{Delta, SMOOTH_RATE_LIMIT_DEG};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- CAPABILITIES ----
    /// Minimum absolute position of each joint.
    ///
    /// Units: degrees
    pub joint_min_deg: Vec<i64>,

    /// Maximum absolute position of each joint.
    ///
    /// Units: degrees
    pub joint_max_deg: Vec<i64>,

    // ---- TIMING ----
    /// Time given to the servos to reach a new demand after each action.
    ///
    /// Units: milliseconds
    pub settle_time_ms: u64,

    /// Time to wait once a reset has been commanded.
    ///
    /// Units: milliseconds
    pub reset_settle_time_ms: u64,

    /// Pause between the steps of a smooth move, in addition to the settle
    /// time of each step.
    ///
    /// Units: milliseconds
    #[serde(default)]
    pub smooth_step_delay_ms: u64,

    // ---- SMOOTH MOVES ----
    /// Maximum change of any joint in one step of a smooth move.
    ///
    /// Units: degrees/step
    #[serde(default = "default_smooth_rate_limit")]
    pub smooth_rate_limit_deg: Delta,

    /// Cap on the number of steps a smooth move may take.
    pub max_smooth_steps: usize,

    // ---- BEHAVIOUR ----
    /// How the arm gets to its reset position.
    pub reset_mode: ResetMode,

    /// Refresh the sensors straight after commanding the servos, while the
    /// joints are moving.
    #[serde(default)]
    pub sense_after_apply: bool,

    /// The arm carries an auxiliary digital output which actions drive.
    #[serde(default)]
    pub aux_output: bool,

    /// Largest delta the exploration sampler draws for any joint.
    ///
    /// Units: degrees
    pub explore_step_limit_deg: Delta,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The way the arm is driven to its reset position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Command the reset position directly and wait for the servos.
    Snap,

    /// Drive to the reset position with the smooth interpolation controller.
    Smooth,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Parameters of the two-joint (base and elbow) arm with an LED on the
    /// auxiliary output.
    pub fn two_joint() -> Self {
        Self {
            joint_min_deg: vec![10, 10],
            joint_max_deg: vec![170, 170],
            settle_time_ms: 200,
            reset_settle_time_ms: 100,
            smooth_step_delay_ms: 0,
            smooth_rate_limit_deg: SMOOTH_RATE_LIMIT_DEG,
            max_smooth_steps: 256,
            reset_mode: ResetMode::Snap,
            sense_after_apply: false,
            aux_output: true,
            explore_step_limit_deg: 10,
        }
    }

    /// Parameters of the six-joint arm.
    pub fn six_joint() -> Self {
        Self {
            joint_min_deg: vec![10, 30, 50, 50, 50, 100],
            joint_max_deg: vec![170, 150, 100, 100, 100, 130],
            settle_time_ms: 150,
            reset_settle_time_ms: 700,
            smooth_step_delay_ms: 15,
            smooth_rate_limit_deg: SMOOTH_RATE_LIMIT_DEG,
            max_smooth_steps: 256,
            reset_mode: ResetMode::Smooth,
            sense_after_apply: true,
            aux_output: false,
            explore_step_limit_deg: 20,
        }
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_millis(self.settle_time_ms)
    }

    pub fn reset_settle_time(&self) -> Duration {
        Duration::from_millis(self.reset_settle_time_ms)
    }

    pub fn smooth_step_delay(&self) -> Duration {
        Duration::from_millis(self.smooth_step_delay_ms)
    }
}

fn default_smooth_rate_limit() -> Delta {
    SMOOTH_RATE_LIMIT_DEG
}
