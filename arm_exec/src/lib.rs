//! # Arm library.
//!
//! Joint-space actuation of a servo driven arm. The library is shared by the
//! `arm_exec` executable and the benchmarks.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Arm control - applies actions to the arm state and drives the joints
pub mod arm_ctrl;

/// Clocks used for settle delays
pub mod clock;

/// Exploration sampler - random actions and positions for learning
pub mod explore;

/// Parameters for the arm executable
pub mod params;

/// Sensing subsystem interface
pub mod sensing;

/// Servo control - drives the physical or simulated joints
pub mod servo_ctrl;
