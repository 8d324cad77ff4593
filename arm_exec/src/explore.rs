//! # Exploration Sampler
//!
//! Random actions and positions within the legal bounds of the arm, used to
//! perturb or reset the arm for exploration-driven learning.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::arm_ctrl::{
    ArmCtrlError, ArmState, Delta, JointAction, JointAngle, JointLimits, SymbolicAction,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Draws random actions and states.
pub struct Explorer<R> {
    rng: R,

    /// Random deltas are drawn from `[-step_limit, step_limit)`.
    ///
    /// Units: degrees
    step_limit: Delta,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Explorer<StdRng> {
    /// Create a reproducible explorer from a seed.
    pub fn from_seed(seed: u64, step_limit: Delta) -> Result<Self, ArmCtrlError> {
        Self::new(StdRng::seed_from_u64(seed), step_limit)
    }
}

impl<R: Rng> Explorer<R> {
    pub fn new(rng: R, step_limit: Delta) -> Result<Self, ArmCtrlError> {
        if step_limit <= 0 {
            return Err(ArmCtrlError::InvalidStepLimit(step_limit));
        }

        Ok(Self { rng, step_limit })
    }

    pub fn step_limit(&self) -> Delta {
        self.step_limit
    }

    /// Draw every joint's delta independently and uniformly from
    /// `[-step_limit, step_limit)`.
    pub fn choose_random_action<const N: usize>(&mut self) -> JointAction<N> {
        let mut deltas = [0; N];

        for d in deltas.iter_mut() {
            *d = self.rng.gen_range(-self.step_limit..self.step_limit);
        }

        JointAction::new(deltas)
    }

    /// Draw one of the two-joint arm's symbolic actions uniformly.
    pub fn choose_random_symbolic_action(&mut self) -> SymbolicAction {
        SymbolicAction::ALL[self.rng.gen_range(0..SymbolicAction::ALL.len())]
    }

    /// Draw every joint's angle independently and uniformly from
    /// `[min, max)`. A joint whose range is a single angle gets that angle.
    pub fn choose_random_state<A: JointAngle, const N: usize>(
        &mut self,
        limits: &JointLimits<A, N>,
    ) -> ArmState<A, N> {
        let mut angles = [A::default(); N];

        for (i, angle) in angles.iter_mut().enumerate() {
            let min = Into::<i64>::into(limits.min(i));
            let max = Into::<i64>::into(limits.max(i));

            *angle = if min < max {
                A::from_i64(self.rng.gen_range(min..max)).unwrap_or_else(|| limits.min(i))
            }
            else {
                limits.min(i)
            };
        }

        ArmState::from_angles(angles)
    }
}
