//! Smooth interpolation towards a target configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};

// Internal imports
use super::*;
use crate::{clock::Clock, sensing::Sensing, servo_ctrl::JointDriver};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A, D, S, C, const N: usize> ArmCtrl<A, D, S, C, N>
where
    A: JointAngle,
    D: JointDriver,
    S: Sensing,
    C: Clock,
{
    /// Drive the arm to `target` without moving any joint more than the rate
    /// limit per step.
    ///
    /// Each step applies the rate limited difference to the target as one
    /// action, then pauses for the smooth step delay. The move ends as soon
    /// as no joint needs to move, or after `max_smooth_steps` steps. Targets
    /// outside the joint ranges are first limited to them, so a legal target
    /// is reached in at most `max(|target - start|)` steps.
    ///
    /// The auxiliary output of `target` is ignored.
    pub fn move_smoothly_to(&mut self, target: &ArmState<A, N>) -> StatusReport<N> {
        let mut report = StatusReport::default();

        let (target_angles, limited) = self.limits.clamp_all(&target.joint_angles);
        if limited.iter().any(|l| *l) {
            debug!(
                "Smooth move target {} limited to {}",
                target,
                ArmState::from_angles(target_angles)
            );
        }
        report.target_limited = limited;

        debug!(
            "Smooth move from {} to {}",
            self.current,
            ArmState::from_angles(target_angles)
        );

        for _ in 0..self.params.max_smooth_steps {
            let action = self.next_smooth_action(&target_angles);

            if action.is_zero() {
                break;
            }

            let step_report = self.apply(&action);
            report.merge(&step_report);

            self.clock.delay(self.params.smooth_step_delay());
        }

        if !self.next_smooth_action(&target_angles).is_zero() {
            warn!(
                "Smooth move stopped after {} steps at {}, short of its target",
                report.num_steps, self.current
            );
            report.step_cap_reached = true;
        }
        else {
            debug!("Smooth move complete in {} steps", report.num_steps);
        }

        self.report = report;
        report
    }

    /// The next step of a smooth move towards the target angles.
    pub fn next_smooth_action(&self, target_angles: &[A; N]) -> JointAction<N> {
        action_between(&self.current, &ArmState::from_angles(*target_angles))
            .rate_limited(self.params.smooth_rate_limit_deg)
    }
}
