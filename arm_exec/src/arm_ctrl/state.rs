//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use rand::Rng;
use std::io;

// Internal
use super::{
    Action, ArmCtrlError, ArmState, Delta, JointAction, JointAngle, JointLimits, Params,
    ResetMode, Transition,
};
use crate::{clock::Clock, explore::Explorer, sensing::Sensing, servo_ctrl::JointDriver};
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
///
/// Owns the current and previous configuration of the arm. Only the engine
/// mutates them; callers get copies.
pub struct ArmCtrl<A, D, S, C, const N: usize> {
    pub(crate) params: Params,

    pub(crate) limits: JointLimits<A, N>,

    pub(crate) current: ArmState<A, N>,

    pub(crate) previous: ArmState<A, N>,

    pub(crate) last_action: JointAction<N>,

    pub(crate) report: StatusReport<N>,

    pub(crate) driver: D,

    pub(crate) sensing: S,

    pub(crate) clock: C,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusReport<const N: usize> {
    /// Joints which were limited to their range.
    pub abs_pos_limited: [bool; N],

    /// Joints which wrapped around below zero and were put back on their
    /// minimum.
    pub wrap_corrected: [bool; N],

    /// Joints whose smooth move target was outside their range.
    pub target_limited: [bool; N],

    /// Number of actuator writes which failed.
    pub actuator_faults: usize,

    /// Number of actions applied.
    pub num_steps: usize,

    /// A smooth move stopped on its step cap before reaching the target.
    pub step_cap_reached: bool,
}

/// Outcome of stepping one joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JointStep<A> {
    pub angle: A,
    pub limited: bool,
    pub wrap_corrected: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<const N: usize> Default for StatusReport<N> {
    fn default() -> Self {
        Self {
            abs_pos_limited: [false; N],
            wrap_corrected: [false; N],
            target_limited: [false; N],
            actuator_faults: 0,
            num_steps: 0,
            step_cap_reached: false,
        }
    }
}

impl<const N: usize> StatusReport<N> {
    /// Accumulate the report of a single step into this one.
    pub fn merge(&mut self, step: &StatusReport<N>) {
        for i in 0..N {
            self.abs_pos_limited[i] |= step.abs_pos_limited[i];
            self.wrap_corrected[i] |= step.wrap_corrected[i];
            self.target_limited[i] |= step.target_limited[i];
        }
        self.actuator_faults += step.actuator_faults;
        self.num_steps += step.num_steps;
        self.step_cap_reached |= step.step_cap_reached;
    }
}

impl<A, D, S, C, const N: usize> ArmCtrl<A, D, S, C, N>
where
    A: JointAngle,
    D: JointDriver,
    S: Sensing,
    C: Clock,
{
    /// Create the controller from its parameters.
    ///
    /// The state starts at the middle of every joint's range but nothing is
    /// commanded, call [`ArmCtrl::reset_arm`] to drive the arm there before
    /// applying actions.
    pub fn new(params: Params, driver: D, sensing: S, clock: C) -> Result<Self, ArmCtrlError> {
        let limits = JointLimits::from_slices(&params.joint_min_deg, &params.joint_max_deg)?;

        if params.smooth_rate_limit_deg <= 0 {
            return Err(ArmCtrlError::InvalidRateLimit(params.smooth_rate_limit_deg));
        }

        let home = home_state(&limits, &params);

        Ok(Self {
            params,
            limits,
            current: home,
            previous: home,
            last_action: JointAction::zero(),
            report: StatusReport::default(),
            driver,
            sensing,
            clock,
        })
    }

    /// Apply an action to the arm.
    ///
    /// The action's deltas are added to the current joint angles, the result
    /// is limited to the joint ranges and sent to the servos, and the call
    /// blocks for the settle time. This never fails: illegal positions are
    /// clamped and actuator faults are only reported.
    pub fn apply<T: Action<N>>(&mut self, action: &T) -> StatusReport<N> {
        let mut report = StatusReport::default();

        // Keep track of this for the learner
        self.previous = self.current;

        if let Some(aux) = action.aux() {
            self.current.aux = Some(aux);
        }

        let deltas = action.joint_deltas();

        for i in 0..N {
            let step = step_joint(
                self.current.joint_angles[i],
                deltas[i],
                self.limits.min(i),
                self.limits.max(i),
            );

            if step.wrap_corrected {
                debug!(
                    "Joint {} wrapped below zero ({} {:+}), held at minimum {}",
                    i, self.current.joint_angles[i], deltas[i], step.angle
                );
            }
            else if step.limited {
                debug!("Joint {} limited to {}", i, step.angle);
            }

            self.current.joint_angles[i] = step.angle;
            report.abs_pos_limited[i] = step.limited;
            report.wrap_corrected[i] = step.wrap_corrected;
        }

        self.last_action = JointAction::new(deltas);
        report.num_steps = 1;

        trace!("ArmCtrl apply {:?}: {} -> {}", deltas, self.previous, self.current);

        self.emit(&mut report);

        // Sense while the joints are actually moving
        if self.params.sense_after_apply {
            self.sensing.update_sensation();
        }

        self.clock.delay(self.params.settle_time());

        self.report = report;
        report
    }

    /// Return the arm to the middle of every joint's range.
    ///
    /// Both the current and previous state are the middle position
    /// afterwards, with the auxiliary output off.
    pub fn reset_arm(&mut self) -> StatusReport<N> {
        let home = home_state(&self.limits, &self.params);

        info!("Resetting arm to {}", home);

        let mut report = match self.params.reset_mode {
            ResetMode::Snap => {
                let mut report = StatusReport::default();
                self.current = home;
                self.emit(&mut report);
                report
            }
            ResetMode::Smooth => {
                let mut report = self.move_smoothly_to(&home);
                self.current.aux = home.aux;
                self.emit_aux(&mut report);
                report
            }
        };

        // Could have to move quite a bit to reset
        self.clock.delay(self.params.reset_settle_time());

        if self.current != home {
            warn!("Arm reset ended at {}, expected {}", self.current, home);
            report.step_cap_reached = true;
        }

        self.current = home;
        self.previous = home;
        self.last_action = JointAction::zero();

        self.report = report;
        report
    }

    /// Move the arm smoothly to a random legal position.
    ///
    /// The previous state is set to the resulting position so that the next
    /// transition starts from it.
    pub fn reset_arm_to_random_position<R: Rng>(
        &mut self,
        explorer: &mut Explorer<R>,
    ) -> StatusReport<N> {
        let mut target = explorer.choose_random_state(&self.limits);
        target.aux = self.current.aux;

        info!("Resetting arm to random position {}", target);

        let report = self.move_smoothly_to(&target);

        self.clock.delay(self.params.reset_settle_time());

        self.previous = self.current;
        self.last_action = JointAction::zero();

        self.report = report;
        report
    }

    /// Write the current state as one line of whitespace separated integers.
    pub fn log_arm_state<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.current)
    }

    /// The state of the arm.
    pub fn current_state(&self) -> ArmState<A, N> {
        self.current
    }

    /// The state of the arm before the last action.
    pub fn previous_state(&self) -> ArmState<A, N> {
        self.previous
    }

    /// The last action and the states either side of it.
    pub fn transition(&self) -> Transition<A, N> {
        Transition {
            previous: self.previous,
            action: self.last_action,
            current: self.current,
        }
    }

    pub fn limits(&self) -> &JointLimits<A, N> {
        &self.limits
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Report of the last operation.
    pub fn report(&self) -> &StatusReport<N> {
        &self.report
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn sensing(&self) -> &S {
        &self.sensing
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Send the current state to the servos.
    fn emit(&mut self, report: &mut StatusReport<N>) {
        // If you get a lot of servo jitter, it's likely because the power
        // supply can't handle the current spike of all joints moving at once.
        for (joint, angle) in self.current.joint_angles.iter().enumerate() {
            if let Err(e) = self.driver.set_angle(joint, Into::<f64>::into(*angle)) {
                warn!("Could not command joint {} to {}: {}", joint, angle, e);
                report.actuator_faults += 1;
            }
        }

        self.emit_aux(report);
    }

    fn emit_aux(&mut self, report: &mut StatusReport<N>) {
        if let Some(aux) = self.current.aux {
            if let Err(e) = self.driver.set_aux(aux) {
                warn!("Could not set the auxiliary output: {}", e);
                report.actuator_faults += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Add a delta to one joint and limit the result to `[min, max]`.
///
/// With unsigned storage a negative delta taken from an angle near zero wraps
/// around to a large value. That shows up as a result above `max` from a
/// negative delta, which is corrected to `min` before the general clamp
/// would otherwise put the joint on its maximum.
pub fn step_joint<A: JointAngle>(angle: A, delta: Delta, min: A, max: A) -> JointStep<A> {
    let raw = angle.offset(delta);

    if A::WRAPS && delta < 0 && raw > max {
        return JointStep {
            angle: min,
            limited: true,
            wrap_corrected: true,
        };
    }

    let clamped = maths::clamp(raw, min, max);

    JointStep {
        angle: clamped,
        limited: clamped != raw,
        wrap_corrected: false,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn home_state<A: JointAngle, const N: usize>(
    limits: &JointLimits<A, N>,
    params: &Params,
) -> ArmState<A, N> {
    ArmState {
        joint_angles: limits.mid_range(),
        aux: if params.aux_output { Some(false) } else { None },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        arm_ctrl::SymbolicAction,
        clock::SimClock,
        sensing::{NoSensing, SensationCounter},
        servo_ctrl::{sim::SimServos, ServoError},
    };
    use std::{cell::RefCell, rc::Rc, time::Duration};

    type TwoJointArm = ArmCtrl<i16, SimServos, NoSensing, SimClock, 2>;
    type SixJointArm = ArmCtrl<u16, SimServos, SensationCounter, SimClock, 6>;
    type OneJointArm = ArmCtrl<u16, SimServos, SensationCounter, SimClock, 1>;

    fn two_joint_arm() -> TwoJointArm {
        ArmCtrl::new(Params::two_joint(), SimServos::new(2), NoSensing, SimClock::default())
            .unwrap()
    }

    fn six_joint_arm() -> SixJointArm {
        ArmCtrl::new(
            Params::six_joint(),
            SimServos::new(6),
            SensationCounter::default(),
            SimClock::default(),
        )
        .unwrap()
    }

    fn one_joint_arm() -> OneJointArm {
        let params = Params {
            joint_min_deg: vec![10],
            joint_max_deg: vec![170],
            ..Params::six_joint()
        };

        ArmCtrl::new(
            params,
            SimServos::new(1),
            SensationCounter::default(),
            SimClock::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_two_joint_scenario() {
        let mut arm = two_joint_arm();
        arm.current = ArmState {
            joint_angles: [10, 10],
            aux: Some(false),
        };

        let report = arm.apply(&SymbolicAction::RightStayOff);
        assert_eq!(
            arm.current_state(),
            ArmState {
                joint_angles: [20, 10],
                aux: Some(false)
            }
        );
        assert_eq!(report.abs_pos_limited, [false, false]);
        assert_eq!(arm.driver().angle_deg(0), Some(20.0));
        assert_eq!(arm.driver().angle_deg(1), Some(10.0));
        assert_eq!(arm.driver().aux(), Some(false));

        // Base is already at its maximum
        arm.current.joint_angles[0] = 170;
        let report = arm.apply(&SymbolicAction::RightStayOn);
        assert_eq!(arm.current_state().joint_angles, [170, 10]);
        assert_eq!(arm.current_state().aux, Some(true));
        assert_eq!(report.abs_pos_limited, [true, false]);
        assert_eq!(report.wrap_corrected, [false, false]);
        assert_eq!(arm.driver().aux(), Some(true));
    }

    #[test]
    fn test_wrap_correction_scenario() {
        let mut arm = one_joint_arm();

        arm.current.joint_angles = [15];
        arm.apply(&JointAction::new([-10]));
        assert_eq!(arm.current_state().joint_angles, [10]);

        // From the minimum the unsigned angle wraps to 65526, which must be
        // put back on the minimum rather than clamped to the maximum
        let report = arm.apply(&JointAction::new([-20]));
        assert_eq!(arm.current_state().joint_angles, [10]);
        assert_eq!(report.wrap_corrected, [true]);
        assert_eq!(report.abs_pos_limited, [true]);
        assert_eq!(arm.driver().angle_deg(0), Some(10.0));
    }

    #[test]
    fn test_step_joint() {
        assert_eq!(
            step_joint(10u16, -20, 10, 170),
            JointStep { angle: 10, limited: true, wrap_corrected: true }
        );
        assert_eq!(
            step_joint(10u16, -10, 10, 170),
            JointStep { angle: 10, limited: true, wrap_corrected: false }
        );
        assert_eq!(
            step_joint(165u16, 10, 10, 170),
            JointStep { angle: 170, limited: true, wrap_corrected: false }
        );
        assert_eq!(
            step_joint(90u16, -1, 10, 170),
            JointStep { angle: 89, limited: false, wrap_corrected: false }
        );

        // Stepping past the top of unsigned storage ends on the maximum
        assert_eq!(
            step_joint(65530u16, 10, 100, u16::MAX),
            JointStep { angle: u16::MAX, limited: false, wrap_corrected: false }
        );
        assert_eq!(
            step_joint(65530u16, 10, 100, 65000),
            JointStep { angle: 65000, limited: true, wrap_corrected: false }
        );

        // Signed angles go below zero without wrapping and are clamped
        assert_eq!(
            step_joint(10i16, -20, 10, 170),
            JointStep { angle: 10, limited: true, wrap_corrected: false }
        );
    }

    #[test]
    fn test_clamp_invariant_symbolic() {
        let mut arm = two_joint_arm();

        for base in (10..=170).step_by(10) {
            for elbow in (10..=170).step_by(10) {
                for action in SymbolicAction::ALL.iter() {
                    arm.current.joint_angles = [base, elbow];
                    arm.apply(action);

                    assert!(
                        arm.limits().contains(&arm.current_state().joint_angles),
                        "{:?} from [{}, {}] gave {}",
                        action,
                        base,
                        elbow,
                        arm.current_state()
                    );
                }
            }
        }
    }

    #[test]
    fn test_clamp_invariant_deltas() {
        let mut arm = six_joint_arm();
        let mut explorer = Explorer::from_seed(11, 200).unwrap();

        for _ in 0..500 {
            let action: JointAction<6> = explorer.choose_random_action();
            let before = arm.current_state();
            arm.apply(&action);

            let after = arm.current_state();
            assert!(
                arm.limits().contains(&after.joint_angles),
                "{:?} from {} gave {}",
                action,
                before,
                after
            );
        }
    }

    #[test]
    fn test_snapshot() {
        let mut arm = six_joint_arm();
        let mut explorer = Explorer::from_seed(5, 20).unwrap();

        for _ in 0..100 {
            let before = arm.current_state();
            let action: JointAction<6> = explorer.choose_random_action();
            arm.apply(&action);

            assert_eq!(arm.previous_state(), before);

            let transition = arm.transition();
            assert_eq!(transition.previous, before);
            assert_eq!(transition.action, action);
            assert_eq!(transition.current, arm.current_state());

            for i in 0..6 {
                let expected = step_joint(
                    before.joint_angles[i],
                    action.deltas[i],
                    arm.limits().min(i),
                    arm.limits().max(i),
                );
                assert_eq!(arm.current_state().joint_angles[i], expected.angle);
            }
        }
    }

    #[test]
    fn test_apply_sensing_and_settle() {
        let mut arm = six_joint_arm();
        arm.apply(&JointAction::new([1, 0, 0, 0, 0, -1]));

        assert_eq!(arm.sensing().num_refreshes, 1);
        assert_eq!(arm.clock().elapsed(), Duration::from_millis(150));
        assert_eq!(arm.driver().num_writes(), 6);

        // The two-joint arm has no sensors, but drives its LED
        let mut arm = two_joint_arm();
        arm.apply(&SymbolicAction::StayLeftOn);
        assert_eq!(arm.clock().elapsed(), Duration::from_millis(200));
        assert_eq!(arm.driver().num_writes(), 3);
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Write(usize),
        Aux(bool),
        Sense,
        Delay(Duration),
    }

    struct EventServos(Rc<RefCell<Vec<Event>>>);
    struct EventClock(Rc<RefCell<Vec<Event>>>);

    impl JointDriver for EventServos {
        fn set_angle(&mut self, joint: usize, _angle_deg: f64) -> Result<(), ServoError> {
            self.0.borrow_mut().push(Event::Write(joint));
            Ok(())
        }

        fn set_aux(&mut self, on: bool) -> Result<(), ServoError> {
            self.0.borrow_mut().push(Event::Aux(on));
            Ok(())
        }
    }

    impl Clock for EventClock {
        fn delay(&mut self, duration: Duration) {
            self.0.borrow_mut().push(Event::Delay(duration));
        }
    }

    #[test]
    fn test_emit_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sense_events = events.clone();

        let mut arm: ArmCtrl<u16, _, _, _, 6> = ArmCtrl::new(
            Params::six_joint(),
            EventServos(events.clone()),
            move || sense_events.borrow_mut().push(Event::Sense),
            EventClock(events.clone()),
        )
        .unwrap();

        arm.apply(&JointAction::new([5, 5, 5, 5, 5, 5]));

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Write(0),
                Event::Write(1),
                Event::Write(2),
                Event::Write(3),
                Event::Write(4),
                Event::Write(5),
                Event::Sense,
                Event::Delay(Duration::from_millis(150)),
            ]
        );
    }

    #[test]
    fn test_aux_written_after_joints() {
        let events = Rc::new(RefCell::new(Vec::new()));

        let mut arm: ArmCtrl<i16, _, _, _, 2> = ArmCtrl::new(
            Params::two_joint(),
            EventServos(events.clone()),
            NoSensing,
            EventClock(events.clone()),
        )
        .unwrap();

        arm.apply(&SymbolicAction::LeftRightOn);

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Write(0),
                Event::Write(1),
                Event::Aux(true),
                Event::Delay(Duration::from_millis(200)),
            ]
        );
    }

    #[test]
    fn test_apply_is_total_under_actuator_faults() {
        let mut arm = six_joint_arm();
        arm.driver_mut().set_faulty_joint(Some(2));

        let report = arm.apply(&JointAction::new([1, 1, 1, 1, 1, 1]));

        assert_eq!(report.actuator_faults, 1);
        assert_eq!(arm.current_state().joint_angles, [91, 91, 76, 76, 76, 116]);
        assert_eq!(arm.report(), &report);
    }

    #[test]
    fn test_reset_snap() {
        let mut arm = two_joint_arm();
        arm.apply(&SymbolicAction::RightRightOn);
        arm.apply(&SymbolicAction::RightRightOn);

        let before_reset = arm.clock().elapsed();
        arm.reset_arm();

        let home = ArmState {
            joint_angles: [90, 90],
            aux: Some(false),
        };
        assert_eq!(arm.current_state(), home);
        assert_eq!(arm.previous_state(), home);
        assert!(arm.transition().action.is_zero());
        assert_eq!(arm.driver().angle_deg(0), Some(90.0));
        assert_eq!(arm.driver().aux(), Some(false));
        assert_eq!(arm.clock().elapsed() - before_reset, Duration::from_millis(100));
    }

    #[test]
    fn test_reset_smooth() {
        let mut arm = six_joint_arm();
        arm.current.joint_angles = [10, 150, 100, 50, 60, 130];

        let report = arm.reset_arm();

        let home = ArmState::from_angles([90, 90, 75, 75, 75, 115]);
        assert_eq!(arm.current_state(), home);
        assert_eq!(arm.previous_state(), home);
        assert_eq!(report.num_steps, 80);
        assert!(!report.step_cap_reached);
        assert_eq!(arm.sensing().num_refreshes, 80);
        assert_eq!(arm.driver().angle_deg(5), Some(115.0));
    }

    #[test]
    fn test_reset_to_random_position() {
        let mut arm = six_joint_arm();
        let mut explorer = Explorer::from_seed(9, 20).unwrap();

        for _ in 0..5 {
            let report = arm.reset_arm_to_random_position(&mut explorer);

            assert!(!report.step_cap_reached);
            assert_eq!(arm.previous_state(), arm.current_state());
            for i in 0..6 {
                let a = arm.current_state().joint_angles[i];
                assert!(a >= arm.limits().min(i) && a < arm.limits().max(i));
            }
        }
    }

    #[test]
    fn test_log_arm_state() {
        let mut out = Vec::new();

        let arm = two_joint_arm();
        arm.log_arm_state(&mut out).unwrap();

        let arm = six_joint_arm();
        arm.log_arm_state(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "90 90 0\n90 90 75 75 75 115\n"
        );
    }

    #[test]
    fn test_invalid_params() {
        let result: Result<ArmCtrl<i16, _, _, _, 2>, _> = ArmCtrl::new(
            Params::six_joint(),
            SimServos::new(2),
            NoSensing,
            SimClock::default(),
        );
        assert!(matches!(
            result,
            Err(ArmCtrlError::JointCountMismatch { expected: 2, found: 6 })
        ));

        let params = Params {
            smooth_rate_limit_deg: 0,
            ..Params::two_joint()
        };
        let result: Result<ArmCtrl<i16, _, _, _, 2>, _> =
            ArmCtrl::new(params, SimServos::new(2), NoSensing, SimClock::default());
        assert!(matches!(result, Err(ArmCtrlError::InvalidRateLimit(0))));
    }
}
