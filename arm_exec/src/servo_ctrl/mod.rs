//! # Servo Controller Module
//!
//! This module provides a unified joint control interface which can abstract over different
//! types of servo driver boards, or over a simulated arm.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// [`JointDriver`] implementation which keeps the demanded angles in memory.
pub mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};
use util::maths;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {

    /// The type that the underlying driver uses for channel identification
    type Channel: Copy;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: Self::Channel, duty_cycle: f64) -> Result<(), ServoError>;

}

/// The actuator interface used by the arm engine.
pub trait JointDriver {

    /// Command a joint to an absolute angle.
    ///
    /// ## Arguments
    /// - `joint` - Index of the joint, in `[0, N)` for an arm with `N` joints
    /// - `angle_deg` - The demanded angle in degrees
    fn set_angle(&mut self, joint: usize, angle_deg: f64) -> Result<(), ServoError>;

    /// Drive the auxiliary digital output.
    fn set_aux(&mut self, on: bool) -> Result<(), ServoError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives positional hobby servos through a PWM [`ServoDriver`].
pub struct PwmServos<D>
where
    D: ServoDriver
{
    driver: D,

    config: ControllerConfig<D::Channel>,
}

/// Configuration of all servos on one board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ControllerConfig<C> {
    /// Period of the PWM signal.
    ///
    /// Units: milliseconds
    pub pwm_period_ms: f64,

    /// Servo configuration of each joint, indexed by joint.
    pub joints: Vec<ServoConfig<C>>,

    /// Channel driving the auxiliary output, if there is one.
    pub aux_channel: Option<C>,
}

/// Calibration of one positional servo.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ServoConfig<C> {
    pub channel: C,

    /// Angle reached with the shortest pulse.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Angle reached with the longest pulse.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    /// Units: milliseconds
    pub min_pulse_ms: f64,

    /// Units: milliseconds
    pub max_pulse_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle,

    #[error("Channel {0} does not exist on this driver")]
    InvalidChannel(u8),

    #[error("No servo is configured for joint {0}")]
    UnknownJoint(usize),

    #[error("No auxiliary output is configured")]
    NoAuxOutput,

    #[error("Prescale {0} is below the minimum of 3")]
    InvalidPrescale(u8),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D> PwmServos<D>
where
    D: ServoDriver
{
    /// Create a new servo controller.
    ///
    /// ## Arguments
    /// - `driver` - An initialised [`ServoDriver`] board
    /// - `config` - A configuration for the servos managed by this controller
    pub fn new(driver: D, config: ControllerConfig<D::Channel>) -> Self {
        Self { driver, config }
    }

    /// Get a reference to the underlying driver board.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Duty cycle which holds the servo of a joint at the given angle.
    ///
    /// Angles outside the servo's calibrated range are limited to it.
    pub fn duty_cycle_for(&self, joint: usize, angle_deg: f64) -> Result<f64, ServoError> {
        let servo = self
            .config
            .joints
            .get(joint)
            .ok_or(ServoError::UnknownJoint(joint))?;

        let angle = maths::clamp(angle_deg, servo.min_angle_deg, servo.max_angle_deg);
        if angle != angle_deg {
            debug!(
                "Joint {} demand of {} deg is outside the servo range, limited to {} deg",
                joint, angle_deg, angle
            );
        }

        let pulse_ms = maths::lin_map(
            (servo.min_angle_deg, servo.max_angle_deg),
            (servo.min_pulse_ms, servo.max_pulse_ms),
            angle,
        );

        Ok(pulse_ms / self.config.pwm_period_ms)
    }
}

impl<D> JointDriver for PwmServos<D>
where
    D: ServoDriver
{
    fn set_angle(&mut self, joint: usize, angle_deg: f64) -> Result<(), ServoError> {
        let duty_cycle = self.duty_cycle_for(joint, angle_deg)?;
        let channel = self.config.joints[joint].channel;

        self.driver.set_duty_cycle(channel, duty_cycle)
    }

    fn set_aux(&mut self, on: bool) -> Result<(), ServoError> {
        let channel = self.config.aux_channel.ok_or(ServoError::NoAuxOutput)?;

        self.driver.set_duty_cycle(channel, if on { 1.0 } else { 0.0 })
    }
}

impl<J: JointDriver + ?Sized> JointDriver for Box<J> {
    fn set_angle(&mut self, joint: usize, angle_deg: f64) -> Result<(), ServoError> {
        (**self).set_angle(joint, angle_deg)
    }

    fn set_aux(&mut self, on: bool) -> Result<(), ServoError> {
        (**self).set_aux(on)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Driver board which records every duty cycle it is given.
    #[derive(Default)]
    struct RecordingBoard {
        duty_cycles: Vec<(u8, f64)>,
    }

    impl ServoDriver for RecordingBoard {
        type Channel = u8;

        fn set_duty_cycle(&mut self, channel: u8, duty_cycle: f64) -> Result<(), ServoError> {
            if duty_cycle < 0.0 || duty_cycle > 1.0 {
                return Err(ServoError::InvalidDutyCycle);
            }
            self.duty_cycles.push((channel, duty_cycle));
            Ok(())
        }
    }

    fn config() -> ControllerConfig<u8> {
        let servo = ServoConfig {
            channel: 0,
            min_angle_deg: 0.0,
            max_angle_deg: 180.0,
            min_pulse_ms: 0.5,
            max_pulse_ms: 2.5,
        };

        ControllerConfig {
            pwm_period_ms: 20.0,
            joints: vec![servo, ServoConfig { channel: 3, ..servo }],
            aux_channel: Some(15),
        }
    }

    #[test]
    fn test_angle_to_duty_cycle() {
        let mut servos = PwmServos::new(RecordingBoard::default(), config());

        servos.set_angle(0, 90.0).unwrap();
        servos.set_angle(1, 0.0).unwrap();
        servos.set_angle(1, 400.0).unwrap();
        servos.set_aux(true).unwrap();

        assert_eq!(
            servos.driver().duty_cycles,
            vec![(0, 0.075), (3, 0.025), (3, 0.125), (15, 1.0)]
        );
    }

    #[test]
    fn test_unconfigured_outputs() {
        let mut cfg = config();
        cfg.aux_channel = None;
        let mut servos = PwmServos::new(RecordingBoard::default(), cfg);

        assert_eq!(servos.set_angle(2, 90.0), Err(ServoError::UnknownJoint(2)));
        assert_eq!(servos.set_aux(false), Err(ServoError::NoAuxOutput));
        assert!(servos.driver().duty_cycles.is_empty());
    }
}
