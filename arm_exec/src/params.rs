//! # Arm Executable Parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{arm_ctrl, servo_ctrl::ControllerConfig};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of one arm variant, as loaded from `two_joint.toml` or `six_joint.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArmExecParams {

    /// Arm control parameters
    pub arm: arm_ctrl::Params,

    /// Servo calibration, used when driving real hardware
    pub servos: ControllerConfig<u8>,

    /// Servo driver board
    pub board: BoardParams,
}

/// Location of the servo driver board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoardParams {

    /// Number of the I2C bus the board is on
    pub i2c_bus: u8,

    /// I2C address of the board
    pub address: u8,

    /// PWM frequency prescaler, must match `servos.pwm_period_ms`
    pub prescale: u8,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params_parse() {
        let two: ArmExecParams =
            util::params::from_str(include_str!("../../params/two_joint.toml")).unwrap();
        assert_eq!(two.arm, arm_ctrl::Params::two_joint());
        assert_eq!(two.servos.joints.len(), arm_ctrl::NUM_TWO_JOINT_AXES);
        assert!(two.servos.aux_channel.is_some());

        let six: ArmExecParams =
            util::params::from_str(include_str!("../../params/six_joint.toml")).unwrap();
        assert_eq!(six.arm, arm_ctrl::Params::six_joint());
        assert_eq!(six.servos.joints.len(), arm_ctrl::NUM_SIX_JOINT_AXES);
        assert_eq!(six.servos.pwm_period_ms, 20.0);
        assert_eq!(six.board.prescale, 121);
    }
}
