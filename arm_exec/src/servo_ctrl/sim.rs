//! Simulated servos

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{JointDriver, ServoError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Servos which reach every demand instantly.
///
/// Keeps the last demanded angle of every joint and the auxiliary output so
/// that simulations and tests can read back what the engine commanded. A
/// joint can be marked as faulty, after which every write to it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct SimServos {
    angles_deg: Vec<Option<f64>>,
    aux: Option<bool>,
    num_writes: usize,
    faulty_joint: Option<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimServos {
    pub fn new(num_joints: usize) -> Self {
        Self {
            angles_deg: vec![None; num_joints],
            aux: None,
            num_writes: 0,
            faulty_joint: None,
        }
    }

    /// Last angle commanded to the joint, or `None` if it was never commanded.
    pub fn angle_deg(&self, joint: usize) -> Option<f64> {
        self.angles_deg.get(joint).copied().flatten()
    }

    /// Last state commanded to the auxiliary output.
    pub fn aux(&self) -> Option<bool> {
        self.aux
    }

    /// Number of successful joint and auxiliary writes.
    pub fn num_writes(&self) -> usize {
        self.num_writes
    }

    /// Make every write to the given joint fail, or clear the fault with `None`.
    pub fn set_faulty_joint(&mut self, joint: Option<usize>) {
        self.faulty_joint = joint;
    }
}

impl JointDriver for SimServos {
    fn set_angle(&mut self, joint: usize, angle_deg: f64) -> Result<(), ServoError> {
        if self.faulty_joint == Some(joint) {
            return Err(ServoError::I2c);
        }

        let slot = self
            .angles_deg
            .get_mut(joint)
            .ok_or(ServoError::UnknownJoint(joint))?;

        trace!("Sim joint {} -> {} deg", joint, angle_deg);

        *slot = Some(angle_deg);
        self.num_writes += 1;
        Ok(())
    }

    fn set_aux(&mut self, on: bool) -> Result<(), ServoError> {
        self.aux = Some(on);
        self.num_writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_servos() {
        let mut servos = SimServos::new(2);
        assert_eq!(servos.angle_deg(0), None);

        servos.set_angle(1, 45.0).unwrap();
        servos.set_aux(true).unwrap();
        assert_eq!(servos.angle_deg(1), Some(45.0));
        assert_eq!(servos.aux(), Some(true));
        assert_eq!(servos.num_writes(), 2);

        assert_eq!(servos.set_angle(2, 45.0), Err(ServoError::UnknownJoint(2)));

        servos.set_faulty_joint(Some(0));
        assert_eq!(servos.set_angle(0, 90.0), Err(ServoError::I2c));
        assert_eq!(servos.angle_deg(0), None);
    }
}
