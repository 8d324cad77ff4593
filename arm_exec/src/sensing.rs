//! # Sensing Module
//!
//! The engine refreshes the sensing subsystem after commanding the servos so
//! that sensed values reflect the motion in progress. What is sensed is up to
//! the implementor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A sensing subsystem which can be told to refresh its values.
pub trait Sensing {
    fn update_sensation(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sensing for arms without sensors.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSensing;

/// Sensing which only counts the refreshes it has been asked for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SensationCounter {
    pub num_refreshes: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Sensing for NoSensing {
    fn update_sensation(&mut self) {}
}

impl Sensing for SensationCounter {
    fn update_sensation(&mut self) {
        self.num_refreshes += 1;
        trace!("Sensation refresh {}", self.num_refreshes);
    }
}

impl<F: FnMut()> Sensing for F {
    fn update_sensation(&mut self) {
        self()
    }
}
