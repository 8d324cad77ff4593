//! # Clock Module
//!
//! Settle delays are taken through a [`Clock`] so that real hardware waits
//! for the servos while simulations and tests only count simulated time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of blocking delays.
pub trait Clock {
    /// Block for the given duration.
    fn delay(&mut self, duration: Duration);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock which blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadClock;

/// Clock which returns immediately and accumulates the time it would have
/// waited.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SimClock {
    elapsed: Duration,
    num_delays: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Clock for ThreadClock {
    fn delay(&mut self, duration: Duration) {
        if duration > Duration::from_secs(0) {
            std::thread::sleep(duration);
        }
    }
}

impl SimClock {
    /// Total simulated time spent in delays.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of delays requested.
    pub fn num_delays(&self) -> usize {
        self.num_delays
    }
}

impl Clock for SimClock {
    fn delay(&mut self, duration: Duration) {
        self.elapsed += duration;
        self.num_delays += 1;
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_clock_accumulates() {
        let mut clock = SimClock::default();
        clock.delay(Duration::from_millis(150));
        clock.delay(Duration::from_millis(15));

        assert_eq!(clock.elapsed(), Duration::from_millis(165));
        assert_eq!(clock.num_delays(), 2);
    }

    #[test]
    fn test_boxed_clock() {
        let mut clock: Box<dyn Clock> = Box::new(ThreadClock);
        clock.delay(Duration::from_millis(1));
    }
}
