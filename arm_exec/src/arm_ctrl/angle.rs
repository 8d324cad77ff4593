//! Storage types for joint angles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::convert::TryFrom;
use std::fmt::{Debug, Display};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Signed change in a joint angle.
///
/// Units: degrees
pub type Delta = i16;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A fixed width integer type a joint angle can be stored in.
///
/// The storage width decides how an out of range step looks before the clamp:
/// unsigned angles wrap around when stepping below zero, signed angles do not.
pub trait JointAngle:
    Copy + Ord + Default + Debug + Display + Serialize + Into<f64> + Into<i64> + 'static
{
    /// True if adding a negative delta to a small angle can wrap around to a
    /// large value instead of going below zero.
    const WRAPS: bool;

    /// Add `delta` using the storage type's own arithmetic.
    ///
    /// Only a negative delta may wrap, a positive delta saturates at the
    /// largest storable angle.
    fn offset(self, delta: Delta) -> Self;

    /// Signed difference `target - self`, saturated to the range of a
    /// [`Delta`].
    fn delta_to(self, target: Self) -> Delta;

    /// Convert a configured angle, or `None` if it does not fit.
    fn from_i64(value: i64) -> Option<Self>;

    /// Integer midpoint of `[min, max]`, truncated towards zero.
    fn mid_range(min: Self, max: Self) -> Self {
        let mid = (Into::<i64>::into(min) + Into::<i64>::into(max)) / 2;

        // The midpoint of two representable values is representable.
        Self::from_i64(mid).unwrap_or(min)
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointAngle for u16 {
    const WRAPS: bool = true;

    fn offset(self, delta: Delta) -> Self {
        // A negative delta past zero wraps to the top of the range, a
        // positive one stops at the top.
        if delta < 0 {
            self.wrapping_sub(delta.unsigned_abs())
        }
        else {
            self.saturating_add(delta as u16)
        }
    }

    fn delta_to(self, target: Self) -> Delta {
        saturate_delta(target as i64 - self as i64)
    }

    fn from_i64(value: i64) -> Option<Self> {
        u16::try_from(value).ok()
    }
}

impl JointAngle for i16 {
    const WRAPS: bool = false;

    fn offset(self, delta: Delta) -> Self {
        self.saturating_add(delta)
    }

    fn delta_to(self, target: Self) -> Delta {
        saturate_delta(target as i64 - self as i64)
    }

    fn from_i64(value: i64) -> Option<Self> {
        i16::try_from(value).ok()
    }
}

fn saturate_delta(value: i64) -> Delta {
    if value > Delta::MAX as i64 {
        Delta::MAX
    } else if value < Delta::MIN as i64 {
        Delta::MIN
    } else {
        value as Delta
    }
}
