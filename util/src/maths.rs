//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the closed range `[min, max]`.
///
/// Works for any partially ordered type so that integer joint angles and
/// floating point duty cycles share the same limiting rule. `min` is expected
/// to be less than or equal to `max`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: PartialOrd
{
    if value < min {
        min
    }
    else if value > max {
        max
    }
    else {
        value
    }
}

/// Returns true if the value had to be limited to fit in `[min, max]`.
pub fn is_outside<T>(value: &T, min: &T, max: &T) -> bool
where
    T: PartialOrd
{
    value < min || value > max
}
