//! Algorithms and constants related to aviation physics.

use crate::{Accel, Angle, Length, Speed};


/// Standard gravity at Earth's surface.
pub const EARTH_SURFACE_GRAVITY: Accel = Accel::from_meters_per_sec2(9.80665);

/// Radius of a coordinated level turn at `speed` with the given bank angle.
///
/// Returns a non-finite or non-positive value if `bank` is zero or `speed` is zero;
/// callers are expected to validate the result.
#[must_use]
pub fn turn_radius(speed: Speed, bank: Angle) -> Length {
    speed.squared_over(EARTH_SURFACE_GRAVITY * bank.tan())
}

/// Bank angle required to fly a coordinated level turn of `radius` at `speed`.
///
/// The result is always non-negative.
#[must_use]
pub fn bank_angle_for_radius(speed: Speed, radius: Length) -> Angle {
    let lateral = speed.squared_over(EARTH_SURFACE_GRAVITY) / radius;
    Angle::from_radians(lateral.atan())
}
