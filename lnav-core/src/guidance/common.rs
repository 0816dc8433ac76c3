//! Performance figures shared by legs and transitions.

use math::{Angle, AngularSpeed, EARTH_SURFACE_GRAVITY, Length, Speed};

#[cfg(test)]
mod tests;

/// Bank angle assumed for turns computed from the present position.
pub const MAX_ROLL_ANGLE: Angle = Angle::from_degrees(25.);

/// Roll rate assumed when anticipating a bank change.
pub const MAX_ROLL_RATE: AngularSpeed = AngularSpeed::from_degrees_per_sec(5.);

/// Course changes below this angle are flown without a turn.
pub const COURSE_CHANGE_THRESHOLD: Angle = Angle::from_degrees(3.);

/// Lower bound of the fly-by bank schedule.
pub const MIN_FLY_BY_BANK: Angle = Angle::from_degrees(5.);

/// A leg is sequenced once the remaining distance is within this tolerance.
pub const SEQUENCING_TOLERANCE: Length = Length::from_nm(0.001);

const LOW_SPEED_ROLL_ANGLE: Angle = Angle::from_degrees(15.);
const HIGH_SPEED_ROLL_ANGLE: Angle = Angle::from_degrees(19.);
const BANK_SCHEDULE_FULL_KNOTS: f64 = 150.;
const BANK_SCHEDULE_LOW_KNOTS: f64 = 300.;
const BANK_SCHEDULE_HIGH_KNOTS: f64 = 450.;

/// Roll-in lag coefficient, in seconds per m/s² of bank-induced acceleration.
const ROLL_ANTICIPATION_LAG: f64 = 0.0038;

/// Maximum bank angle permitted at `true_airspeed`.
///
/// Ramps from 15° at rest to 25° at 150 kt,
/// stays at 25° up to 300 kt and reduces linearly to 19° at 450 kt.
#[must_use]
pub fn max_bank_angle(true_airspeed: Speed) -> Angle {
    let knots = true_airspeed.into_knots();
    if knots < BANK_SCHEDULE_FULL_KNOTS {
        let ratio = (knots / BANK_SCHEDULE_FULL_KNOTS).max(0.);
        return LOW_SPEED_ROLL_ANGLE.lerp(MAX_ROLL_ANGLE, ratio);
    }

    let ratio = ((knots - BANK_SCHEDULE_LOW_KNOTS)
        / (BANK_SCHEDULE_HIGH_KNOTS - BANK_SCHEDULE_LOW_KNOTS))
        .clamp(0., 1.);
    MAX_ROLL_ANGLE.lerp(HIGH_SPEED_ROLL_ANGLE, ratio)
}

/// Bank angle for a fly-by turn through `course_change`.
#[must_use]
pub fn fly_by_bank_angle(course_change: Angle, true_airspeed: Speed) -> Angle {
    (course_change.abs() / 2.).clamp(MIN_FLY_BY_BANK, max_bank_angle(true_airspeed))
}

/// Ground distance covered while rolling through `bank_change` at `ground_speed`.
///
/// Starting the roll this far before a turn point
/// lets the aircraft reach the new bank angle on the path.
#[must_use]
pub fn roll_anticipation_distance(ground_speed: Speed, bank_change: Angle) -> Length {
    let gravity = EARTH_SURFACE_GRAVITY.into_meters_per_sec2();
    let roll_rate = MAX_ROLL_RATE.into_degrees_per_sec();
    let delta = bank_change.abs().into_degrees();

    let seconds = ((1. + 2. * ROLL_ANTICIPATION_LAG * gravity * delta / roll_rate).sqrt() - 1.)
        / (ROLL_ANTICIPATION_LAG * gravity);
    Length::new(ground_speed.0 * seconds)
}
