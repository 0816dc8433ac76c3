use std::f64::consts::{FRAC_PI_2, PI};
use std::{fmt, ops};

use super::Angle;


/// An absolute directional bearing, clockwise from true north.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Heading(
    Angle, // always -PI < heading <= PI
);

impl Heading {
    /// Heading north.
    pub const NORTH: Self = Self(Angle::new(0.));
    /// Heading east.
    pub const EAST: Self = Self(Angle::new(FRAC_PI_2));
    /// Heading south.
    pub const SOUTH: Self = Self(Angle::new(PI));
    /// Heading west.
    pub const WEST: Self = Self(Angle::new(-FRAC_PI_2));

    /// Creates a heading from an absolute bearing in degrees.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self { Self::from_radians(Angle::from_degrees(degrees)) }

    /// Returns the heading in degrees in the range 0..360.
    #[must_use]
    pub fn degrees(self) -> f64 {
        let degrees = self.0.into_degrees();
        if degrees < 0. { degrees + 360. } else { degrees }
    }

    /// Creates a heading from an absolute bearing in radians.
    #[must_use]
    pub fn from_radians(radians: Angle) -> Self { Self(radians.normalize()) }

    /// Returns the heading in radians in the range `-STRAIGHT < value <= STRAIGHT`.
    #[must_use]
    pub fn radians(self) -> Angle { self.0 }

    /// Returns the heading in radians in the range `0 <= value < FULL`.
    #[must_use]
    pub fn radians_nonnegative(self) -> Angle {
        if self.0.is_negative() { self.0 + Angle::FULL } else { self.0 }
    }

    /// Radians to turn from `self` to `other` in the given direction.
    /// The output is always in the range [0, FULL) for `Clockwise`,
    /// or (-FULL, 0] for `CounterClockwise`.
    #[must_use]
    pub fn distance(self, other: Heading, dir: TurnDirection) -> Angle {
        let mut output = (other.0 - self.0) % Angle::FULL;
        match dir {
            TurnDirection::Clockwise => {
                if output.is_negative() {
                    output += Angle::FULL;
                }
            }
            TurnDirection::CounterClockwise => {
                if output.is_positive() {
                    output -= Angle::FULL;
                }
            }
        }

        output
    }

    /// Returns the signed angle closest to zero such that
    /// adding it to `self` approximately returns `other`.
    #[must_use]
    pub fn closest_distance(self, other: Heading) -> Angle { other - self }

    /// Returns the closer direction to turn towards `other`.
    ///
    /// Exactly opposite headings resolve to `Clockwise`.
    #[must_use]
    pub fn closer_direction_to(self, other: Heading) -> TurnDirection {
        TurnDirection::from_angle(other - self).unwrap_or(TurnDirection::Clockwise)
    }

    /// Rotate by `delta` radians in the direction of `dir`.
    #[must_use]
    pub fn add_direction(self, dir: TurnDirection, delta: Angle) -> Self { self + delta * dir }

    /// Returns the opposite direction of this heading.
    #[must_use]
    pub fn opposite(self) -> Self { self + Angle::STRAIGHT }
}

impl fmt::Debug for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heading").field("degrees", &self.degrees()).finish()
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03.0}°", self.degrees())
    }
}

/// Returns the shortest bearing change such that
/// adding the return value to `other` approximately yields `self`.
///
/// The result is in the range `-STRAIGHT < value <= STRAIGHT`.
impl ops::Sub for Heading {
    type Output = Angle;
    fn sub(self, other: Self) -> Angle { (self.0 - other.0).normalize() }
}

impl ops::Add<Angle> for Heading {
    type Output = Self;
    /// Offsets `self` by `angle` clockwise.
    fn add(self, angle: Angle) -> Self { Self::from_radians(self.0 + angle) }
}

impl ops::AddAssign<Angle> for Heading {
    /// Offsets `self` by `angle` clockwise.
    fn add_assign(&mut self, angle: Angle) { *self = *self + angle; }
}

impl ops::Sub<Angle> for Heading {
    type Output = Self;
    /// Offsets `self` by `angle` counter-clockwise.
    fn sub(self, angle: Angle) -> Self { self + (-angle) }
}

impl ops::SubAssign<Angle> for Heading {
    /// Offsets `self` by `angle` counter-clockwise.
    fn sub_assign(&mut self, angle: Angle) { *self = *self - angle; }
}

/// The direction for yaw change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum TurnDirection {
    /// A left, counter-clockwise turn generating negative yaw speed.
    CounterClockwise,
    /// A right, clockwise turn generating positive yaw speed.
    Clockwise,
}

impl TurnDirection {
    /// Returns the direction of a signed angle, or `None` if it is zero.
    #[must_use]
    pub fn from_angle(angle: Angle) -> Option<Self> {
        if angle.is_positive() {
            Some(Self::Clockwise)
        } else if angle.is_negative() {
            Some(Self::CounterClockwise)
        } else {
            None
        }
    }

    /// `1.0` for clockwise turns, `-1.0` for counter-clockwise turns.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::CounterClockwise => -1.,
            TurnDirection::Clockwise => 1.,
        }
    }
}

impl ops::Neg for TurnDirection {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            TurnDirection::CounterClockwise => TurnDirection::Clockwise,
            TurnDirection::Clockwise => TurnDirection::CounterClockwise,
        }
    }
}

macro_rules! impl_angle_mul_dir {
    ($ty:ty) => {
        impl ops::Mul<TurnDirection> for $ty {
            type Output = Self;

            fn mul(mut self, dir: TurnDirection) -> Self {
                if dir == TurnDirection::CounterClockwise {
                    self.0 = -self.0;
                }
                self
            }
        }
    };
}

impl_angle_mul_dir!(Angle);
impl_angle_mul_dir!(super::AngularSpeed);
