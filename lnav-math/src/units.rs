use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::marker::PhantomData;
use std::time::Duration;
use std::{cmp, fmt, iter, ops};

mod heading;
pub use heading::{Heading, TurnDirection};

/// Converts nautical miles to feet.
pub const FEET_PER_NM: f64 = 6076.12;
/// Converts nautical miles to meter.
pub const METERS_PER_NM: f64 = 1852.;
/// Converts minutes to seconds.
pub const SECONDS_PER_MINUTE: f64 = 60.;
/// Converts hours to seconds.
pub const SECONDS_PER_HOUR: f64 = 3600.;

/// A scalar physical quantity.
///
/// `Base` identifies the dimension and `Dt` the power of time in the denominator.
/// All distances are stored in nautical miles and all angles in radians.
pub struct Quantity<Base, Dt>(pub f64, pub PhantomData<(Base, Dt)>);

/// Distance dimension.
pub struct DistanceBase;
/// Angular dimension.
pub struct AngleBase;

/// Zeroth time derivative.
pub struct Dt0;
/// Time derivative of `D`.
pub struct Ddt<D>(PhantomData<D>);

/// A distance or altitude, internally in nautical miles.
pub type Length = Quantity<DistanceBase, Dt0>;
/// A linear speed, internally in NM/s.
pub type Speed = Quantity<DistanceBase, Ddt<Dt0>>;
/// A linear acceleration, internally in NM/s².
pub type Accel = Quantity<DistanceBase, Ddt<Ddt<Dt0>>>;
/// An angle, internally in radians.
pub type Angle = Quantity<AngleBase, Dt0>;
/// An angular speed, internally in rad/s.
pub type AngularSpeed = Quantity<AngleBase, Ddt<Dt0>>;

impl<Base, Dt> Quantity<Base, Dt> {
    pub const ZERO: Self = Self(0., PhantomData);

    pub const fn new(value: f64) -> Self { Self(value, PhantomData) }

    #[must_use]
    pub fn abs(self) -> Self { Self(self.0.abs(), PhantomData) }

    #[must_use]
    pub fn min(self, other: Self) -> Self { Self(self.0.min(other.0), PhantomData) }

    #[must_use]
    pub fn max(self, other: Self) -> Self { Self(self.0.max(other.0), PhantomData) }

    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self { Self(self.0.clamp(min.0, max.0), PhantomData) }

    /// Returns `1.0` for positive values, `-1.0` for negative values and `0.0` for zero.
    #[must_use]
    pub fn signum(self) -> f64 { if self.0 == 0. { 0. } else { self.0.signum() } }

    #[must_use]
    pub fn is_positive(self) -> bool { self.0 > 0. }

    #[must_use]
    pub fn is_negative(self) -> bool { self.0 < 0. }

    #[must_use]
    pub fn is_zero(self) -> bool { self.0 == 0. }

    #[must_use]
    pub fn is_finite(self) -> bool { self.0.is_finite() }

    #[must_use]
    pub fn lerp(self, other: Self, s: f64) -> Self { Self(self.0 + (other.0 - self.0) * s, PhantomData) }
}

impl<Base, Dt> Default for Quantity<Base, Dt> {
    fn default() -> Self { Self::ZERO }
}

impl<Base, Dt> Clone for Quantity<Base, Dt> {
    fn clone(&self) -> Self { *self }
}

impl<Base, Dt> Copy for Quantity<Base, Dt> {}

impl<Base, Dt> PartialEq for Quantity<Base, Dt> {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}

impl<Base, Dt> PartialOrd for Quantity<Base, Dt> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { self.0.partial_cmp(&other.0) }
}

impl<Base, Dt> ops::Add for Quantity<Base, Dt> {
    type Output = Self;

    fn add(self, other: Self) -> Self { Self(self.0 + other.0, PhantomData) }
}

impl<Base, Dt> ops::AddAssign for Quantity<Base, Dt> {
    fn add_assign(&mut self, other: Self) { self.0 += other.0; }
}

impl<Base, Dt> ops::Sub for Quantity<Base, Dt> {
    type Output = Self;

    fn sub(self, other: Self) -> Self { Self(self.0 - other.0, PhantomData) }
}

impl<Base, Dt> ops::SubAssign for Quantity<Base, Dt> {
    fn sub_assign(&mut self, other: Self) { self.0 -= other.0; }
}

impl<Base, Dt> ops::Neg for Quantity<Base, Dt> {
    type Output = Self;

    fn neg(self) -> Self { Self(-self.0, PhantomData) }
}

impl<Base, Dt> ops::Mul<f64> for Quantity<Base, Dt> {
    type Output = Self;

    fn mul(self, other: f64) -> Self { Self(self.0 * other, PhantomData) }
}

impl<Base, Dt> ops::MulAssign<f64> for Quantity<Base, Dt> {
    fn mul_assign(&mut self, other: f64) { self.0 *= other; }
}

impl<Base, Dt> ops::Div<f64> for Quantity<Base, Dt> {
    type Output = Self;

    fn div(self, other: f64) -> Self { Self(self.0 / other, PhantomData) }
}

impl<Base, Dt> ops::Div for Quantity<Base, Dt> {
    type Output = f64;

    fn div(self, other: Self) -> f64 { self.0 / other.0 }
}

impl<Base, Dt> ops::Rem for Quantity<Base, Dt> {
    type Output = Self;

    fn rem(self, other: Self) -> Self { Self(self.0 % other.0, PhantomData) }
}

impl<Base, Dt> iter::Sum for Quantity<Base, Dt> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self { Self(iter.map(|q| q.0).sum(), PhantomData) }
}

/// Integrates a rate over a duration.
impl<Base, Dt> ops::Mul<Duration> for Quantity<Base, Ddt<Dt>> {
    type Output = Quantity<Base, Dt>;

    fn mul(self, other: Duration) -> Self::Output {
        Quantity(self.0 * other.as_secs_f64(), PhantomData)
    }
}

/// Differentiates a quantity over a duration.
impl<Base, Dt> ops::Div<Duration> for Quantity<Base, Dt> {
    type Output = Quantity<Base, Ddt<Dt>>;

    fn div(self, other: Duration) -> Self::Output {
        Quantity(self.0 / other.as_secs_f64(), PhantomData)
    }
}

impl Length {
    #[must_use]
    pub const fn from_nm(nm: f64) -> Self { Self(nm, PhantomData) }

    #[must_use]
    pub const fn into_nm(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_feet(feet: f64) -> Self { Self(feet / FEET_PER_NM, PhantomData) }

    #[must_use]
    pub const fn into_feet(self) -> f64 { self.0 * FEET_PER_NM }

    #[must_use]
    pub const fn from_meters(meters: f64) -> Self { Self(meters / METERS_PER_NM, PhantomData) }

    #[must_use]
    pub const fn into_meters(self) -> f64 { self.0 * METERS_PER_NM }

    /// Time required to cover this distance at `speed`.
    ///
    /// Returns `None` if the speed is not positive or the result is not representable.
    #[must_use]
    pub fn time_at(self, speed: Speed) -> Option<Duration> {
        if !speed.is_positive() {
            return None;
        }
        Duration::try_from_secs_f64(self.0 / speed.0).ok()
    }
}

impl Speed {
    #[must_use]
    pub const fn from_knots(knots: f64) -> Self { Self(knots / SECONDS_PER_HOUR, PhantomData) }

    #[must_use]
    pub const fn into_knots(self) -> f64 { self.0 * SECONDS_PER_HOUR }

    #[must_use]
    pub const fn from_meter_per_sec(mps: f64) -> Self { Self(mps / METERS_PER_NM, PhantomData) }

    #[must_use]
    pub const fn into_meter_per_sec(self) -> f64 { self.0 * METERS_PER_NM }

    #[must_use]
    pub const fn from_fpm(fpm: f64) -> Self {
        Self(fpm / FEET_PER_NM / SECONDS_PER_MINUTE, PhantomData)
    }

    #[must_use]
    pub const fn into_fpm(self) -> f64 { self.0 * FEET_PER_NM * SECONDS_PER_MINUTE }

    /// Returns the square of this speed divided by an acceleration, i.e. `v²/a`.
    #[must_use]
    pub fn squared_over(self, accel: Accel) -> Length { Length::new(self.0 * self.0 / accel.0) }
}

impl Accel {
    #[must_use]
    pub const fn from_meters_per_sec2(mps2: f64) -> Self { Self(mps2 / METERS_PER_NM, PhantomData) }

    #[must_use]
    pub const fn into_meters_per_sec2(self) -> f64 { self.0 * METERS_PER_NM }
}

impl Angle {
    /// A right angle.
    pub const RIGHT: Self = Self(FRAC_PI_2, PhantomData);
    /// A straight angle.
    pub const STRAIGHT: Self = Self(PI, PhantomData);
    /// A full turn.
    pub const FULL: Self = Self(TAU, PhantomData);

    #[must_use]
    pub const fn from_degrees(degrees: f64) -> Self { Self(degrees.to_radians(), PhantomData) }

    #[must_use]
    pub const fn into_degrees(self) -> f64 { self.0.to_degrees() }

    #[must_use]
    pub const fn from_radians(radians: f64) -> Self { Self(radians, PhantomData) }

    #[must_use]
    pub const fn into_radians(self) -> f64 { self.0 }

    #[must_use]
    pub fn sin(self) -> f64 { self.0.sin() }

    #[must_use]
    pub fn cos(self) -> f64 { self.0.cos() }

    #[must_use]
    pub fn tan(self) -> f64 { self.0.tan() }

    #[must_use]
    pub fn acos(ratio: f64) -> Self { Self(ratio.clamp(-1., 1.).acos(), PhantomData) }

    #[must_use]
    pub fn atan2(y: f64, x: f64) -> Self { Self(y.atan2(x), PhantomData) }

    /// Normalizes the angle into the range `-STRAIGHT < value <= STRAIGHT`.
    #[must_use]
    pub fn normalize(self) -> Self {
        let mut value = self.0.rem_euclid(TAU);
        if value > PI {
            value -= TAU;
        }
        Self(value, PhantomData)
    }

    /// Returns the fraction of a full turn covered by this angle.
    #[must_use]
    pub fn turns(self) -> f64 { self.0 / TAU }

    /// Arc length subtended by this angle on a circle of the given radius.
    #[must_use]
    pub fn arc_length(self, radius: Length) -> Length { radius * self.0.abs() }
}

impl AngularSpeed {
    #[must_use]
    pub const fn from_degrees_per_sec(degrees: f64) -> Self {
        Self(degrees.to_radians(), PhantomData)
    }

    #[must_use]
    pub const fn into_degrees_per_sec(self) -> f64 { self.0.to_degrees() }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Length").field("nm", &self.into_nm()).field("feet", &self.into_feet()).finish()
    }
}

impl fmt::Debug for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Speed").field("knots", &self.into_knots()).field("fpm", &self.into_fpm()).finish()
    }
}

impl fmt::Debug for Accel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accel").field("m/s2", &self.into_meters_per_sec2()).finish()
    }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Angle").field("degrees", &self.into_degrees()).finish()
    }
}

impl fmt::Debug for AngularSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AngularSpeed").field("degrees/s", &self.into_degrees_per_sec()).finish()
    }
}

impl<Base, Dt> serde::Serialize for Quantity<Base, Dt> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de, Base, Dt> serde::Deserialize<'de> for Quantity<Base, Dt> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;

        if !value.is_finite() {
            return Err(<D::Error as serde::de::Error>::custom("non-finite quantity"));
        }

        Ok(Self(value, PhantomData))
    }
}

#[cfg(feature = "schema")]
impl<Base, Dt> schemars::JsonSchema for Quantity<Base, Dt> {
    fn schema_name() -> std::borrow::Cow<'static, str> { "Quantity".into() }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        f64::json_schema(generator)
    }
}
