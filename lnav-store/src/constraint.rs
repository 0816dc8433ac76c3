use math::{Length, Speed};
use serde::{Deserialize, Serialize};

use crate::units::{feet, knots};

/// Altitude restriction attached to a leg terminator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum AltitudeConstraint {
    /// Cross the terminator exactly at the altitude.
    At {
        /// Altitude in feet.
        #[serde(with = "feet")]
        altitude: Length,
    },
    /// Cross the terminator at or above the altitude.
    AtOrAbove {
        /// Altitude in feet.
        #[serde(with = "feet")]
        altitude: Length,
    },
    /// Cross the terminator at or below the altitude.
    AtOrBelow {
        /// Altitude in feet.
        #[serde(with = "feet")]
        altitude: Length,
    },
    /// Cross the terminator between two altitudes.
    Range {
        /// Lowest permitted altitude in feet.
        #[serde(with = "feet")]
        lower: Length,
        /// Highest permitted altitude in feet.
        #[serde(with = "feet")]
        upper: Length,
    },
}

impl AltitudeConstraint {
    /// The altitude coded in the first altitude field of the leg.
    ///
    /// For a range this is the upper bound.
    #[must_use]
    pub fn coded_altitude(&self) -> Length {
        match *self {
            Self::At { altitude } | Self::AtOrAbove { altitude } | Self::AtOrBelow { altitude } => {
                altitude
            }
            Self::Range { upper, .. } => upper,
        }
    }

    /// Whether `altitude` satisfies the constraint, with a tolerance of `tolerance` on each side.
    #[must_use]
    pub fn is_satisfied_by(&self, altitude: Length, tolerance: Length) -> bool {
        match *self {
            Self::At { altitude: target } => (altitude - target).abs() <= tolerance,
            Self::AtOrAbove { altitude: target } => altitude >= target - tolerance,
            Self::AtOrBelow { altitude: target } => altitude <= target + tolerance,
            Self::Range { lower, upper } => {
                altitude >= lower - tolerance && altitude <= upper + tolerance
            }
        }
    }
}

/// Speed restriction attached to a leg terminator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SpeedConstraint {
    /// How `speed` restricts the aircraft.
    pub kind:  SpeedConstraintKind,
    /// The restricted speed in knots.
    #[serde(with = "knots")]
    pub speed: Speed,
}

/// How a [`SpeedConstraint`] restricts the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum SpeedConstraintKind {
    /// Fly exactly at the speed.
    At,
    /// Fly at or faster than the speed.
    AtOrAbove,
    /// Fly at or slower than the speed.
    AtOrBelow,
}
