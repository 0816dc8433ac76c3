use math::{Heading, LatLong, Length, Speed, TurnDirection};
use serde::{Deserialize, Serialize};

use crate::units::{degrees, feet, knots};
use crate::{AltitudeConstraint, LegType, SpeedConstraint};

/// A named position from the navigation database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Fix {
    /// Display identifier of the fix.
    pub ident:    String,
    /// Position of the fix.
    pub position: LatLong,
}

/// Procedure segment a leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum SegmentType {
    /// Standard instrument departure.
    Departure,
    /// En-route airways and directs.
    #[default]
    Enroute,
    /// Standard terminal arrival route.
    Arrival,
    /// Instrument approach procedure.
    Approach,
    /// Missed approach procedure.
    Missed,
}

/// One entry of the flight plan.
///
/// The leg runs from the terminator of the previous entry to the terminator of this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LegSpec {
    /// The terminator fix of the leg.
    ///
    /// Legs ending at a floating position (CA, CR, VM) may still carry a fix,
    /// which is then only used for display.
    #[serde(default)]
    pub fix:                   Option<Fix>,
    /// Path geometry of the leg.
    pub path:                  LegPath,
    /// Procedure segment of the leg.
    #[serde(default)]
    pub segment:               SegmentType,
    /// Altitude restriction at the terminator.
    #[serde(default)]
    pub altitude_constraint:   Option<AltitudeConstraint>,
    /// Speed restriction at the terminator.
    #[serde(default)]
    pub speed_constraint:      Option<SpeedConstraint>,
    /// True airspeed predicted by the performance computation for this leg, in knots.
    #[serde(default, with = "knots::option")]
    pub predicted_speed:       Option<Speed>,
    /// Whether the flight plan has a discontinuity after this leg.
    #[serde(default)]
    pub ends_in_discontinuity: bool,
}

impl LegSpec {
    /// The ARINC 424 code of this leg.
    #[must_use]
    pub fn leg_type(&self) -> LegType { self.path.leg_type() }

    /// Display identifier of the terminator.
    #[must_use]
    pub fn ident(&self) -> &str { self.fix.as_ref().map_or("", |fix| fix.ident.as_str()) }
}

/// Path geometry of a leg, tagged by its ARINC 424 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum LegPath {
    /// Initial fix of a sequence of legs.
    If,
    /// Great-circle track from the previous fix.
    Tf,
    /// Direct to the fix from wherever the leg starts.
    Df,
    /// Constant radius arc from the previous fix.
    Rf {
        /// Centre of the arc.
        centre: LatLong,
        /// Direction of the arc, or the shorter direction if absent.
        #[serde(default)]
        turn:   Option<TurnDirection>,
    },
    /// DME arc around a navaid, from a boundary radial to the radial of the fix.
    Af {
        /// The navaid at the centre of the arc.
        navaid:          Fix,
        /// Radial on which the arc starts.
        #[serde(with = "degrees")]
        boundary_radial: Heading,
        /// Direction of the arc.
        turn:            TurnDirection,
    },
    /// Fixed course until reaching an altitude.
    Ca {
        /// True course to fly.
        #[serde(with = "degrees")]
        course:   Heading,
        /// Altitude terminating the leg.
        #[serde(with = "feet")]
        altitude: Length,
    },
    /// Fixed heading until manually terminated.
    Vm {
        /// True heading to fly.
        #[serde(with = "degrees")]
        heading: Heading,
    },
    /// Fixed course until intercepting a radial of a navaid.
    Cr {
        /// True course to fly.
        #[serde(with = "degrees")]
        course: Heading,
        /// The navaid defining the radial.
        navaid: Fix,
        /// True bearing of the radial from the navaid.
        #[serde(with = "degrees")]
        radial: Heading,
    },
    /// Racetrack holding pattern at the fix.
    Hold {
        /// True course of the inbound leg.
        #[serde(with = "degrees")]
        inbound_course: Heading,
        /// Direction of the turns.
        turn:           TurnDirection,
        /// Length of the straight legs.
        #[serde(default)]
        distance:       HoldDistance,
        /// Condition on which the aircraft leaves the hold.
        termination:    HoldTermination,
    },
    /// A leg type without dedicated path geometry.
    Other {
        /// The ARINC 424 code of the leg.
        leg_type: LegType,
    },
}

impl LegPath {
    /// The ARINC 424 code of this path.
    #[must_use]
    pub fn leg_type(&self) -> LegType {
        match self {
            Self::If => LegType::If,
            Self::Tf => LegType::Tf,
            Self::Df => LegType::Df,
            Self::Rf { .. } => LegType::Rf,
            Self::Af { .. } => LegType::Af,
            Self::Ca { .. } => LegType::Ca,
            Self::Vm { .. } => LegType::Vm,
            Self::Cr { .. } => LegType::Cr,
            Self::Hold { termination, .. } => match termination {
                HoldTermination::Altitude { .. } => LegType::Ha,
                HoldTermination::Fix => LegType::Hf,
                HoldTermination::Manual => LegType::Hm,
            },
            Self::Other { leg_type } => *leg_type,
        }
    }
}

/// Length of the straight legs of a hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum HoldDistance {
    /// A fixed distance in nautical miles.
    Distance(Length),
    /// A flying time in minutes at the holding speed.
    Minutes(f64),
}

impl Default for HoldDistance {
    fn default() -> Self { Self::Minutes(1.) }
}

/// Condition on which the aircraft leaves a hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum HoldTermination {
    /// HA: leave at the fix once the altitude is reached.
    Altitude {
        /// Altitude in feet.
        #[serde(with = "feet")]
        altitude: Length,
    },
    /// HF: leave at the fix after one circuit.
    Fix,
    /// HM: leave only when the crew requests it.
    Manual,
}
