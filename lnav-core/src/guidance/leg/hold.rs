use enum_map::{Enum, EnumMap, enum_map};
use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};
use store::{Fix, HoldDistance, HoldTermination, LegType};

use super::LegKind;
use crate::guidance::common::max_bank_angle;
use crate::guidance::path::{ArcPath, PathVectors, Segment, StraightPath};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Default holding speed when the leg has no usable speed constraint.
const DEFAULT_HOLD_SPEED: Speed = Speed::from_knots(220.);

/// Speed constraints at or below this are not coded holding speeds.
const MIN_CODED_HOLD_SPEED: Speed = Speed::from_knots(100.);

/// Maximum holding speeds by altitude band, as `(altitude ceiling in feet, knots)`.
const HOLD_SPEED_LIMITS: [(f64, f64); 3] = [(14000., 230.), (20000., 240.), (34000., 265.)];
const HIGH_ALTITUDE_HOLD_SPEED: Speed = Speed::from_knots(240.);

/// Speed flown in a hold at `altitude`.
#[must_use]
pub fn hold_speed(altitude: Length, constraint: Option<Speed>) -> Speed {
    let limit = HOLD_SPEED_LIMITS
        .iter()
        .find(|&&(ceiling, _)| altitude.into_feet() < ceiling)
        .map_or(HIGH_ALTITUDE_HOLD_SPEED, |&(_, knots)| Speed::from_knots(knots));
    constraint
        .filter(|&speed| speed > MIN_CODED_HOLD_SPEED)
        .map_or(DEFAULT_HOLD_SPEED, |speed| speed.min(DEFAULT_HOLD_SPEED))
        .min(limit)
}

/// Position within a racetrack circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, strum::Display)]
pub enum HoldPhase {
    /// Flying the inbound course to the hold fix.
    Inbound,
    /// Turning from the fix to the outbound course.
    Arc1,
    Outbound,
    /// Turning back to the inbound course.
    Arc2,
}

impl HoldPhase {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Inbound => Self::Arc1,
            Self::Arc1 => Self::Outbound,
            Self::Outbound => Self::Arc2,
            Self::Arc2 => Self::Inbound,
        }
    }

    /// Phases still to be flown after this one before reaching the fix.
    fn remaining_to_fix(self) -> &'static [Self] {
        match self {
            Self::Inbound => &[],
            Self::Arc1 => &[Self::Outbound, Self::Arc2, Self::Inbound],
            Self::Outbound => &[Self::Arc2, Self::Inbound],
            Self::Arc2 => &[Self::Inbound],
        }
    }
}

/// Racetrack geometry of a hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldPattern {
    pub radius:     Length,
    pub leg_length: Length,
    pub segments:   EnumMap<HoldPhase, Segment>,
}

impl HoldPattern {
    /// Builds the racetrack with its inbound course ending at `fix`.
    #[must_use]
    pub fn new(
        fix: LatLong,
        inbound_course: Heading,
        turn: TurnDirection,
        radius: Length,
        leg_length: Length,
    ) -> Self {
        let outbound_course = inbound_course.opposite();
        let holding_side = inbound_course + Angle::RIGHT * turn;

        let arc1 = ArcPath::new(
            fix.destination(holding_side, radius),
            radius,
            holding_side.opposite(),
            Angle::STRAIGHT * turn,
        );
        let outbound = StraightPath::from_course(arc1.end, outbound_course, leg_length);
        let arc2 = ArcPath::new(
            outbound.end.destination(outbound_course + Angle::RIGHT * turn, radius),
            radius,
            holding_side,
            Angle::STRAIGHT * turn,
        );
        let inbound = StraightPath::new(arc2.end, fix);

        Self {
            radius,
            leg_length,
            segments: enum_map! {
                HoldPhase::Inbound => Segment::Line(inbound),
                HoldPhase::Arc1 => Segment::Arc(arc1),
                HoldPhase::Outbound => Segment::Line(outbound),
                HoldPhase::Arc2 => Segment::Arc(arc2),
            },
        }
    }

    /// Length of one complete circuit.
    #[must_use]
    pub fn circuit_length(&self) -> Length {
        self.segments.values().map(Segment::length).sum()
    }

    #[must_use]
    pub fn phase_distance_to_go(&self, phase: HoldPhase, position: LatLong) -> Length {
        self.segments[phase].distance_to_go(position)
    }

    /// Distance to go from `position` in `phase` to the hold fix.
    #[must_use]
    pub fn distance_to_fix(&self, phase: HoldPhase, position: LatLong) -> Length {
        let following: Length =
            phase.remaining_to_fix().iter().map(|&next| self.segments[next].length()).sum();
        self.phase_distance_to_go(phase, position) + following
    }
}

/// Racetrack hold at a fix.
///
/// The leg type is determined by the termination:
/// HA ends at the fix once the altitude is reached,
/// HF ends at the fix after one circuit,
/// and HM continues until an exit is requested.
#[derive(Debug, Clone)]
pub struct HoldLeg {
    pub fix:              Fix,
    pub inbound_course:   Heading,
    pub turn:             TurnDirection,
    pub distance:         HoldDistance,
    pub termination:      HoldTermination,
    pub speed_constraint: Option<Speed>,
    coded_altitude:       Option<Length>,
    pattern:              Option<HoldPattern>,
    phase:                HoldPhase,
    termination_met:      bool,
    exit_requested:       bool,
}

impl HoldLeg {
    #[must_use]
    pub fn new(
        fix: Fix,
        inbound_course: Heading,
        turn: TurnDirection,
        distance: HoldDistance,
        termination: HoldTermination,
        speed_constraint: Option<Speed>,
    ) -> Self {
        Self {
            fix,
            inbound_course,
            turn,
            distance,
            termination,
            speed_constraint,
            coded_altitude: None,
            pattern: None,
            phase: HoldPhase::Inbound,
            termination_met: false,
            exit_requested: false,
        }
    }

    /// Sets the altitude coded on the leg, which selects the holding speed band.
    #[must_use]
    pub fn with_coded_altitude(mut self, altitude: Option<Length>) -> Self {
        self.coded_altitude = altitude;
        self
    }

    /// Altitude whose band limits the holding speed.
    ///
    /// Falls back to the aircraft altitude when the leg codes none.
    #[must_use]
    pub fn speed_band_altitude(&self, aircraft_altitude: Length) -> Length {
        let termination_altitude = match self.termination {
            HoldTermination::Altitude { altitude } => Some(altitude),
            HoldTermination::Fix | HoldTermination::Manual => None,
        };
        self.coded_altitude.or(termination_altitude).unwrap_or(aircraft_altitude)
    }

    /// Turn radius and leg length flown in the hold by an aircraft at `aircraft_altitude`.
    #[must_use]
    pub fn predicted_dimensions(&self, aircraft_altitude: Length) -> (Length, Length) {
        let speed = hold_speed(self.speed_band_altitude(aircraft_altitude), self.speed_constraint);
        let radius = turn_radius(speed, max_bank_angle(speed));
        let leg_length = match self.distance {
            HoldDistance::Distance(length) => length,
            HoldDistance::Minutes(minutes) => Length::new(speed.0 * minutes * math::SECONDS_PER_MINUTE),
        };
        (radius, leg_length)
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&HoldPattern> { self.pattern.as_ref() }

    #[must_use]
    pub fn phase(&self) -> HoldPhase { self.phase }

    #[must_use]
    pub fn is_termination_met(&self) -> bool { self.termination_met }

    /// Leaves the hold at the next passage of the fix.
    pub fn request_exit(&mut self) { self.exit_requested = true; }

    #[must_use]
    pub fn is_exit_requested(&self) -> bool { self.exit_requested }

    fn current_segment(&self) -> Option<&Segment> {
        Some(&self.pattern.as_ref()?.segments[self.phase])
    }
}

impl LegKind for HoldLeg {
    fn leg_type(&self) -> LegType {
        match self.termination {
            HoldTermination::Altitude { .. } => LegType::Ha,
            HoldTermination::Fix => LegType::Hf,
            HoldTermination::Manual => LegType::Hm,
        }
    }

    fn ident(&self) -> String { self.fix.ident.clone() }

    fn repr(&self) -> String {
        let turn = match self.turn {
            TurnDirection::CounterClockwise => 'L',
            TurnDirection::Clockwise => 'R',
        };
        format!("{} AT {} {turn} INB {}", self.leg_type(), self.fix.ident, self.inbound_course)
    }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        let (radius, leg_length) = self.predicted_dimensions(ctx.state.altitude);
        if !radius.is_positive() || !radius.is_finite() || !leg_length.is_positive() {
            self.pattern = None;
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "hold pattern has no extent",
            });
        }

        self.pattern =
            Some(HoldPattern::new(self.fix.position, self.inbound_course, self.turn, radius, leg_length));
        Ok(())
    }

    fn update_state(&mut self, state: &AircraftState) {
        let Some(pattern) = &self.pattern else { return };

        self.termination_met |= self.exit_requested
            || match self.termination {
                HoldTermination::Altitude { altitude } => state.altitude >= altitude,
                HoldTermination::Fix => self.phase != HoldPhase::Inbound,
                HoldTermination::Manual => false,
            };

        let terminated_at_fix = self.phase == HoldPhase::Inbound && self.termination_met;
        if !terminated_at_fix && !pattern.phase_distance_to_go(self.phase, state.position).is_positive() {
            self.phase = self.phase.next();
        }
    }

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(self.current_segment()?.guidance(state))
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        let pattern = self.pattern.as_ref()?;
        let to_fix = pattern.distance_to_fix(self.phase, state.position);
        if self.termination_met {
            Some(to_fix)
        } else {
            Some(to_fix + pattern.circuit_length())
        }
    }

    fn is_abeam(&self, _position: LatLong) -> bool { self.pattern.is_some() }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.current_segment().map_or(Angle::ZERO, |segment| segment.nominal_roll_angle(ground_speed))
    }

    fn is_circular_arc(&self) -> bool { self.current_segment().is_some_and(Segment::is_arc) }

    fn path_vectors(&self) -> PathVectors {
        let Some(pattern) = &self.pattern else { return PathVectors::new() };
        [HoldPhase::Arc1, HoldPhase::Outbound, HoldPhase::Arc2, HoldPhase::Inbound]
            .into_iter()
            .map(|phase| pattern.segments[phase].path_vector())
            .collect()
    }

    fn terminator(&self) -> Option<LatLong> { Some(self.fix.position) }

    fn distance(&self) -> Option<Length> { self.pattern.as_ref().map(HoldPattern::circuit_length) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.inbound_course) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.inbound_course) }

    fn pseudo_waypoint_location(&self, _distance_before_terminator: Length) -> Option<LatLong> {
        None
    }
}
