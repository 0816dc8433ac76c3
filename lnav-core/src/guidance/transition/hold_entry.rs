use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection};

use super::{TransitionKind, TransitionType, exit_of};
use crate::guidance::common::COURSE_CHANGE_THRESHOLD;
use crate::guidance::leg::{self, Leg};
use crate::guidance::path::{ArcPath, PathBuilder, PathVectors, SegmentChain};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Offset of the teardrop outbound track from the hold outbound course.
const TEARDROP_OFFSET: Angle = Angle::from_degrees(30.);

/// Angle at which every entry rejoins the inbound course.
const INTERCEPT_ANGLE: Angle = Angle::from_degrees(45.);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HoldEntry {
    /// Arriving aligned with the inbound course.
    Null,
    Direct,
    Teardrop,
    Parallel,
}

impl HoldEntry {
    /// Selects the entry procedure from the arrival track at the hold fix.
    #[must_use]
    pub fn select(arrival: Heading, inbound_course: Heading, turn: TurnDirection) -> Self {
        let entry_angle = (inbound_course - arrival).into_degrees();
        if entry_angle.abs() <= COURSE_CHANGE_THRESHOLD.into_degrees() {
            return Self::Null;
        }

        // Mirror left holds onto right holds.
        let angle = match turn {
            TurnDirection::Clockwise => entry_angle,
            TurnDirection::CounterClockwise => -entry_angle,
        };

        if angle > 70. || angle <= -177. {
            Self::Parallel
        } else if angle > -177. && angle < -110. {
            Self::Teardrop
        } else {
            Self::Direct
        }
    }
}

/// Entry procedure from the hold fix onto the inbound course of a hold.
#[derive(Debug, Clone)]
pub struct HoldEntryTransition {
    entry:          HoldEntry,
    fix:            Option<LatLong>,
    arrival_course: Option<Heading>,
    inbound_course: Option<Heading>,
    chain:          SegmentChain,
}

impl Default for HoldEntryTransition {
    fn default() -> Self {
        Self {
            entry:          HoldEntry::Null,
            fix:            None,
            arrival_course: None,
            inbound_course: None,
            chain:          SegmentChain::default(),
        }
    }
}

impl HoldEntryTransition {
    #[must_use]
    pub fn entry(&self) -> HoldEntry { self.entry }

    #[must_use]
    pub fn chain(&self) -> &SegmentChain { &self.chain }
}

/// Completes an entry by intercepting the inbound course before the fix.
///
/// The final turn in `final_turn` ends on a 45 degree intercept from either side of the course.
/// If neither intercept lies before the fix,
/// the entry flies straight to a capture point on the inbound course instead.
fn join_inbound_course(
    builder: PathBuilder,
    fix: LatLong,
    inbound: Heading,
    turn: TurnDirection,
    final_turn: TurnDirection,
    radius: Length,
) -> PathBuilder {
    for intercept_track in [inbound - INTERCEPT_ANGLE * turn, inbound + INTERCEPT_ANGLE * turn] {
        let mut attempt = builder.clone();
        attempt.turn_to(intercept_track, final_turn);
        if let Some(intercept) = attempt.intersection_with(fix, inbound)
            && intercept.along_track_distance(fix, inbound).is_negative()
        {
            attempt.line_to(intercept);
            return attempt;
        }
    }

    let mut capture = builder;
    let before_fix = (-capture.position().along_track_distance(fix, inbound)).max(radius);
    capture.line_to(fix.destination(inbound.opposite(), before_fix));
    capture
}

impl TransitionKind for HoldEntryTransition {
    fn transition_type(&self) -> TransitionType { TransitionType::HoldEntry }

    fn repr(&self) -> String { format!("{} ENTRY", self.entry) }

    fn recompute(
        &mut self,
        prev: &Leg,
        next: &Leg,
        ctx: &RecomputeContext,
    ) -> Result<(), GuidanceError> {
        let leg::Kind::Hold(hold) = &next.kind else {
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "hold entry into a leg that is not a hold",
            });
        };

        // Entries are not rebuilt while flown, since the segment progress would be lost.
        if ctx.is_active && !self.chain.is_empty() {
            return Ok(());
        }

        let (_, arrival) = exit_of(prev)?;
        let fix = hold.fix.position;
        let inbound = hold.inbound_course;
        let turn = hold.turn;
        self.fix = Some(fix);
        self.arrival_course = Some(arrival);
        self.inbound_course = Some(inbound);

        self.entry = HoldEntry::select(arrival, inbound, turn);
        let (radius, leg_length) = hold.predicted_dimensions(ctx.state.altitude);
        if !radius.is_finite() || !radius.is_positive() {
            self.chain = SegmentChain::default();
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "hold entry turn has no radius",
            });
        }

        let outbound = inbound.opposite();
        let mut builder = PathBuilder::new(fix, arrival, radius);
        let final_turn = match self.entry {
            HoldEntry::Null => {
                self.chain = SegmentChain::default();
                return Ok(());
            }
            HoldEntry::Direct => {
                builder.turn_to(outbound, turn).straight(leg_length);
                turn
            }
            HoldEntry::Teardrop => {
                let track = outbound - TEARDROP_OFFSET * turn;
                builder.turn_to(track, arrival.closer_direction_to(track)).straight(leg_length);
                turn
            }
            HoldEntry::Parallel => {
                builder.turn_to(outbound, arrival.closer_direction_to(outbound)).straight(leg_length);
                -turn
            }
        };
        let builder = join_inbound_course(builder, fix, inbound, turn, final_turn, radius);
        self.chain = SegmentChain::new(builder.build());
        Ok(())
    }

    fn update_state(&mut self, state: &AircraftState) { self.chain.update_state(state.position); }

    fn is_null(&self) -> bool { self.chain.is_empty() }

    fn freezes_when_abeam(&self) -> bool { false }

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        self.chain.guidance(state)
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        self.chain.distance_to_go(state.position)
    }

    fn is_abeam(&self, position: LatLong) -> bool { self.chain.is_abeam(position) }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.chain.nominal_roll_angle(ground_speed)
    }

    fn is_circular_arc(&self) -> bool { self.chain.is_arc() }

    fn turn_arc(&self) -> Option<&ArcPath> { self.chain.current_arc() }

    fn path_vectors(&self) -> PathVectors { self.chain.path_vectors() }

    fn terminator(&self) -> Option<LatLong> { self.chain.end().or(self.fix) }

    fn distance(&self) -> Option<Length> { Some(self.chain.length()) }

    fn inbound_course(&self) -> Option<Heading> { self.arrival_course }

    fn outbound_course(&self) -> Option<Heading> { self.inbound_course }
}
