use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};

use super::{TransitionKind, TransitionType, entry_course_of, exit_of};
use crate::guidance::common::{COURSE_CHANGE_THRESHOLD, MAX_ROLL_ANGLE};
use crate::guidance::leg::Leg;
use crate::guidance::path::{ArcPath, PathVectors};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Turn onto the course of the next leg, starting at the end of the previous leg.
///
/// While flown, the turn is recomputed from the present position and track,
/// so that only the remaining course change is considered.
#[derive(Debug, Clone, Default)]
pub struct PathCaptureTransition {
    start:       Option<LatLong>,
    prev_course: Option<Heading>,
    next_course: Option<Heading>,
    arc:         Option<ArcPath>,
}

impl PathCaptureTransition {
    #[must_use]
    pub fn arc(&self) -> Option<&ArcPath> { self.arc.as_ref() }
}

impl TransitionKind for PathCaptureTransition {
    fn transition_type(&self) -> TransitionType { TransitionType::PathCapture }

    fn repr(&self) -> String {
        match &self.arc {
            Some(arc) => format!("R{:.2} {:+.0}°", arc.radius.into_nm(), arc.sweep.into_degrees()),
            None => "NULL".into(),
        }
    }

    fn recompute(
        &mut self,
        prev: &Leg,
        next: &Leg,
        ctx: &RecomputeContext,
    ) -> Result<(), GuidanceError> {
        let (start, prev_course) = if ctx.is_active {
            (ctx.state.position, ctx.state.true_track)
        } else {
            exit_of(prev)?
        };
        let next_course = entry_course_of(next)?;
        self.start = Some(start);
        self.prev_course = Some(prev_course);
        self.next_course = Some(next_course);
        self.arc = None;

        let course_change = next_course - prev_course;
        let Some(direction) = TurnDirection::from_angle(course_change) else { return Ok(()) };
        if course_change.abs() < COURSE_CHANGE_THRESHOLD {
            return Ok(());
        }

        let radius = turn_radius(ctx.ground_speed, MAX_ROLL_ANGLE);
        if !radius.is_finite() || !radius.is_positive() {
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "path capture turn has no radius",
            });
        }

        let centre = start.destination(prev_course + Angle::RIGHT * direction, radius);
        self.arc = Some(ArcPath::new(centre, radius, centre.bearing_to(start), course_change));
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn is_null(&self) -> bool { self.arc.is_none() }

    fn freezes_when_abeam(&self) -> bool { false }

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        let arc = self.arc.as_ref()?;
        Some(arc.guidance(state, arc.nominal_roll_angle(state.ground_speed)))
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        Some(self.arc.as_ref()?.distance_to_go(state.position))
    }

    fn is_abeam(&self, position: LatLong) -> bool {
        self.arc.as_ref().is_some_and(|arc| arc.is_abeam(position))
    }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.arc.as_ref().map_or(Angle::ZERO, |arc| arc.nominal_roll_angle(ground_speed))
    }

    fn is_circular_arc(&self) -> bool { self.arc.is_some() }

    fn turn_arc(&self) -> Option<&ArcPath> { self.arc.as_ref() }

    fn path_vectors(&self) -> PathVectors {
        self.arc.iter().map(ArcPath::path_vector).collect()
    }

    fn terminator(&self) -> Option<LatLong> { self.arc.map(|arc| arc.end).or(self.start) }

    fn distance(&self) -> Option<Length> {
        Some(self.arc.as_ref().map_or(Length::ZERO, ArcPath::length))
    }

    fn inbound_course(&self) -> Option<Heading> { self.prev_course }

    fn outbound_course(&self) -> Option<Heading> { self.next_course }
}
