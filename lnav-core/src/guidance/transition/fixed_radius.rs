use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};

use super::{TransitionKind, TransitionType, entry_course_of, exit_of};
use crate::guidance::common::{COURSE_CHANGE_THRESHOLD, fly_by_bank_angle};
use crate::guidance::leg::Leg;
use crate::guidance::path::{ArcPath, PathVectors};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Fly-by turn tangent to both legs at a common fix.
///
/// The bank angle is half the course change,
/// bounded by 5° and the speed-dependent maximum bank.
#[derive(Debug, Clone, Default)]
pub struct FixedRadiusTransition {
    fix:         Option<LatLong>,
    prev_course: Option<Heading>,
    next_course: Option<Heading>,
    arc:         Option<ArcPath>,
    tp_distance: Length,
}

impl FixedRadiusTransition {
    #[must_use]
    pub fn arc(&self) -> Option<&ArcPath> { self.arc.as_ref() }

    /// The initial turning point, where the turn leaves the previous leg.
    #[must_use]
    pub fn itp(&self) -> Option<LatLong> { self.arc.map(|arc| arc.start) }

    /// Outbound course of the previous leg.
    #[must_use]
    pub fn prev_course(&self) -> Option<Heading> { self.prev_course }

    /// Distance between the fix and each turning point.
    #[must_use]
    pub fn turning_point_distance(&self) -> Length { self.tp_distance }
}

impl TransitionKind for FixedRadiusTransition {
    fn transition_type(&self) -> TransitionType { TransitionType::FixedRadius }

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
        let (fix, prev_course) = exit_of(prev)?;
        let next_course = entry_course_of(next)?;
        self.fix = Some(fix);
        self.prev_course = Some(prev_course);
        self.next_course = Some(next_course);
        self.arc = None;
        self.tp_distance = Length::ZERO;

        let course_change = next_course - prev_course;
        let Some(direction) = TurnDirection::from_angle(course_change) else { return Ok(()) };
        if course_change.abs() < COURSE_CHANGE_THRESHOLD {
            return Ok(());
        }

        let bank = fly_by_bank_angle(course_change, ctx.true_airspeed);
        let radius = turn_radius(ctx.true_airspeed, bank);
        let half_bisector = (Angle::STRAIGHT - course_change.abs()) / 2.;
        if !radius.is_finite() || !radius.is_positive() || half_bisector.tan() <= 1e-9 {
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "fly-by turn cannot reverse the course",
            });
        }

        let tp_distance = radius / half_bisector.tan();
        let centre_distance = radius / half_bisector.sin();
        let reciprocal = prev_course.opposite();

        let itp = fix.destination(reciprocal, tp_distance);
        let ftp = fix.destination(next_course, tp_distance);
        let centre = fix.destination(reciprocal - half_bisector * direction, centre_distance);

        self.arc = Some(ArcPath::between(centre, radius, itp, ftp, direction));
        self.tp_distance = tp_distance;
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn is_null(&self) -> bool { self.arc.is_none() }

    fn freezes_when_abeam(&self) -> bool { true }

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        let arc = self.arc.as_ref()?;
        let phi = if arc.sweep.abs() > COURSE_CHANGE_THRESHOLD {
            arc.nominal_roll_angle(state.ground_speed)
        } else {
            Angle::ZERO
        };
        Some(arc.guidance(state, phi))
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

    fn terminator(&self) -> Option<LatLong> { self.arc.map(|arc| arc.end).or(self.fix) }

    fn distance(&self) -> Option<Length> {
        Some(self.arc.as_ref().map_or(Length::ZERO, ArcPath::length))
    }

    fn inbound_course(&self) -> Option<Heading> { self.prev_course }

    fn outbound_course(&self) -> Option<Heading> { self.next_course }
}
