use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};

use super::{TransitionKind, TransitionType, exit_of, missing_terminator};
use crate::guidance::common::{COURSE_CHANGE_THRESHOLD, MAX_ROLL_ANGLE, roll_anticipation_distance};
use crate::guidance::leg::Leg;
use crate::guidance::path::{ArcPath, PathVectors};
use crate::guidance::{AircraftState, Guidable, GuidanceError, GuidanceParameters, RecomputeContext};

/// Turn from the previous leg until the next fix is straight ahead.
///
/// The turn starts one roll anticipation distance before the previous terminator.
/// If the fix lies inside the turn circle, the transition reverts to a direct join
/// at the previous terminator.
#[derive(Debug, Clone, Default)]
pub struct DirectToFixTransition {
    prev_terminator: Option<LatLong>,
    prev_course:     Option<Heading>,
    arc:             Option<ArcPath>,
    reverted:        bool,
}

impl DirectToFixTransition {
    #[must_use]
    pub fn arc(&self) -> Option<&ArcPath> { self.arc.as_ref() }

    /// Whether the last recompute fell back to a direct join
    /// because the fix is inside the turn circle.
    #[must_use]
    pub fn is_reverted(&self) -> bool { self.reverted }
}

impl TransitionKind for DirectToFixTransition {
    fn transition_type(&self) -> TransitionType { TransitionType::DirectToFix }

    fn repr(&self) -> String {
        match &self.arc {
            Some(arc) => format!("R{:.2} {:+.0}°", arc.radius.into_nm(), arc.sweep.into_degrees()),
            None if self.reverted => "DIRECT (REVERTED)".into(),
            None => "NULL".into(),
        }
    }

    fn recompute(
        &mut self,
        prev: &Leg,
        next: &Leg,
        ctx: &RecomputeContext,
    ) -> Result<(), GuidanceError> {
        let (prev_terminator, prev_course) = exit_of(prev)?;
        let target = next.terminator().ok_or_else(|| missing_terminator(next))?;
        self.prev_terminator = Some(prev_terminator);
        self.prev_course = Some(prev_course);
        self.arc = None;
        self.reverted = false;

        let track_change = prev_terminator.bearing_to(target) - prev_course;
        let Some(direction) = TurnDirection::from_angle(track_change) else { return Ok(()) };
        if track_change.abs() < COURSE_CHANGE_THRESHOLD {
            return Ok(());
        }

        let radius = turn_radius(ctx.ground_speed, MAX_ROLL_ANGLE);
        if !radius.is_finite() || !radius.is_positive() {
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "direct-to-fix turn has no radius",
            });
        }

        let rad = roll_anticipation_distance(ctx.ground_speed, MAX_ROLL_ANGLE);
        let itp = prev_terminator.destination(prev_course.opposite(), rad);
        let centre = itp.destination(prev_course + Angle::RIGHT * direction, radius);

        let centre_to_target = centre.distance_to(target);
        if centre_to_target < radius {
            bevy::log::debug!(
                "{} lies inside the turn circle after {}, joining directly",
                next.repr(),
                prev.repr(),
            );
            self.reverted = true;
            return Ok(());
        }

        let tangent_offset = Angle::acos(radius / centre_to_target);
        let tangent_bearing = centre.bearing_to(target) - tangent_offset * direction;
        let start_bearing = centre.bearing_to(itp);
        let sweep = start_bearing.distance(tangent_bearing, direction);

        self.arc = Some(ArcPath::new(centre, radius, start_bearing, sweep));
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn is_null(&self) -> bool { self.arc.is_none() }

    fn freezes_when_abeam(&self) -> bool { true }

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

    fn terminator(&self) -> Option<LatLong> {
        self.arc.map(|arc| arc.end).or(self.prev_terminator)
    }

    fn distance(&self) -> Option<Length> {
        Some(self.arc.as_ref().map_or(Length::ZERO, ArcPath::length))
    }

    fn inbound_course(&self) -> Option<Heading> { self.prev_course }

    fn outbound_course(&self) -> Option<Heading> { self.arc.map(|arc| arc.outbound_course()) }
}
