use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};

use super::{TransitionKind, TransitionType, entry_course_of, exit_of};
use crate::guidance::common::{COURSE_CHANGE_THRESHOLD, fly_by_bank_angle};
use crate::guidance::leg::Leg;
use crate::guidance::path::{ArcPath, PathBuilder, PathVectors, SegmentChain};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Angle at which the next course is intercepted after overshooting it.
pub const INTERCEPT_ANGLE: Angle = Angle::from_degrees(45.);

/// Fly-over turn at the fix, followed by a 45° intercept of the next course.
#[derive(Debug, Clone, Default)]
pub struct CourseCaptureTransition {
    fix:         Option<LatLong>,
    prev_course: Option<Heading>,
    next_course: Option<Heading>,
    chain:       SegmentChain,
}

impl CourseCaptureTransition {
    #[must_use]
    pub fn chain(&self) -> &SegmentChain { &self.chain }
}

impl TransitionKind for CourseCaptureTransition {
    fn transition_type(&self) -> TransitionType { TransitionType::CourseCapture }

    fn repr(&self) -> String {
        if self.chain.is_empty() {
            "NULL".into()
        } else {
            format!("CAPTURE {:.1} NM", self.chain.length().into_nm())
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
        self.chain = SegmentChain::default();

        let course_change = next_course - prev_course;
        if course_change.abs() < COURSE_CHANGE_THRESHOLD {
            return Ok(());
        }
        let direction =
            TurnDirection::from_angle(course_change).unwrap_or(TurnDirection::Clockwise);

        let bank = fly_by_bank_angle(course_change, ctx.true_airspeed);
        let radius = turn_radius(ctx.true_airspeed, bank);
        if !radius.is_finite() || !radius.is_positive() {
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "fly-over turn has no radius",
            });
        }

        let mut builder = PathBuilder::new(fix, prev_course, radius);
        builder.turn_to(next_course + INTERCEPT_ANGLE * direction, direction);

        let intercept = builder
            .intersection_with(fix, next_course)
            .filter(|point| point.along_track_distance(fix, next_course).is_positive())
            .ok_or(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "fly-over turn does not intercept the next course",
            })?;
        builder.line_to(intercept);

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

    fn inbound_course(&self) -> Option<Heading> { self.prev_course }

    fn outbound_course(&self) -> Option<Heading> { self.next_course }
}
