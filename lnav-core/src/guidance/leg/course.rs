use math::{Angle, Heading, LatLong, Length, Speed};
use smallvec::smallvec;
use store::{Fix, LegType};

use super::LegKind;
use crate::guidance::path::{PathVector, PathVectors, StraightPath};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Predicted length of a course-to-altitude leg when no climb is in progress.
pub const CA_PLACEHOLDER_LENGTH: Length = Length::from_nm(2.);

/// Length of the line drawn for a manually terminated heading leg.
pub const VM_DISPLAY_LENGTH: Length = Length::from_nm(5.);

/// Radial intercepts further than this are rejected.
const MAX_INTERCEPT_DISTANCE: Length = Length::from_nm(5000.);

/// Track a course until reaching an altitude.
#[derive(Debug, Clone)]
pub struct CaLeg {
    pub course:       Heading,
    pub altitude:     Length,
    origin:           Option<LatLong>,
    predicted_length: Length,
}

impl CaLeg {
    #[must_use]
    pub fn new(course: Heading, altitude: Length) -> Self {
        Self { course, altitude, origin: None, predicted_length: CA_PLACEHOLDER_LENGTH }
    }

    #[must_use]
    pub fn predicted_length(&self) -> Length { self.predicted_length }

    fn predicted_path(&self) -> Option<StraightPath> {
        Some(StraightPath::from_course(self.origin?, self.course, self.predicted_length))
    }

    /// Distance flown before reaching the altitude at the current climb rate.
    fn distance_to_altitude(&self, state: &AircraftState) -> Option<Length> {
        if state.altitude >= self.altitude {
            return Some(Length::ZERO);
        }
        if !state.vertical_speed.is_positive() {
            return None;
        }

        let seconds = (self.altitude - state.altitude).0 / state.vertical_speed.0;
        Some(Length::new(state.ground_speed.0 * seconds))
    }
}

impl LegKind for CaLeg {
    fn leg_type(&self) -> LegType { LegType::Ca }

    fn ident(&self) -> String { format!("({:.0})", self.altitude.into_feet()) }

    fn repr(&self) -> String {
        format!("CA({:03.0}°) TO {:.0} FT", self.course.degrees(), self.altitude.into_feet())
    }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        self.origin = Some(ctx.start.or(self.origin).unwrap_or(ctx.state.position));

        self.predicted_length = if ctx.is_active {
            self.distance_to_altitude(&ctx.state).unwrap_or(CA_PLACEHOLDER_LENGTH)
        } else {
            CA_PLACEHOLDER_LENGTH
        };
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, _state: &AircraftState) -> Option<GuidanceParameters> {
        Some(GuidanceParameters::Track { course: self.course })
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        self.distance_to_altitude(state)
    }

    fn is_abeam(&self, position: LatLong) -> bool {
        self.origin.is_some_and(|origin| {
            !position.along_track_distance(origin, self.course).is_negative()
        })
    }

    fn nominal_roll_angle(&self, _ground_speed: Speed) -> Angle { Angle::ZERO }

    fn is_circular_arc(&self) -> bool { false }

    fn path_vectors(&self) -> PathVectors {
        self.predicted_path().iter().map(StraightPath::path_vector).collect()
    }

    fn terminator(&self) -> Option<LatLong> { self.predicted_path().map(|path| path.end) }

    fn distance(&self) -> Option<Length> { Some(self.predicted_length) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.course) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.course) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.predicted_path()?.point_before_end(distance_before_terminator)
    }
}

/// Fly a heading until the crew sequences the leg.
#[derive(Debug, Clone)]
pub struct VmLeg {
    pub heading: Heading,
    origin:      Option<LatLong>,
    /// Aircraft position at the last recompute while active.
    last_active: Option<LatLong>,
    is_active:   bool,
}

impl VmLeg {
    #[must_use]
    pub fn new(heading: Heading) -> Self {
        Self { heading, origin: None, last_active: None, is_active: false }
    }
}

impl LegKind for VmLeg {
    fn leg_type(&self) -> LegType { LegType::Vm }

    fn ident(&self) -> String { "MANUAL".into() }

    fn repr(&self) -> String { format!("VM({:03.0}°)", self.heading.degrees()) }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        self.origin = Some(ctx.start.or(self.origin).unwrap_or(ctx.state.position));
        self.is_active = ctx.is_active;
        if ctx.is_active {
            self.last_active = Some(ctx.state.position);
        }
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, _state: &AircraftState) -> Option<GuidanceParameters> {
        Some(GuidanceParameters::Heading { heading: self.heading })
    }

    fn distance_to_go(&self, _state: &AircraftState) -> Option<Length> { None }

    fn is_abeam(&self, _position: LatLong) -> bool { true }

    fn nominal_roll_angle(&self, _ground_speed: Speed) -> Angle { Angle::ZERO }

    fn is_circular_arc(&self) -> bool { false }

    fn path_vectors(&self) -> PathVectors {
        let Some(start) = self.last_active.or(self.origin) else { return PathVectors::new() };
        smallvec![PathVector::Line { start, end: start.destination(self.heading, VM_DISPLAY_LENGTH) }]
    }

    /// Unknown while the leg is flown,
    /// since the leg ends wherever the crew sequences it.
    fn terminator(&self) -> Option<LatLong> {
        if self.is_active {
            return None;
        }
        self.last_active
            .or_else(|| self.origin.map(|origin| origin.destination(self.heading, VM_DISPLAY_LENGTH)))
    }

    fn distance(&self) -> Option<Length> { None }

    fn inbound_course(&self) -> Option<Heading> { Some(self.heading) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.heading) }

    fn pseudo_waypoint_location(&self, _distance_before_terminator: Length) -> Option<LatLong> {
        None
    }
}

/// Track a course until intercepting a radial from a navaid.
#[derive(Debug, Clone)]
pub struct CrLeg {
    pub course: Heading,
    pub navaid: Fix,
    pub radial: Heading,
    path:       Option<StraightPath>,
}

impl CrLeg {
    #[must_use]
    pub fn new(course: Heading, navaid: Fix, radial: Heading) -> Self {
        Self { course, navaid, radial, path: None }
    }

    #[must_use]
    pub fn intercept(&self) -> Option<LatLong> { self.path.map(|path| path.end) }
}

impl LegKind for CrLeg {
    fn leg_type(&self) -> LegType { LegType::Cr }

    fn ident(&self) -> String {
        let prefix: String = self.navaid.ident.chars().take(3).collect();
        format!("{prefix}{:03.0}", self.radial.degrees())
    }

    fn repr(&self) -> String {
        format!(
            "CR({:03.0}°) TO {} R{:03.0}",
            self.course.degrees(),
            self.navaid.ident,
            self.radial.degrees()
        )
    }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        let origin = ctx
            .start
            .or(self.path.map(|path| path.start))
            .unwrap_or(ctx.state.position);

        let intercept = origin
            .intersection(self.course, self.navaid.position, self.radial)
            .filter(|&point| origin.distance_to(point) < MAX_INTERCEPT_DISTANCE);
        let Some(intercept) = intercept else {
            self.path = None;
            return Err(GuidanceError::MissingTerminator { index: ctx.index, leg_type: LegType::Cr });
        };

        self.path = Some(StraightPath::new(origin, intercept));
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, _state: &AircraftState) -> Option<GuidanceParameters> {
        Some(GuidanceParameters::Track { course: self.course })
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        Some(self.path.as_ref()?.distance_to_go(state.position))
    }

    fn is_abeam(&self, position: LatLong) -> bool {
        self.path.as_ref().is_some_and(|path| path.is_abeam(position))
    }

    fn nominal_roll_angle(&self, _ground_speed: Speed) -> Angle { Angle::ZERO }

    fn is_circular_arc(&self) -> bool { false }

    fn path_vectors(&self) -> PathVectors {
        self.path.iter().map(StraightPath::path_vector).collect()
    }

    fn terminator(&self) -> Option<LatLong> { self.intercept() }

    fn distance(&self) -> Option<Length> { self.path.map(|path| path.length) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.course) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.course) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.path?.point_before_end(distance_before_terminator)
    }
}
