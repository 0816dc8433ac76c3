use math::{Angle, Heading, LatLong, Length, Speed};
use smallvec::smallvec;
use store::{Fix, LegType};

use super::LegKind;
use crate::guidance::path::{PathVectors, StraightPath};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

/// Direct-to legs shorter than this have no defined course.
const MIN_DIRECT_LENGTH: Length = Length::from_nm(0.001);

/// The first fix of a sequence of legs.
///
/// An initial fix has no path of its own.
#[derive(Debug, Clone)]
pub struct IfLeg {
    pub fix: Fix,
}

impl LegKind for IfLeg {
    fn leg_type(&self) -> LegType { LegType::If }

    fn ident(&self) -> String { self.fix.ident.clone() }

    fn repr(&self) -> String { format!("IF AT {}", self.fix.ident) }

    fn recompute(&mut self, _ctx: &RecomputeContext) -> Result<(), GuidanceError> { Ok(()) }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, _state: &AircraftState) -> Option<GuidanceParameters> { None }

    fn distance_to_go(&self, _state: &AircraftState) -> Option<Length> { None }

    fn is_abeam(&self, _position: LatLong) -> bool { false }

    fn nominal_roll_angle(&self, _ground_speed: Speed) -> Angle { Angle::ZERO }

    fn is_circular_arc(&self) -> bool { false }

    fn path_vectors(&self) -> PathVectors { PathVectors::new() }

    fn terminator(&self) -> Option<LatLong> { Some(self.fix.position) }

    fn distance(&self) -> Option<Length> { Some(Length::ZERO) }

    fn inbound_course(&self) -> Option<Heading> { None }

    fn outbound_course(&self) -> Option<Heading> { None }

    fn pseudo_waypoint_location(&self, _distance_before_terminator: Length) -> Option<LatLong> {
        None
    }
}

/// Great circle track from one fix to the next.
#[derive(Debug, Clone)]
pub struct TfLeg {
    pub from: Fix,
    pub to:   Fix,
    path:     StraightPath,
}

impl TfLeg {
    #[must_use]
    pub fn new(from: Fix, to: Fix) -> Self {
        let path = StraightPath::new(from.position, to.position);
        Self { from, to, path }
    }

    #[must_use]
    pub fn path(&self) -> &StraightPath { &self.path }
}

impl LegKind for TfLeg {
    fn leg_type(&self) -> LegType { LegType::Tf }

    fn ident(&self) -> String { self.to.ident.clone() }

    fn repr(&self) -> String { format!("TF FROM {} TO {}", self.from.ident, self.to.ident) }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        if self.path.length.is_positive() {
            Ok(())
        } else {
            Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "track between coincident fixes",
            })
        }
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(self.path.guidance(state))
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        Some(self.path.distance_to_go(state.position))
    }

    fn is_abeam(&self, position: LatLong) -> bool { self.path.is_abeam(position) }

    fn nominal_roll_angle(&self, _ground_speed: Speed) -> Angle { Angle::ZERO }

    fn is_circular_arc(&self) -> bool { false }

    fn path_vectors(&self) -> PathVectors { smallvec![self.path.path_vector()] }

    fn terminator(&self) -> Option<LatLong> { Some(self.to.position) }

    fn distance(&self) -> Option<Length> { Some(self.path.length) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.path.course) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.path.final_course) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.path.point_before_end(distance_before_terminator)
    }
}

/// Direct track from an origin to a fix.
///
/// The origin is the terminator of the preceding guidable if there is one.
/// Otherwise it is the aircraft position when the leg is first computed,
/// and stays there across later recomputes.
#[derive(Debug, Clone)]
pub struct DfLeg {
    pub fix: Fix,
    origin:  Option<LatLong>,
    path:    Option<StraightPath>,
}

impl DfLeg {
    #[must_use]
    pub fn new(fix: Fix) -> Self { Self { fix, origin: None, path: None } }

    #[must_use]
    pub fn origin(&self) -> Option<LatLong> { self.origin }
}

impl LegKind for DfLeg {
    fn leg_type(&self) -> LegType { LegType::Df }

    fn ident(&self) -> String { self.fix.ident.clone() }

    fn repr(&self) -> String { format!("DF TO {}", self.fix.ident) }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        let origin = ctx.start.or(self.origin).unwrap_or(ctx.state.position);
        self.origin = Some(origin);

        let path = StraightPath::new(origin, self.fix.position);
        if path.length < MIN_DIRECT_LENGTH {
            self.path = None;
            return Err(GuidanceError::DegenerateGeometry {
                index:  ctx.index,
                reason: "direct-to origin coincides with the fix",
            });
        }
        self.path = Some(path);
        Ok(())
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(self.path.as_ref()?.guidance(state))
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

    fn terminator(&self) -> Option<LatLong> { Some(self.fix.position) }

    fn distance(&self) -> Option<Length> { self.path.map(|path| path.length) }

    fn inbound_course(&self) -> Option<Heading> { self.path.map(|path| path.course) }

    fn outbound_course(&self) -> Option<Heading> { self.path.map(|path| path.final_course) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.path?.point_before_end(distance_before_terminator)
    }
}
