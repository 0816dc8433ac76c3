use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection};
use smallvec::smallvec;
use store::{Fix, LegType};

use super::LegKind;
use crate::guidance::path::{ArcPath, PathVectors};
use crate::guidance::{AircraftState, GuidanceError, GuidanceParameters, RecomputeContext};

fn check_arc(arc: &ArcPath, index: usize) -> Result<(), GuidanceError> {
    if !arc.radius.is_positive() || !arc.radius.is_finite() {
        return Err(GuidanceError::DegenerateGeometry { index, reason: "arc radius is not positive" });
    }
    if arc.sweep.is_zero() {
        return Err(GuidanceError::DegenerateGeometry { index, reason: "arc does not sweep" });
    }
    Ok(())
}

fn arc_guidance(arc: &ArcPath, state: &AircraftState) -> GuidanceParameters {
    arc.guidance(state, arc.nominal_roll_angle(state.ground_speed))
}

/// Constant radius turn around a fixed centre,
/// from the previous fix to the terminator fix.
#[derive(Debug, Clone)]
pub struct RfLeg {
    pub from: Fix,
    pub to:   Fix,
    arc:      ArcPath,
}

impl RfLeg {
    /// The radius is taken from the distance between `centre` and `to`.
    /// Without an explicit direction, the shorter way around is flown.
    #[must_use]
    pub fn new(from: Fix, to: Fix, centre: LatLong, turn: Option<TurnDirection>) -> Self {
        let radius = centre.distance_to(to.position);
        let direction = turn.unwrap_or_else(|| {
            centre.bearing_to(from.position).closer_direction_to(centre.bearing_to(to.position))
        });
        let arc = ArcPath::between(centre, radius, from.position, to.position, direction);
        Self { from, to, arc }
    }

    #[must_use]
    pub fn arc(&self) -> &ArcPath { &self.arc }
}

impl LegKind for RfLeg {
    fn leg_type(&self) -> LegType { LegType::Rf }

    fn ident(&self) -> String { self.to.ident.clone() }

    fn repr(&self) -> String {
        format!("RF FROM {} TO {} R{:.1}", self.from.ident, self.to.ident, self.arc.radius.into_nm())
    }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        check_arc(&self.arc, ctx.index)
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(arc_guidance(&self.arc, state))
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        Some(self.arc.distance_to_go(state.position))
    }

    fn is_abeam(&self, position: LatLong) -> bool { self.arc.is_abeam(position) }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.arc.nominal_roll_angle(ground_speed)
    }

    fn is_circular_arc(&self) -> bool { true }

    fn path_vectors(&self) -> PathVectors { smallvec![self.arc.path_vector()] }

    fn terminator(&self) -> Option<LatLong> { Some(self.to.position) }

    fn distance(&self) -> Option<Length> { Some(self.arc.length()) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.arc.inbound_course()) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.arc.outbound_course()) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.arc.point_before_end(distance_before_terminator)
    }
}

/// DME arc around a navaid,
/// from the boundary radial to the terminator fix.
#[derive(Debug, Clone)]
pub struct AfLeg {
    pub navaid:          Fix,
    pub to:              Fix,
    pub boundary_radial: Heading,
    arc:                 ArcPath,
}

impl AfLeg {
    #[must_use]
    pub fn new(navaid: Fix, to: Fix, boundary_radial: Heading, turn: TurnDirection) -> Self {
        let radius = navaid.position.distance_to(to.position);
        let sweep = boundary_radial.distance(navaid.position.bearing_to(to.position), turn);
        let arc = ArcPath::new(navaid.position, radius, boundary_radial, sweep);
        Self { navaid, to, boundary_radial, arc }
    }

    #[must_use]
    pub fn arc(&self) -> &ArcPath { &self.arc }
}

impl LegKind for AfLeg {
    fn leg_type(&self) -> LegType { LegType::Af }

    fn ident(&self) -> String { self.to.ident.clone() }

    fn repr(&self) -> String {
        format!(
            "AF {} {:.1} DME FROM R{:03.0} TO {}",
            self.navaid.ident,
            self.arc.radius.into_nm(),
            self.boundary_radial.degrees(),
            self.to.ident,
        )
    }

    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        check_arc(&self.arc, ctx.index)
    }

    fn update_state(&mut self, _state: &AircraftState) {}

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        Some(arc_guidance(&self.arc, state))
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        Some(self.arc.distance_to_go(state.position))
    }

    fn is_abeam(&self, position: LatLong) -> bool { self.arc.is_abeam(position) }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.arc.nominal_roll_angle(ground_speed)
    }

    fn is_circular_arc(&self) -> bool { true }

    fn path_vectors(&self) -> PathVectors { smallvec![self.arc.path_vector()] }

    fn terminator(&self) -> Option<LatLong> { Some(self.to.position) }

    fn distance(&self) -> Option<Length> { Some(self.arc.length()) }

    fn inbound_course(&self) -> Option<Heading> { Some(self.arc.inbound_course()) }

    fn outbound_course(&self) -> Option<Heading> { Some(self.arc.outbound_course()) }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        self.arc.point_before_end(distance_before_terminator)
    }
}
