//! Flight plan legs as computed path geometry.

use math::{Angle, Heading, LatLong, Length, Speed};
use store::{AltitudeConstraint, LegType, SegmentType, SpeedConstraint};

use super::path::PathVectors;
use super::{AircraftState, Guidable, GuidanceError, GuidanceParameters, RecomputeContext};

mod arc;
pub use arc::{AfLeg, RfLeg};
mod course;
pub use course::{CaLeg, CrLeg, VmLeg};
mod fix;
pub use fix::{DfLeg, IfLeg, TfLeg};
mod hold;
pub use hold::{HoldLeg, HoldPattern, HoldPhase, hold_speed};


#[portrait::make]
pub trait LegKind {
    fn leg_type(&self) -> LegType;

    /// Name of the terminator as shown to the crew.
    fn ident(&self) -> String;

    fn repr(&self) -> String;

    /// Rebuilds the path geometry from the current inputs.
    fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError>;

    /// Advances internal state machines from the latest aircraft state.
    fn update_state(&mut self, state: &AircraftState);

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters>;

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length>;

    fn is_abeam(&self, position: LatLong) -> bool;

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle;

    fn is_circular_arc(&self) -> bool;

    fn path_vectors(&self) -> PathVectors;

    fn terminator(&self) -> Option<LatLong>;

    fn distance(&self) -> Option<Length>;

    fn inbound_course(&self) -> Option<Heading>;

    fn outbound_course(&self) -> Option<Heading>;

    /// The point on the path `distance_before_terminator` before the terminator.
    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong>;
}

#[derive(Debug, Clone, derive_more::From)]
#[portrait::derive(LegKind with portrait::derive_delegate)]
pub enum Kind {
    If(IfLeg),
    Tf(TfLeg),
    Df(DfLeg),
    Rf(RfLeg),
    Af(AfLeg),
    Ca(CaLeg),
    Vm(VmLeg),
    Cr(CrLeg),
    Hold(HoldLeg),
}

/// Flight plan attributes carried alongside the geometry.
#[derive(Debug, Clone, Default)]
pub struct LegInfo {
    pub segment:             SegmentType,
    pub altitude_constraint: Option<AltitudeConstraint>,
    pub speed_constraint:    Option<SpeedConstraint>,
    pub predicted_speed:     Option<Speed>,
    /// The flight plan leg type this leg stands in for,
    /// if the flight plan leg has no dedicated geometry.
    pub substituted_for:     Option<LegType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegStatus {
    /// Not computed yet.
    Pending,
    Computed,
    /// The last recompute failed. Guidance is unavailable until a recompute succeeds.
    Failed(GuidanceError),
}

#[derive(Debug, Clone)]
pub struct Leg {
    /// Index of the leg in the flight plan.
    pub index: usize,
    pub info:  LegInfo,
    pub kind:  Kind,
    status:    LegStatus,
}

impl Leg {
    pub fn new(index: usize, info: LegInfo, kind: impl Into<Kind>) -> Self {
        Self { index, info, kind: kind.into(), status: LegStatus::Pending }
    }

    #[must_use]
    pub fn status(&self) -> &LegStatus { &self.status }

    #[must_use]
    pub fn is_computed(&self) -> bool { self.status == LegStatus::Computed }

    #[must_use]
    pub fn leg_type(&self) -> LegType { self.kind.leg_type() }

    #[must_use]
    pub fn ident(&self) -> String { self.kind.ident() }

    pub fn recompute(&mut self, ctx: &RecomputeContext) -> Result<(), GuidanceError> {
        match self.kind.recompute(ctx) {
            Ok(()) => {
                self.status = LegStatus::Computed;
                Ok(())
            }
            Err(err) => {
                self.status = LegStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    pub fn update_state(&mut self, state: &AircraftState) {
        if self.is_computed() {
            self.kind.update_state(state);
        }
    }

    #[must_use]
    pub fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<LatLong> {
        if !self.is_computed() {
            return None;
        }
        self.kind.pseudo_waypoint_location(distance_before_terminator)
    }
}

impl Guidable for Leg {
    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        if !self.is_computed() {
            return None;
        }
        self.kind.guidance_parameters(state)
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        if !self.is_computed() {
            return None;
        }
        self.kind.distance_to_go(state)
    }

    fn is_abeam(&self, position: LatLong) -> bool {
        self.is_computed() && self.kind.is_abeam(position)
    }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        self.kind.nominal_roll_angle(ground_speed)
    }

    fn is_circular_arc(&self) -> bool { self.kind.is_circular_arc() }

    fn path_vectors(&self) -> PathVectors {
        if !self.is_computed() {
            return PathVectors::new();
        }
        self.kind.path_vectors()
    }

    fn terminator(&self) -> Option<LatLong> { self.kind.terminator() }

    fn distance(&self) -> Option<Length> { self.kind.distance() }

    fn inbound_course(&self) -> Option<Heading> { self.kind.inbound_course() }

    fn outbound_course(&self) -> Option<Heading> { self.kind.outbound_course() }

    fn repr(&self) -> String {
        match self.info.substituted_for {
            Some(original) => format!("{} (FOR {original})", self.kind.repr()),
            None => self.kind.repr(),
        }
    }
}
