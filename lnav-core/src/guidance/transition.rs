//! Turns joining consecutive legs.

use math::{Angle, Heading, LatLong, Length, Speed};

use super::leg::Leg;
use super::path::{ArcPath, PathVectors};
use super::{AircraftState, Guidable, GuidanceError, GuidanceParameters, RecomputeContext};

mod course_capture;
pub use course_capture::CourseCaptureTransition;
mod direct_to_fix;
pub use direct_to_fix::DirectToFixTransition;
mod fixed_radius;
pub use fixed_radius::FixedRadiusTransition;
mod hold_entry;
pub use hold_entry::{HoldEntry, HoldEntryTransition};
mod path_capture;
pub use path_capture::PathCaptureTransition;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum TransitionType {
    /// Fly-by turn at a fix.
    #[strum(to_string = "TYPE 1")]
    FixedRadius,
    /// Fly-over turn followed by a course intercept.
    #[strum(to_string = "TYPE 2")]
    CourseCapture,
    /// Turn onto the course of a floating leg.
    #[strum(to_string = "TYPE 3")]
    PathCapture,
    /// Turn towards a fix followed by a direct track.
    #[strum(to_string = "TYPE 4")]
    DirectToFix,
    /// Entry procedure into a hold.
    #[strum(to_string = "TYPE 5")]
    HoldEntry,
}

#[portrait::make]
pub trait TransitionKind {
    fn transition_type(&self) -> TransitionType;

    fn repr(&self) -> String;

    /// Rebuilds the turn geometry from the joined legs.
    fn recompute(
        &mut self,
        prev: &Leg,
        next: &Leg,
        ctx: &RecomputeContext,
    ) -> Result<(), GuidanceError>;

    fn update_state(&mut self, state: &AircraftState);

    /// Whether the computed geometry has nothing to fly,
    /// in which case the legs join directly.
    fn is_null(&self) -> bool;

    /// Whether the geometry is frozen once the aircraft is abeam it.
    fn freezes_when_abeam(&self) -> bool;

    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters>;

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length>;

    fn is_abeam(&self, position: LatLong) -> bool;

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle;

    fn is_circular_arc(&self) -> bool;

    /// The circular turn being flown, or the next one ahead.
    fn turn_arc(&self) -> Option<&ArcPath>;

    fn path_vectors(&self) -> PathVectors;

    fn terminator(&self) -> Option<LatLong>;

    fn distance(&self) -> Option<Length>;

    fn inbound_course(&self) -> Option<Heading>;

    fn outbound_course(&self) -> Option<Heading>;
}

#[derive(Debug, Clone, derive_more::From)]
#[portrait::derive(TransitionKind with portrait::derive_delegate)]
pub enum Kind {
    FixedRadius(FixedRadiusTransition),
    CourseCapture(CourseCaptureTransition),
    PathCapture(PathCaptureTransition),
    DirectToFix(DirectToFixTransition),
    HoldEntry(HoldEntryTransition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum TransitionState {
    /// No usable geometry.
    Pending,
    Computed,
    /// Geometry is fixed and ignores further recomputes.
    Frozen,
}

/// The transition from leg `index` to leg `index + 1`.
#[derive(Debug, Clone)]
pub struct Transition {
    pub index: usize,
    pub kind:  Kind,
    state:     TransitionState,
}

impl Transition {
    pub fn new(index: usize, kind: impl Into<Kind>) -> Self {
        Self { index, kind: kind.into(), state: TransitionState::Pending }
    }

    #[must_use]
    pub fn state(&self) -> TransitionState { self.state }

    #[must_use]
    pub fn transition_type(&self) -> TransitionType { self.kind.transition_type() }

    /// Whether the transition has geometry that should be flown.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.state != TransitionState::Pending && !self.kind.is_null()
    }

    pub fn recompute(
        &mut self,
        prev: &Leg,
        next: &Leg,
        ctx: &RecomputeContext,
    ) -> Result<(), GuidanceError> {
        if self.state == TransitionState::Frozen {
            return Ok(());
        }

        match self.kind.recompute(prev, next, ctx) {
            Ok(()) => {
                self.state = TransitionState::Computed;
                Ok(())
            }
            Err(err) => {
                self.state = TransitionState::Pending;
                Err(err)
            }
        }
    }

    /// Freezes a computed transition if its type freezes on abeam.
    pub fn freeze(&mut self) {
        if self.state == TransitionState::Computed && self.kind.freezes_when_abeam() {
            self.state = TransitionState::Frozen;
        }
    }

    pub fn update_state(&mut self, state: &AircraftState) {
        if self.is_usable() {
            self.kind.update_state(state);
        }
    }

    fn turn_arc(&self) -> Option<&ArcPath> {
        if !self.is_usable() {
            return None;
        }
        self.kind.turn_arc()
    }

    #[must_use]
    pub fn radius(&self) -> Option<Length> { Some(self.turn_arc()?.radius) }

    #[must_use]
    pub fn centre(&self) -> Option<LatLong> { Some(self.turn_arc()?.centre) }

    /// Signed sweep of the turn, positive clockwise.
    #[must_use]
    pub fn sweep(&self) -> Option<Angle> { Some(self.turn_arc()?.sweep) }

    /// Where the turn starts.
    #[must_use]
    pub fn initial_turning_point(&self) -> Option<LatLong> { Some(self.turn_arc()?.start) }

    /// Where the turn ends.
    #[must_use]
    pub fn final_turning_point(&self) -> Option<LatLong> { Some(self.turn_arc()?.end) }
}

impl Guidable for Transition {
    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters> {
        if !self.is_usable() {
            return None;
        }
        self.kind.guidance_parameters(state)
    }

    fn distance_to_go(&self, state: &AircraftState) -> Option<Length> {
        if !self.is_usable() {
            return None;
        }
        self.kind.distance_to_go(state)
    }

    fn is_abeam(&self, position: LatLong) -> bool {
        self.is_usable() && self.kind.is_abeam(position)
    }

    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle {
        if !self.is_usable() {
            return Angle::ZERO;
        }
        self.kind.nominal_roll_angle(ground_speed)
    }

    fn is_circular_arc(&self) -> bool { self.is_usable() && self.kind.is_circular_arc() }

    fn path_vectors(&self) -> PathVectors {
        if !self.is_usable() {
            return PathVectors::new();
        }
        self.kind.path_vectors()
    }

    fn terminator(&self) -> Option<LatLong> {
        if self.state == TransitionState::Pending {
            return None;
        }
        self.kind.terminator()
    }

    fn distance(&self) -> Option<Length> {
        if self.state == TransitionState::Pending {
            return None;
        }
        self.kind.distance()
    }

    fn inbound_course(&self) -> Option<Heading> { self.kind.inbound_course() }

    fn outbound_course(&self) -> Option<Heading> { self.kind.outbound_course() }

    fn repr(&self) -> String { format!("{} {}", self.kind.transition_type(), self.kind.repr()) }
}

fn missing_terminator(leg: &Leg) -> GuidanceError {
    GuidanceError::MissingTerminator { index: leg.index, leg_type: leg.leg_type() }
}

/// Terminator and outbound course of the leg before a transition.
fn exit_of(prev: &Leg) -> Result<(LatLong, Heading), GuidanceError> {
    let terminator = prev.terminator().ok_or_else(|| missing_terminator(prev))?;
    let course = prev.outbound_course().ok_or_else(|| missing_terminator(prev))?;
    Ok((terminator, course))
}

fn entry_course_of(next: &Leg) -> Result<Heading, GuidanceError> {
    next.inbound_course().ok_or_else(|| missing_terminator(next))
}
