use bevy::ecs::component::Component;
use math::{Angle, Heading, LatLong, Length, Speed};
use serde::Serialize;

use super::path::PathVectors;

/// Kinematic state of the aircraft sampled for one guidance frame.
#[derive(Debug, Clone, Copy, PartialEq, Component, Serialize)]
pub struct AircraftState {
    pub position:       LatLong,
    pub true_track:     Heading,
    pub true_airspeed:  Speed,
    pub ground_speed:   Speed,
    /// Pressure altitude above mean sea level.
    pub altitude:       Length,
    pub vertical_speed: Speed,
}

/// Steering output of one guidable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GuidanceParameters {
    /// Hold a ground track.
    Track { course: Heading },
    /// Hold a heading.
    Heading { heading: Heading },
    /// Follow the computed path.
    LateralPath {
        /// Positive when the path lies to the right of the aircraft.
        cross_track_error: Length,
        /// Desired track minus actual track.
        track_angle_error: Angle,
        /// Feed-forward bank angle, positive to the right.
        phi_command:       Angle,
    },
}

impl GuidanceParameters {
    #[must_use]
    pub fn law(&self) -> ControlLaw {
        match self {
            Self::Track { .. } => ControlLaw::Track,
            Self::Heading { .. } => ControlLaw::Heading,
            Self::LateralPath { .. } => ControlLaw::LateralPath,
        }
    }

    #[must_use]
    pub fn phi_command(&self) -> Angle {
        match *self {
            Self::LateralPath { phi_command, .. } => phi_command,
            Self::Track { .. } | Self::Heading { .. } => Angle::ZERO,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Track { course: direction } | Self::Heading { heading: direction } => {
                direction.radians().is_finite()
            }
            Self::LateralPath { cross_track_error, track_angle_error, phi_command } => {
                cross_track_error.is_finite()
                    && track_angle_error.is_finite()
                    && phi_command.is_finite()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum ControlLaw {
    Track,
    Heading,
    LateralPath,
}

/// Identifies a guidable within a geometry by the flight plan index it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GuidableId {
    Leg(usize),
    /// The transition from leg `n` to leg `n + 1`.
    Transition(usize),
}

/// A piece of lateral path that can be flown.
///
/// Implemented by both legs and transitions.
/// Every query is pure; state machines are advanced separately.
pub trait Guidable {
    /// Steering parameters for the given aircraft state,
    /// or `None` if the guidable is not computed.
    fn guidance_parameters(&self, state: &AircraftState) -> Option<GuidanceParameters>;

    /// Remaining path distance to the terminator.
    ///
    /// May be negative once the terminator has been passed.
    /// Returns `None` if there is no meaningful terminator.
    fn distance_to_go(&self, state: &AircraftState) -> Option<Length>;

    /// Whether `position` lies within the along-path extent of this guidable.
    fn is_abeam(&self, position: LatLong) -> bool;

    /// Signed bank angle nominally flown on this guidable at `ground_speed`.
    fn nominal_roll_angle(&self, ground_speed: Speed) -> Angle;

    fn is_circular_arc(&self) -> bool;

    fn path_vectors(&self) -> PathVectors;

    fn terminator(&self) -> Option<LatLong>;

    /// Total path length.
    fn distance(&self) -> Option<Length>;

    fn inbound_course(&self) -> Option<Heading>;

    fn outbound_course(&self) -> Option<Heading>;

    /// Short human-readable description for logs.
    fn repr(&self) -> String;
}

/// Inputs available to a leg or transition when it recomputes its geometry.
#[derive(Debug, Clone, Copy)]
pub struct RecomputeContext {
    /// Flight plan index of the leg, or of the leg preceding the transition.
    pub index:         usize,
    pub is_active:     bool,
    pub state:         AircraftState,
    /// True airspeed predicted over this guidable.
    pub true_airspeed: Speed,
    /// Ground speed predicted over this guidable.
    pub ground_speed:  Speed,
    /// Terminator of the preceding guidable, if resolved.
    pub start:         Option<LatLong>,
}
