//! Conversion of geometry guidance into autopilot steering commands.

use bevy::ecs::component::Component;
use bevy::log::{debug, info, warn};
use math::{Angle, Length};
use serde::Serialize;
use store::LegType;

use super::controller::FlightPlanSource;
use super::geometry::{Geometry, GuidanceOutput};
use super::{AircraftState, ControlLaw, GuidableId, GuidanceError, GuidanceParameters};


/// Lateral steering command consumed by the autopilot and the displays.
#[derive(Debug, Clone, Copy, PartialEq, Default, Component, Serialize)]
pub struct LateralOutput {
    /// Whether lateral navigation guidance is available.
    ///
    /// When unavailable, `phi_command` holds the last valid command
    /// and the errors are zero.
    pub available:                  bool,
    pub law:                        Option<ControlLaw>,
    pub parameters:                 Option<GuidanceParameters>,
    pub cross_track_error:          Length,
    pub track_angle_error:          Angle,
    pub phi_command:                Angle,
    pub distance_to_go:             Option<Length>,
    pub roll_anticipation_distance: Length,
    pub active_guidable:            Option<GuidableId>,
}

/// A leg sequenced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequenced {
    /// The leg that was active before sequencing.
    pub from_leg:              usize,
    /// Whether a discontinuity after `from_leg` was cleared to sequence.
    pub cleared_discontinuity: bool,
}

/// Drives steering output and leg sequencing from a geometry.
#[derive(Debug, Clone, Default)]
pub struct LnavDriver {
    output:   LateralOutput,
    last_phi: Angle,
}

impl LnavDriver {
    #[must_use]
    pub fn output(&self) -> &LateralOutput { &self.output }

    /// Updates the steering output.
    ///
    /// Returns whether the output changed.
    pub fn update(
        &mut self,
        geometry: &Geometry,
        active: usize,
        state: &AircraftState,
        log_guidance: bool,
    ) -> bool {
        let output = match geometry.guidance_parameters(active, state) {
            Some(guidance) if guidance.parameters.is_finite() => {
                self.available_output(guidance, state)
            }
            Some(_) => {
                let err = GuidanceError::DegenerateGeometry {
                    index:  active,
                    reason: "non-finite guidance output",
                };
                warn!("{err}");
                self.fail_safe()
            }
            None => self.fail_safe(),
        };

        if output == self.output {
            return false;
        }

        if log_guidance {
            debug!(
                "Guidance {:?}: XTE {:.3} NM, TAE {:.1}°, φ {:.1}°",
                output.law,
                output.cross_track_error.into_nm(),
                output.track_angle_error.into_degrees(),
                output.phi_command.into_degrees(),
            );
        }
        if output.available != self.output.available {
            info!(
                "Lateral guidance {}",
                if output.available { "available" } else { "unavailable" }
            );
        }

        self.output = output;
        true
    }

    fn available_output(&mut self, guidance: GuidanceOutput, state: &AircraftState) -> LateralOutput {
        let (cross_track_error, track_angle_error, phi_command) = match guidance.parameters {
            GuidanceParameters::LateralPath { cross_track_error, track_angle_error, phi_command } => {
                (cross_track_error, track_angle_error, phi_command)
            }
            GuidanceParameters::Track { course } => {
                (Length::ZERO, course - state.true_track, Angle::ZERO)
            }
            GuidanceParameters::Heading { .. } => (Length::ZERO, Angle::ZERO, Angle::ZERO),
        };
        self.last_phi = phi_command;

        LateralOutput {
            available: true,
            law: Some(guidance.parameters.law()),
            parameters: Some(guidance.parameters),
            cross_track_error,
            track_angle_error,
            phi_command,
            distance_to_go: guidance.distance_to_go,
            roll_anticipation_distance: guidance.roll_anticipation_distance,
            active_guidable: Some(guidance.active_guidable),
        }
    }

    /// Holds the last roll command with zero errors.
    fn fail_safe(&self) -> LateralOutput {
        LateralOutput { available: false, phi_command: self.last_phi, ..LateralOutput::default() }
    }

    /// Sequences the active leg of `source` if the geometry says it is complete.
    ///
    /// A track to fix ending in a discontinuity clears the discontinuity to sequence;
    /// other legs ending in a discontinuity are not sequenced.
    pub fn sequence(
        &mut self,
        geometry: &Geometry,
        source: &mut impl FlightPlanSource,
        state: &AircraftState,
        automatic_sequencing: bool,
    ) -> Option<Sequenced> {
        if !automatic_sequencing {
            return None;
        }

        let plan = source.plan();
        let active = plan.active_leg;
        let spec = plan.legs.get(active)?;
        if active + 1 >= plan.legs.len() || !geometry.should_sequence_leg(active, state) {
            return None;
        }

        let cleared_discontinuity = spec.ends_in_discontinuity;
        if cleared_discontinuity {
            if spec.leg_type() != LegType::Tf {
                return None;
            }
            source.clear_discontinuity(active);
        }

        source.sequence_leg();
        info!("Sequenced leg {active} towards leg {}", active + 1);
        Some(Sequenced { from_leg: active, cleared_discontinuity })
    }
}
