//! Construction of geometries from the flight plan.
//!
//! Geometries are built in two passes.
//! Every leg is self-contained and is built first,
//! then each pair of adjacent legs is joined by the transition the picker selects.

use std::ops::Range;

use bevy::log::{debug, warn};
use itertools::Itertools;
use store::{AltitudeConstraint, Fix, FlightPlan, LegPath, LegSpec, LegType};

use super::geometry::Geometry;
use super::leg::{
    AfLeg, CaLeg, CrLeg, DfLeg, HoldLeg, IfLeg, Leg, LegInfo, RfLeg, TfLeg, VmLeg,
};
use super::transition::Transition;
use super::{GuidanceError, picker};

#[cfg(test)]
mod tests;

/// The fix a leg at `index` starts from,
/// if the previous entry ends at a database fix.
fn from_fix(plan: &FlightPlan, index: usize) -> Option<&Fix> {
    let prev = plan.legs.get(index.checked_sub(1)?)?;
    if !prev.leg_type().is_fix_terminated() {
        return None;
    }
    prev.fix.as_ref()
}

fn info_of(spec: &LegSpec) -> LegInfo {
    LegInfo {
        segment:             spec.segment,
        altitude_constraint: spec.altitude_constraint,
        speed_constraint:    spec.speed_constraint,
        predicted_speed:     spec.predicted_speed,
        substituted_for:     None,
    }
}

/// Builds the leg at flight plan `index`.
///
/// Returns `Ok(None)` if the leg follows a discontinuity and has nothing to join from.
pub fn build_leg(plan: &FlightPlan, index: usize) -> Result<Option<Leg>, GuidanceError> {
    let Some(spec) = plan.legs.get(index) else { return Ok(None) };
    let leg_type = spec.leg_type();

    let after_discontinuity = index
        .checked_sub(1)
        .and_then(|prev| plan.legs.get(prev))
        .is_some_and(|prev| prev.ends_in_discontinuity);
    if after_discontinuity && leg_type != LegType::If {
        return Ok(None);
    }

    let missing = || GuidanceError::MissingTerminator { index, leg_type };
    let fix = || spec.fix.clone().ok_or_else(missing);
    let mut info = info_of(spec);

    let leg = match &spec.path {
        LegPath::If => Leg::new(index, info, IfLeg { fix: fix()? }),
        LegPath::Tf => match from_fix(plan, index) {
            Some(from) => Leg::new(index, info, TfLeg::new(from.clone(), fix()?)),
            None => Leg::new(index, info, DfLeg::new(fix()?)),
        },
        LegPath::Df => Leg::new(index, info, DfLeg::new(fix()?)),
        &LegPath::Rf { centre, turn } => {
            let from = from_fix(plan, index).ok_or_else(missing)?;
            Leg::new(index, info, RfLeg::new(from.clone(), fix()?, centre, turn))
        }
        LegPath::Af { navaid, boundary_radial, turn } => {
            Leg::new(index, info, AfLeg::new(navaid.clone(), fix()?, *boundary_radial, *turn))
        }
        &LegPath::Ca { course, altitude } => Leg::new(index, info, CaLeg::new(course, altitude)),
        &LegPath::Vm { heading } => Leg::new(index, info, VmLeg::new(heading)),
        LegPath::Cr { course, navaid, radial } => {
            Leg::new(index, info, CrLeg::new(*course, navaid.clone(), *radial))
        }
        &LegPath::Hold { inbound_course, turn, distance, termination } => Leg::new(
            index,
            info,
            HoldLeg::new(
                fix()?,
                inbound_course,
                turn,
                distance,
                termination,
                spec.speed_constraint.map(|constraint| constraint.speed),
            )
            .with_coded_altitude(
                spec.altitude_constraint.as_ref().map(AltitudeConstraint::coded_altitude),
            ),
        ),
        LegPath::Other { leg_type } => {
            let unsupported = GuidanceError::UnsupportedLegType { index, leg_type: *leg_type };
            let (Some(from), Some(to)) = (from_fix(plan, index), spec.fix.as_ref()) else {
                return Err(unsupported);
            };
            info.substituted_for = Some(*leg_type);
            Leg::new(index, info, TfLeg::new(from.clone(), to.clone()))
        }
    };

    Ok(Some(leg))
}

/// Builds a leg, recording failures and substitutions in `diagnostics`.
fn build_leg_logged(
    plan: &FlightPlan,
    index: usize,
    diagnostics: &mut Vec<GuidanceError>,
) -> Option<Leg> {
    match build_leg(plan, index) {
        Ok(Some(leg)) => {
            if let Some(leg_type) = leg.info.substituted_for {
                warn!("Flying {} as a track to fix", leg.ident());
                diagnostics.push(GuidanceError::UnsupportedLegType { index, leg_type });
            }
            Some(leg)
        }
        Ok(None) => None,
        Err(err) => {
            warn!("Cannot build leg: {err}");
            diagnostics.push(err);
            None
        }
    }
}

/// Picks the transition between two adjacent legs.
///
/// Unsupported sequences are recorded and the legs join directly.
fn link(
    prev: Option<&Leg>,
    next: Option<&Leg>,
    diagnostics: &mut Vec<GuidanceError>,
) -> Option<Transition> {
    let (prev, next) = (prev?, next?);
    match picker::pick(prev, next) {
        Ok(transition) => transition,
        Err(err) => {
            warn!("{err}, joining legs directly");
            diagnostics.push(err);
            None
        }
    }
}

fn build_range(plan: &FlightPlan, range: Range<usize>) -> Geometry {
    let mut diagnostics = Vec::new();

    let legs: Vec<Option<Leg>> =
        range.clone().map(|index| build_leg_logged(plan, index, &mut diagnostics)).collect();

    let transitions: Vec<Option<Transition>> = legs
        .iter()
        .tuple_windows()
        .map(|(prev, next)| link(prev.as_ref(), next.as_ref(), &mut diagnostics))
        .collect();

    Geometry::new(range.start, plan.active_leg, plan.version, legs, transitions, diagnostics)
}

/// Builds every leg from the one before the active leg to the end of the plan.
#[must_use]
pub fn build_full_geometry(plan: &FlightPlan) -> Geometry {
    let first = plan.active_leg.saturating_sub(1).min(plan.legs.len());
    build_range(plan, first..plan.legs.len())
}

/// Builds the legs around the active leg:
/// the previous leg, the active leg and the next leg.
#[must_use]
pub fn build_active_geometry(plan: &FlightPlan) -> Geometry {
    let end = (plan.active_leg + 2).min(plan.legs.len());
    let first = plan.active_leg.saturating_sub(1).min(end);
    build_range(plan, first..end)
}

/// Brings the active geometry in line with the flight plan.
///
/// After a plain sequence the window is shifted by one leg,
/// keeping the computed legs and transitions including their frozen state.
/// Any other change rebuilds the geometry.
///
/// Returns whether the geometry was shifted rather than rebuilt.
pub fn update_active_geometry(geometry: &mut Geometry, plan: &FlightPlan) -> bool {
    let active = plan.active_leg;
    let shiftable = geometry.version() == plan.version
        && active == geometry.active_leg() + 1
        && geometry.first_index() + 2 == active
        && active + 1 < plan.legs.len();

    if !shiftable {
        if geometry.version() != plan.version || geometry.active_leg() != active {
            debug!("Rebuilding active geometry at leg {active}");
            *geometry = build_active_geometry(plan);
        }
        return false;
    }

    let mut diagnostics = Vec::new();
    let next = active + 1;
    geometry.shift(build_leg_logged(plan, next, &mut diagnostics));
    let transition = link(geometry.leg(active), geometry.leg(next), &mut diagnostics);
    geometry.set_transition(active, transition);
    for diagnostic in diagnostics {
        geometry.push_diagnostic(diagnostic);
    }
    true
}
