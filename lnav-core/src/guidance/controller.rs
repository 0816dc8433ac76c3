//! Ownership of the geometries of one aircraft and their refresh schedule.

use std::time::Duration;

use bevy::log::{debug, warn};
use math::{LatLong, Length, Speed};
use store::FlightPlan;

use super::geometry::Geometry;
use super::lnav::{LateralOutput, LnavDriver, Sequenced};
use super::{AircraftState, manager};


/// Access to the flight plan flown by guidance.
pub trait FlightPlanSource {
    fn plan(&self) -> &FlightPlan;

    /// Makes the leg after the active leg active.
    fn sequence_leg(&mut self);

    /// Removes the discontinuity after leg `index`.
    fn clear_discontinuity(&mut self, index: usize);
}

impl FlightPlanSource for FlightPlan {
    fn plan(&self) -> &FlightPlan { self }

    fn sequence_leg(&mut self) {
        if self.active_leg + 1 < self.legs.len() {
            self.active_leg += 1;
        }
    }

    fn clear_discontinuity(&mut self, index: usize) {
        if let Some(leg) = self.legs.get_mut(index)
            && leg.ends_in_discontinuity
        {
            leg.ends_in_discontinuity = false;
            self.bump_version();
        }
    }
}

/// Tuning of the controller, usually read from the config.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub active_recompute_period: Duration,
    pub full_recompute_period:   Duration,
    pub automatic_sequencing:    bool,
    /// Lowest true airspeed assumed for legs without a predicted speed.
    pub predicted_tas_floor:     Speed,
    pub log_recomputation:       bool,
    pub log_guidance:            bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_recompute_period: Duration::from_secs(1),
            full_recompute_period:   Duration::from_secs(5),
            automatic_sequencing:    true,
            predicted_tas_floor:     Speed::from_knots(150.),
            log_recomputation:       false,
            log_guidance:            false,
        }
    }
}

/// Lateral guidance of one aircraft.
///
/// The active geometry covers the legs around the active leg and is recomputed often.
/// The full geometry covers the rest of the plan for path prediction.
/// Both are replaced wholesale when the flight plan version changes.
#[derive(Debug, Clone)]
pub struct GuidanceController {
    active_geometry:        Geometry,
    full_geometry:          Geometry,
    last_version:           Option<u64>,
    since_active_recompute: Duration,
    since_full_recompute:   Duration,
    driver:                 LnavDriver,
}

impl Default for GuidanceController {
    fn default() -> Self {
        let empty = || Geometry::new(0, 0, 0, Vec::new(), Vec::new(), Vec::new());
        Self {
            active_geometry:        empty(),
            full_geometry:          empty(),
            last_version:           None,
            since_active_recompute: Duration::ZERO,
            since_full_recompute:   Duration::ZERO,
            driver:                 LnavDriver::default(),
        }
    }
}

impl GuidanceController {
    #[must_use]
    pub fn active_geometry(&self) -> &Geometry { &self.active_geometry }

    #[must_use]
    pub fn full_geometry(&self) -> &Geometry { &self.full_geometry }

    #[must_use]
    pub fn output(&self) -> &LateralOutput { self.driver.output() }

    /// Runs one guidance frame: refreshes the geometries, then steers.
    pub fn update(
        &mut self,
        dt: Duration,
        settings: &Settings,
        source: &mut impl FlightPlanSource,
        state: &AircraftState,
    ) -> Option<Sequenced> {
        self.refresh(dt, settings, source.plan(), state);
        self.steer(settings, source, state)
    }

    /// Rebuilds the geometries on a version change and recomputes them when due.
    pub fn refresh(
        &mut self,
        dt: Duration,
        settings: &Settings,
        plan: &FlightPlan,
        state: &AircraftState,
    ) {
        let active = plan.active_leg;

        if self.last_version != Some(plan.version) {
            let mut active_geometry = manager::build_active_geometry(plan);
            let mut full_geometry = manager::build_full_geometry(plan);
            recompute(&mut active_geometry, "active", active, state, settings);
            recompute(&mut full_geometry, "full", active, state, settings);
            if settings.log_recomputation {
                debug!("Rebuilt geometry for flight plan version {}", plan.version);
            }

            self.active_geometry = active_geometry;
            self.full_geometry = full_geometry;
            self.last_version = Some(plan.version);
            self.since_active_recompute = Duration::ZERO;
            self.since_full_recompute = Duration::ZERO;
            return;
        }

        self.since_active_recompute += dt;
        self.since_full_recompute += dt;

        if self.active_geometry.active_leg() != active {
            manager::update_active_geometry(&mut self.active_geometry, plan);
            self.since_active_recompute = settings.active_recompute_period;
        }

        if self.since_active_recompute >= settings.active_recompute_period {
            recompute(&mut self.active_geometry, "active", active, state, settings);
            self.since_active_recompute = Duration::ZERO;
        }
        if self.since_full_recompute >= settings.full_recompute_period {
            recompute(&mut self.full_geometry, "full", active, state, settings);
            self.since_full_recompute = Duration::ZERO;
        }
    }

    /// Updates the steering output and sequences the active leg when complete.
    pub fn steer(
        &mut self,
        settings: &Settings,
        source: &mut impl FlightPlanSource,
        state: &AircraftState,
    ) -> Option<Sequenced> {
        let active = source.plan().active_leg;
        self.active_geometry.update_state(active, state);
        self.driver.update(&self.active_geometry, active, state, settings.log_guidance);
        self.driver.sequence(&self.active_geometry, source, state, settings.automatic_sequencing)
    }

    /// Places a pseudo waypoint `distance_before_terminator` before the end of leg `index`.
    ///
    /// Uses the full geometry so that legs outside the active window can be marked too.
    #[must_use]
    pub fn pseudo_waypoint_location(
        &self,
        index: usize,
        distance_before_terminator: Length,
    ) -> Option<LatLong> {
        self.full_geometry.pseudo_waypoint_location(index, distance_before_terminator)
    }

    /// Requests the hold at leg `index` to exit at the next fix passage.
    pub fn request_hold_exit(&mut self, index: usize) -> bool {
        let active = self.active_geometry.request_hold_exit(index);
        let full = self.full_geometry.request_hold_exit(index);
        active || full
    }
}

fn recompute(
    geometry: &mut Geometry,
    name: &str,
    active: usize,
    state: &AircraftState,
    settings: &Settings,
) {
    let errors = geometry.recompute_with_parameters(active, state, settings.predicted_tas_floor);
    for err in &errors {
        warn!("Recomputing {name} geometry: {err}");
    }
    if settings.log_recomputation {
        debug!(
            "Recomputed {name} geometry for legs {}..{} with {} errors",
            geometry.first_index(),
            geometry.end_index(),
            errors.len()
        );
    }
}
