//! Computed lateral path of a window of the flight plan.
//!
//! A geometry owns the legs of the window and the transitions between them.
//! Legs and transitions are indexed by flight plan index;
//! the transition at index `n` joins leg `n` to leg `n + 1`.

use std::iter;

use either::Either;
use math::{LatLong, Length, Speed};
use serde::Serialize;
use store::SegmentType;

use super::common::{SEQUENCING_TOLERANCE, roll_anticipation_distance};
use super::leg::{self, Leg};
use super::path::PathVector;
use super::transition::{self, Transition, TransitionType};
use super::{
    AircraftState, Guidable, GuidableId, GuidanceError, GuidanceParameters, RecomputeContext,
};


/// Steering output of a geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuidanceOutput {
    pub parameters:                 GuidanceParameters,
    /// Distance to go on the guidable being flown.
    pub distance_to_go:             Option<Length>,
    pub roll_anticipation_distance: Length,
    pub active_guidable:            GuidableId,
}

/// Legs and transitions of a contiguous window of the flight plan.
#[derive(Debug, Clone)]
pub struct Geometry {
    first_index: usize,
    /// `None` for flight plan entries without geometry, e.g. after a discontinuity.
    legs:        Vec<Option<Leg>>,
    /// Always the same length as `legs`.
    transitions: Vec<Option<Transition>>,
    diagnostics: Vec<GuidanceError>,
    version:     u64,
    active_leg:  usize,
    flown:       Option<GuidableId>,
}

impl Geometry {
    /// Assembles a geometry from legs starting at `first_index`
    /// and the transitions following each leg.
    #[must_use]
    pub fn new(
        first_index: usize,
        active_leg: usize,
        version: u64,
        legs: Vec<Option<Leg>>,
        mut transitions: Vec<Option<Transition>>,
        diagnostics: Vec<GuidanceError>,
    ) -> Self {
        transitions.resize_with(legs.len(), || None);
        Self {
            first_index,
            legs,
            transitions,
            diagnostics,
            version,
            active_leg,
            flown: None,
        }
    }

    /// Flight plan index of the first leg in the window.
    #[must_use]
    pub fn first_index(&self) -> usize { self.first_index }

    /// Flight plan index after the last leg in the window.
    #[must_use]
    pub fn end_index(&self) -> usize { self.first_index + self.legs.len() }

    /// Flight plan version this geometry was built from.
    #[must_use]
    pub fn version(&self) -> u64 { self.version }

    /// Active leg index when the geometry was built or last shifted.
    #[must_use]
    pub fn active_leg(&self) -> usize { self.active_leg }

    /// Problems found while building the geometry.
    #[must_use]
    pub fn diagnostics(&self) -> &[GuidanceError] { &self.diagnostics }

    /// The guidable selected by the last [`update_state`](Self::update_state).
    #[must_use]
    pub fn flown_guidable(&self) -> Option<GuidableId> { self.flown }

    fn slot(&self, index: usize) -> Option<usize> {
        index.checked_sub(self.first_index).filter(|&slot| slot < self.legs.len())
    }

    #[must_use]
    pub fn leg(&self, index: usize) -> Option<&Leg> { self.legs.get(self.slot(index)?)?.as_ref() }

    pub fn leg_mut(&mut self, index: usize) -> Option<&mut Leg> {
        let slot = self.slot(index)?;
        self.legs.get_mut(slot)?.as_mut()
    }

    /// The transition from leg `index` to leg `index + 1`.
    #[must_use]
    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(self.slot(index)?)?.as_ref()
    }

    fn transition_mut(&mut self, index: usize) -> Option<&mut Transition> {
        let slot = self.slot(index)?;
        self.transitions.get_mut(slot)?.as_mut()
    }

    fn usable_transition(&self, index: usize) -> Option<&Transition> {
        self.transition(index).filter(|transition| transition.is_usable())
    }

    #[must_use]
    pub fn guidable(&self, id: GuidableId) -> Option<&dyn Guidable> {
        match id {
            GuidableId::Leg(index) => self.leg(index).map(|leg| leg as &dyn Guidable),
            GuidableId::Transition(index) => {
                self.transition(index).map(|transition| transition as &dyn Guidable)
            }
        }
    }

    /// Legs in the window.
    pub fn legs(&self) -> impl Iterator<Item = &Leg> { self.legs.iter().flatten() }

    /// Legs in the window belonging to `segment`.
    pub fn legs_in_segment(&self, segment: SegmentType) -> impl Iterator<Item = &Leg> {
        self.legs().filter(move |leg| leg.info.segment == segment)
    }

    /// Drops the first leg of the window and appends `leg` after the last one.
    ///
    /// The transition into the appended leg is left empty.
    pub(super) fn shift(&mut self, leg: Option<Leg>) {
        if !self.legs.is_empty() {
            self.legs.remove(0);
            self.transitions.remove(0);
            self.first_index += 1;
        }
        self.legs.push(leg);
        self.transitions.push(None);
        self.active_leg += 1;
        self.flown = None;
    }

    pub(super) fn set_transition(&mut self, index: usize, transition: Option<Transition>) {
        if let Some(slot) = self.slot(index) {
            self.transitions[slot] = transition;
        }
    }

    pub(super) fn push_diagnostic(&mut self, error: GuidanceError) { self.diagnostics.push(error); }

    /// Recomputes every leg and transition in flying order.
    ///
    /// The active leg is predicted at the current airspeed.
    /// Other legs use their predicted speed,
    /// falling back to the current airspeed bounded below by `tas_floor`.
    ///
    /// Failures are isolated to the failing element and returned together.
    pub fn recompute_with_parameters(
        &mut self,
        active: usize,
        state: &AircraftState,
        tas_floor: Speed,
    ) -> Vec<GuidanceError> {
        let mut errors = Vec::new();
        let mut start: Option<LatLong> = None;

        for slot in 0..self.legs.len() {
            let index = self.first_index + slot;

            let Some(leg) = self.legs[slot].as_mut() else {
                start = None;
                continue;
            };

            let (true_airspeed, ground_speed) = if index == active {
                (state.true_airspeed, state.ground_speed)
            } else {
                let tas = leg.info.predicted_speed.unwrap_or(state.true_airspeed.max(tas_floor));
                (tas, tas)
            };

            let ctx = RecomputeContext {
                index,
                is_active: index == active,
                state: *state,
                true_airspeed,
                ground_speed,
                start,
            };
            if let Err(err) = leg.recompute(&ctx) {
                errors.push(err);
            }
            start = leg.terminator();

            let (Some(transition), Some(Some(prev)), Some(Some(next))) =
                (self.transitions[slot].as_mut(), self.legs.get(slot), self.legs.get(slot + 1))
            else {
                continue;
            };

            let ctx = RecomputeContext {
                is_active: self.flown == Some(GuidableId::Transition(index)),
                ..ctx
            };
            match transition.recompute(prev, next, &ctx) {
                Ok(()) if transition.is_usable() => {
                    start = transition.terminator().or(start);
                }
                Ok(()) => {}
                Err(err) => errors.push(err),
            }
        }

        errors
    }

    /// Selects the guidable to fly, in order of precedence:
    /// the transition into the active leg while abeam it,
    /// the transition out of the active leg while abeam it,
    /// then the active leg itself.
    fn select(&self, active: usize, position: LatLong) -> Option<GuidableId> {
        let leg = self.leg(active)?;

        if let Some(from) = active.checked_sub(1).and_then(|index| self.usable_transition(index))
            && from.is_abeam(position)
        {
            // The course-to-altitude leg flies its own course while the capture turn is flown.
            let into_course_leg = from.transition_type() == TransitionType::PathCapture
                && matches!(leg.kind, leg::Kind::Ca(_));
            if !into_course_leg {
                return Some(GuidableId::Transition(from.index));
            }
        }

        if let Some(to) = self.usable_transition(active)
            && to.is_abeam(position)
        {
            return Some(GuidableId::Transition(active));
        }

        Some(GuidableId::Leg(active))
    }

    /// Advances the state machines of whatever is flown
    /// and freezes transitions the aircraft is abeam.
    pub fn update_state(&mut self, active: usize, state: &AircraftState) {
        let flown = self.select(active, state.position);

        for index in [active.checked_sub(1), Some(active)].into_iter().flatten() {
            if let Some(transition) = self.transition_mut(index)
                && transition.is_abeam(state.position)
            {
                transition.freeze();
            }
        }

        match flown {
            Some(GuidableId::Leg(index)) => {
                if let Some(leg) = self.leg_mut(index) {
                    leg.update_state(state);
                }
            }
            Some(GuidableId::Transition(index)) => {
                if let Some(transition) = self.transition_mut(index) {
                    transition.update_state(state);
                }
            }
            None => {}
        }

        self.flown = flown;
    }

    /// The guidable following `id` in flying order.
    fn next_guidable(&self, id: GuidableId) -> Option<&dyn Guidable> {
        match id {
            GuidableId::Leg(index) => match self.usable_transition(index) {
                Some(transition) => Some(transition as &dyn Guidable),
                None => self.leg(index + 1).map(|leg| leg as &dyn Guidable),
            },
            GuidableId::Transition(index) => self.leg(index + 1).map(|leg| leg as &dyn Guidable),
        }
    }

    /// Steering output for the current frame.
    ///
    /// Returns `None` if the active leg cannot provide guidance.
    #[must_use]
    pub fn guidance_parameters(
        &self,
        active: usize,
        state: &AircraftState,
    ) -> Option<GuidanceOutput> {
        let id = self.select(active, state.position)?;
        let current = self.guidable(id)?;
        let mut parameters = current.guidance_parameters(state)?;
        let distance_to_go = current.distance_to_go(state);

        let next = self.next_guidable(id);
        let rad = next.map_or(Length::ZERO, |next| {
            self.roll_anticipation(current, next, state.ground_speed)
        });

        // A fly-by turn starts before the fix the leg ends at.
        let to_turn_start = match id {
            GuidableId::Leg(index) => self.fly_by_half(index).map_or(Length::ZERO, |(_, tp)| tp),
            GuidableId::Transition(_) => Length::ZERO,
        };

        if let Some(next) = next
            && let Some(dtg) = distance_to_go
            && dtg - to_turn_start <= rad
            && let GuidanceParameters::LateralPath { phi_command, .. } = &mut parameters
            && let Some(next_parameters @ GuidanceParameters::LateralPath { .. }) =
                next.guidance_parameters(state)
        {
            *phi_command = next_parameters.phi_command();
        }

        Some(GuidanceOutput {
            parameters,
            distance_to_go,
            roll_anticipation_distance: rad,
            active_guidable: id,
        })
    }

    fn roll_anticipation(
        &self,
        current: &dyn Guidable,
        next: &dyn Guidable,
        ground_speed: Speed,
    ) -> Length {
        if !current.is_circular_arc() && !next.is_circular_arc() {
            return Length::ZERO;
        }
        let bank_change =
            next.nominal_roll_angle(ground_speed) - current.nominal_roll_angle(ground_speed);
        roll_anticipation_distance(ground_speed, bank_change)
    }

    /// Whether the active leg is complete and the next leg should become active.
    #[must_use]
    pub fn should_sequence_leg(&self, active: usize, state: &AircraftState) -> bool {
        let Some(leg) = self.leg(active) else { return false };

        if matches!(leg.kind, leg::Kind::If(_)) {
            return true;
        }
        if !leg.is_computed() {
            return false;
        }

        if let Some(transition) = self.usable_transition(active) {
            match (&transition.kind, &leg.kind) {
                (
                    transition::Kind::FixedRadius(turn),
                    leg::Kind::Tf(_) | leg::Kind::Df(_),
                ) => {
                    if let (Some(itp), Some(course)) = (turn.itp(), turn.prev_course()) {
                        return state.position.along_track_distance(itp, course).is_positive();
                    }
                }
                (
                    transition::Kind::PathCapture(_) | transition::Kind::DirectToFix(_),
                    leg::Kind::Tf(_) | leg::Kind::Df(_) | leg::Kind::Rf(_) | leg::Kind::Af(_),
                ) => return leg.distance_to_go(state).is_some_and(Length::is_negative),
                _ => {}
            }
        }

        leg.distance_to_go(state).is_some_and(|dtg| dtg <= SEQUENCING_TOLERANCE)
    }

    /// Half of a fly-by turn belongs to each of the legs it joins.
    fn fly_by_half(&self, index: usize) -> Option<(Length, Length)> {
        let transition = self.usable_transition(index)?;
        match &transition.kind {
            transition::Kind::FixedRadius(turn) => Some((
                transition.distance().unwrap_or(Length::ZERO) / 2.,
                turn.turning_point_distance(),
            )),
            _ => None,
        }
    }

    /// Path lengths attributed to leg `index` as
    /// (inbound transition part, leg, outbound transition part).
    #[must_use]
    pub fn complete_leg_path_lengths(&self, index: usize) -> Option<(Length, Length, Length)> {
        let leg = self.leg(index)?;
        let mut leg_length = leg.distance()?;

        let inbound = match index.checked_sub(1) {
            Some(prev) => match self.fly_by_half(prev) {
                Some((half, tp_distance)) => {
                    leg_length -= tp_distance;
                    half
                }
                None => self
                    .usable_transition(prev)
                    .and_then(Transition::distance)
                    .unwrap_or(Length::ZERO),
            },
            None => Length::ZERO,
        };

        let outbound = match self.fly_by_half(index) {
            Some((half, tp_distance)) => {
                leg_length -= tp_distance;
                half
            }
            None => Length::ZERO,
        };

        Some((inbound, leg_length.max(Length::ZERO), outbound))
    }

    /// Remaining path distances attributed to leg `index` as
    /// (inbound transition part, leg, outbound transition part).
    #[must_use]
    pub fn complete_leg_path_distance_to_go(
        &self,
        index: usize,
        state: &AircraftState,
    ) -> Option<(Length, Length, Length)> {
        let (inbound_length, leg_length, outbound_length) = self.complete_leg_path_lengths(index)?;
        let position = state.position;

        let on_inbound = index
            .checked_sub(1)
            .and_then(|prev| self.usable_transition(prev))
            .filter(|transition| transition.is_abeam(position));
        if let Some(transition) = on_inbound {
            let dtg = transition.distance_to_go(state).unwrap_or(Length::ZERO);
            return Some((dtg.clamp(Length::ZERO, inbound_length), leg_length, outbound_length));
        }

        let on_outbound = self.usable_transition(index).filter(|t| t.is_abeam(position));
        if let Some(transition) = on_outbound {
            let dtg = transition.distance_to_go(state).unwrap_or(Length::ZERO);
            let outbound = match self.fly_by_half(index) {
                Some((half, _)) => (dtg - half).clamp(Length::ZERO, outbound_length),
                None => Length::ZERO,
            };
            return Some((Length::ZERO, Length::ZERO, outbound));
        }

        let mut leg_dtg = self.leg(index)?.distance_to_go(state)?;
        if let Some((_, tp_distance)) = self.fly_by_half(index) {
            leg_dtg -= tp_distance;
        }
        Some((Length::ZERO, leg_dtg.clamp(Length::ZERO, leg_length), outbound_length))
    }

    /// Path vectors of every computed leg and transition in flying order.
    pub fn path_vectors(&self) -> impl Iterator<Item = PathVector> + '_ {
        self.legs.iter().zip(&self.transitions).flat_map(|(leg, transition)| {
            let leg_vectors = match leg {
                Some(leg) => Either::Left(leg.path_vectors().into_iter()),
                None => Either::Right(iter::empty()),
            };
            leg_vectors.chain(transition.iter().flat_map(Guidable::path_vectors))
        })
    }

    /// Position `distance_before_terminator` before the terminator of leg `index`, along the leg.
    #[must_use]
    pub fn pseudo_waypoint_location(
        &self,
        index: usize,
        distance_before_terminator: Length,
    ) -> Option<LatLong> {
        self.leg(index)?.pseudo_waypoint_location(distance_before_terminator)
    }

    /// Requests the hold at leg `index` to exit at the next passage of its fix.
    ///
    /// Returns `false` if the leg is not a hold.
    pub fn request_hold_exit(&mut self, index: usize) -> bool {
        match self.leg_mut(index).map(|leg| &mut leg.kind) {
            Some(leg::Kind::Hold(hold)) => {
                hold.request_exit();
                true
            }
            _ => false,
        }
    }
}
