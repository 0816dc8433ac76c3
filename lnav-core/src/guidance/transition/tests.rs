use math::{Angle, Heading, LatLong, Length, Speed, TurnDirection, turn_radius};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use store::{HoldDistance, HoldTermination};

use super::{
    CourseCaptureTransition, DirectToFixTransition, FixedRadiusTransition, HoldEntry,
    HoldEntryTransition, PathCaptureTransition, Transition, TransitionState,
};
use crate::guidance::common::{MAX_ROLL_ANGLE, max_bank_angle};
use crate::guidance::leg::{CaLeg, DfLeg, HoldLeg, Leg, LegInfo, TfLeg};
use crate::guidance::test_util::{
    assert_degrees, assert_heading, assert_nm, fix, recompute_context, state_at,
};
use crate::guidance::{AircraftState, Guidable, GuidanceError, RecomputeContext};

fn computed_leg(mut leg: Leg, state: AircraftState) -> Leg {
    leg.recompute(&recompute_context(leg.index, state)).expect("leg should compute");
    leg
}

/// Track to fix legs meeting at the origin with the given courses.
fn legs_through_origin(prev_course: Heading, next_course: Heading) -> (Leg, Leg) {
    let origin = LatLong::new(0., 0.);
    let before = origin.destination(prev_course.opposite(), Length::from_nm(20.));
    let after = origin.destination(next_course, Length::from_nm(20.));
    let state = state_at(before, prev_course.degrees(), 250.);

    let prev = Leg::new(
        1,
        LegInfo::default(),
        TfLeg::new(fix("WPT1", before.lat, before.long), fix("WPT2", 0., 0.)),
    );
    let next = Leg::new(
        2,
        LegInfo::default(),
        TfLeg::new(fix("WPT2", 0., 0.), fix("WPT3", after.lat, after.long)),
    );
    (computed_leg(prev, state), computed_leg(next, state))
}

fn inactive_context(index: usize, knots: f64) -> RecomputeContext {
    RecomputeContext {
        is_active: false,
        ..recompute_context(index, state_at(LatLong::new(0., -1.), 90., knots))
    }
}

#[test]
fn fly_by_quarter_turn() {
    let (prev, next) = legs_through_origin(Heading::EAST, Heading::SOUTH);
    let mut transition = Transition::new(1, FixedRadiusTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");

    let super::Kind::FixedRadius(fly_by) = &transition.kind else { unreachable!() };
    let arc = fly_by.arc().expect("course change needs a turn");
    let expected_radius = turn_radius(Speed::from_knots(250.), MAX_ROLL_ANGLE);

    assert_eq!(arc.direction(), TurnDirection::Clockwise);
    assert_nm(arc.radius, expected_radius.into_nm(), 1e-6);
    assert_nm(arc.centre.distance_to(arc.start), expected_radius.into_nm(), 1e-4);
    assert_nm(arc.centre.distance_to(arc.end), expected_radius.into_nm(), 1e-4);
    // A right angle turn starts one radius before the fix.
    assert_nm(fly_by.turning_point_distance(), expected_radius.into_nm(), 1e-6);
    assert_nm(
        transition.distance().expect("computed"),
        expected_radius.into_nm() * std::f64::consts::FRAC_PI_2,
        1e-3,
    );
    assert_heading(arc.inbound_course(), 90., 0.01);
    assert_heading(arc.outbound_course(), 180., 0.01);
    assert!(transition.is_circular_arc());
    assert!(transition.nominal_roll_angle(Speed::from_knots(250.)).is_positive());

    assert_eq!(transition.radius(), Some(arc.radius));
    assert_eq!(transition.centre(), Some(arc.centre));
    assert_degrees(transition.sweep().expect("turn"), 90., 0.01);
    assert_eq!(transition.initial_turning_point(), fly_by.itp());
    assert_eq!(transition.final_turning_point(), Some(arc.end));
}

#[test]
fn fly_by_straight_through_is_null() {
    let (prev, next) = legs_through_origin(Heading::EAST, Heading::from_degrees(92.));
    let mut transition = Transition::new(1, FixedRadiusTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");

    assert_eq!(transition.state(), TransitionState::Computed);
    assert!(!transition.is_usable());
    assert!(transition.guidance_parameters(&state_at(LatLong::new(0., 0.), 90., 250.)).is_none());
    assert_eq!(transition.terminator(), Some(LatLong::new(0., 0.)));
    assert_eq!(transition.distance(), Some(Length::ZERO));
}

#[test]
fn fly_by_random_turns_are_tangent() {
    let mut rng = SmallRng::seed_from_u64(0x1a7e_5a11);
    for _ in 0..200 {
        let prev_course = Heading::from_degrees(rng.random_range(0. ..360.));
        let change = rng.random_range(5. ..120.) * if rng.random_bool(0.5) { 1. } else { -1. };
        let next_course = prev_course + Angle::from_degrees(change);
        let knots = rng.random_range(120. ..350.);

        let (prev, next) = legs_through_origin(prev_course, next_course);
        let mut transition = Transition::new(1, FixedRadiusTransition::default());
        transition.recompute(&prev, &next, &inactive_context(1, knots)).expect("compute");
        let super::Kind::FixedRadius(fly_by) = &transition.kind else { unreachable!() };
        let arc = fly_by.arc().expect("turn");

        let speed = Speed::from_knots(knots);
        let bank = (Angle::from_degrees(change.abs()) / 2.)
            .clamp(Angle::from_degrees(5.), max_bank_angle(speed));
        let radius = turn_radius(speed, bank).into_nm();
        assert_nm(arc.radius, radius, 1e-6);
        assert_nm(arc.centre.distance_to(arc.start), radius, 1e-3);
        assert_nm(arc.centre.distance_to(arc.end), radius, 1e-3);
        assert_nm(
            fly_by.turning_point_distance(),
            radius * Angle::from_degrees(change.abs() / 2.).tan(),
            1e-6,
        );
        assert_degrees(arc.sweep, change, 0.1);
        assert_heading(arc.inbound_course(), prev_course.degrees(), 0.1);
        assert_heading(arc.outbound_course(), next_course.degrees(), 0.1);

        // Both turning points lie on their legs.
        let origin = LatLong::new(0., 0.);
        assert_nm(arc.start.cross_track_distance(origin, prev_course), 0., 1e-3);
        assert_nm(arc.end.cross_track_distance(origin, next_course), 0., 1e-3);
    }
}

#[test]
fn fly_by_freezes_when_abeam() {
    let (prev, next) = legs_through_origin(Heading::EAST, Heading::SOUTH);
    let mut transition = Transition::new(1, FixedRadiusTransition::default());
    assert_eq!(transition.state(), TransitionState::Pending);
    assert!(!transition.is_usable());

    // Freezing requires a computed geometry.
    transition.freeze();
    assert_eq!(transition.state(), TransitionState::Pending);

    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");
    transition.freeze();
    assert_eq!(transition.state(), TransitionState::Frozen);
    let frozen_radius = transition.distance();

    transition.recompute(&prev, &next, &inactive_context(1, 400.)).expect("frozen recompute");
    assert_eq!(transition.state(), TransitionState::Frozen);
    assert_eq!(transition.distance(), frozen_radius);
}

#[test]
fn course_capture_intercepts_next_course() {
    let (prev, next) = legs_through_origin(Heading::NORTH, Heading::EAST);
    let mut transition = Transition::new(1, CourseCaptureTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");

    assert!(transition.is_usable());
    let origin = LatLong::new(0., 0.);
    let end = transition.terminator().expect("intercept");
    assert_nm(end.cross_track_distance(origin, Heading::EAST), 0., 1e-3);
    assert!(end.along_track_distance(origin, Heading::EAST).is_positive());
    assert!(transition.distance().expect("length") > Length::from_nm(1.));

    // Course captures are flown as computed and never freeze.
    transition.freeze();
    assert_eq!(transition.state(), TransitionState::Computed);
}

#[test]
fn path_capture_from_previous_terminator() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", -1., 0.), fix("B", 0., 0.))),
        state_at(LatLong::new(-1., 0.), 0., 200.),
    );
    let next = Leg::new(2, LegInfo::default(), CaLeg::new(Heading::EAST, Length::from_feet(8000.)));

    let mut transition = Transition::new(1, PathCaptureTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 200.)).expect("compute");
    let super::Kind::PathCapture(capture) = &transition.kind else { unreachable!() };
    let arc = capture.arc().expect("turn");
    assert_nm(arc.start.distance_to(LatLong::new(0., 0.)), 0., 1e-6);
    assert_degrees(arc.sweep, 90., 1e-4);
    assert_nm(arc.radius, turn_radius(Speed::from_knots(200.), MAX_ROLL_ANGLE).into_nm(), 1e-6);
}

#[test]
fn path_capture_uses_present_track_when_active() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", -1., 0.), fix("B", 0., 0.))),
        state_at(LatLong::new(-1., 0.), 0., 200.),
    );
    let next = Leg::new(2, LegInfo::default(), CaLeg::new(Heading::EAST, Length::from_feet(8000.)));

    let position = LatLong::new(0.01, 0.01);
    let mut transition = Transition::new(1, PathCaptureTransition::default());
    transition
        .recompute(&prev, &next, &recompute_context(1, state_at(position, 45., 200.)))
        .expect("compute");
    let super::Kind::PathCapture(capture) = &transition.kind else { unreachable!() };
    let arc = capture.arc().expect("remaining turn");
    assert_nm(arc.start.distance_to(position), 0., 1e-6);
    assert_degrees(arc.sweep, 45., 1e-4);
}

#[test]
fn direct_to_fix_turns_toward_distant_fix() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", 0., -1.), fix("B", 0., 0.))),
        state_at(LatLong::new(0., -1.), 90., 250.),
    );
    let target = LatLong::new(0., 0.).destination(Heading::SOUTH, Length::from_nm(20.));
    let next = Leg::new(2, LegInfo::default(), DfLeg::new(fix("C", target.lat, target.long)));

    let mut transition = Transition::new(1, DirectToFixTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");
    let super::Kind::DirectToFix(direct) = &transition.kind else { unreachable!() };
    assert!(!direct.is_reverted());

    let arc = direct.arc().expect("turn");
    assert_eq!(arc.direction(), TurnDirection::Clockwise);
    // The turn ends on a track that leads straight to the fix.
    assert_heading(arc.outbound_course(), arc.end.bearing_to(target).degrees(), 0.2);
    // The roll starts before the previous terminator.
    assert!(arc.start.along_track_distance(LatLong::new(0., 0.), Heading::EAST).is_negative());
}

#[test]
fn direct_to_fix_small_turn_ends_before_previous_terminator() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", 0., -1.), fix("B", 0., 0.))),
        state_at(LatLong::new(0., -1.), 90., 250.),
    );
    let target = LatLong::new(0., 0.).destination(Heading::from_degrees(95.), Length::from_nm(20.));
    let next = Leg::new(2, LegInfo::default(), DfLeg::new(fix("C", target.lat, target.long)));

    let mut transition = Transition::new(1, DirectToFixTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");
    let super::Kind::DirectToFix(direct) = &transition.kind else { unreachable!() };
    let arc = direct.arc().expect("turn");

    assert!(arc.sweep.into_degrees() > 4. && arc.sweep.into_degrees() < 6., "{arc:?}");
    // The roll anticipation is longer than the turn itself,
    // so the direct track is rejoined short of the previous terminator.
    assert!(arc.end.along_track_distance(LatLong::new(0., 0.), Heading::EAST).is_negative());
    assert_heading(arc.outbound_course(), arc.end.bearing_to(target).degrees(), 0.2);
    assert!(arc.end.distance_to(target) > LatLong::new(0., 0.).distance_to(target));
}

#[test]
fn direct_to_fix_inside_turn_circle_reverts() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", 0., -1.), fix("B", 0., 0.))),
        state_at(LatLong::new(0., -1.), 90., 250.),
    );
    let target = LatLong::new(0., 0.).destination(Heading::SOUTH, Length::from_nm(1.));
    let next = Leg::new(2, LegInfo::default(), DfLeg::new(fix("C", target.lat, target.long)));

    let mut transition = Transition::new(1, DirectToFixTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 250.)).expect("compute");
    let super::Kind::DirectToFix(direct) = &transition.kind else { unreachable!() };

    assert!(direct.is_reverted());
    assert!(!transition.is_usable());
    assert_eq!(transition.terminator(), Some(LatLong::new(0., 0.)));
    assert_eq!(transition.repr(), "TYPE 4 DIRECT (REVERTED)");
}

#[test]
fn hold_entry_sectors_right_turns() {
    let select = |arrival| {
        HoldEntry::select(Heading::from_degrees(arrival), Heading::NORTH, TurnDirection::Clockwise)
    };
    assert_eq!(select(0.), HoldEntry::Null);
    assert_eq!(select(90.), HoldEntry::Direct);
    assert_eq!(select(330.), HoldEntry::Direct);
    assert_eq!(select(150.), HoldEntry::Teardrop);
    assert_eq!(select(270.), HoldEntry::Parallel);
    assert_eq!(select(200.), HoldEntry::Parallel);
}

#[test]
fn hold_entry_sectors_left_turns_mirror() {
    let select = |arrival| {
        HoldEntry::select(Heading::from_degrees(arrival), Heading::NORTH, TurnDirection::CounterClockwise)
    };
    assert_eq!(select(270.), HoldEntry::Direct);
    assert_eq!(select(210.), HoldEntry::Teardrop);
    assert_eq!(select(90.), HoldEntry::Parallel);
}

fn hold_at_origin(index: usize) -> Leg {
    Leg::new(
        index,
        LegInfo::default(),
        HoldLeg::new(
            fix("HOLD", 0., 0.),
            Heading::NORTH,
            TurnDirection::Clockwise,
            HoldDistance::Minutes(1.),
            HoldTermination::Manual,
            None,
        ),
    )
}

#[test]
fn hold_entry_builds_direct_entry() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", 0., -1.), fix("HOLD", 0., 0.))),
        state_at(LatLong::new(0., -1.), 90., 220.),
    );
    let next = hold_at_origin(2);

    let mut transition = Transition::new(1, HoldEntryTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 220.)).expect("compute");
    let super::Kind::HoldEntry(entry) = &transition.kind else { unreachable!() };
    assert_eq!(entry.entry(), HoldEntry::Direct);
    assert!(transition.is_usable());
    assert_eq!(transition.repr(), "TYPE 5 DIRECT ENTRY");
}

/// Builds the entry into a hold at the origin, arriving on `arrival` from 20 NM out.
fn entry_into(hold: Leg, arrival: Heading) -> Transition {
    let from = LatLong::new(0., 0.).destination(arrival.opposite(), Length::from_nm(20.));
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", from.lat, from.long), fix("HOLD", 0., 0.))),
        state_at(from, arrival.degrees(), 220.),
    );

    let mut transition = Transition::new(1, HoldEntryTransition::default());
    transition.recompute(&prev, &hold, &inactive_context(1, 220.)).expect("compute");
    transition
}

fn assert_ends_on_inbound_course(transition: &Transition, inbound: Heading) {
    let super::Kind::HoldEntry(entry) = &transition.kind else { unreachable!() };
    let end = entry.chain().end().expect("entry has a path");
    let origin = LatLong::new(0., 0.);
    assert!(
        end.cross_track_distance(origin, inbound).abs() < Length::from_nm(0.01),
        "{} ends {:?} off the inbound course",
        entry.entry(),
        end.cross_track_distance(origin, inbound),
    );
    assert!(
        end.along_track_distance(origin, inbound).is_negative(),
        "{} ends beyond the fix",
        entry.entry(),
    );
}

#[test]
fn hold_entries_end_on_inbound_course() {
    for (arrival, expected) in [
        (90., HoldEntry::Direct),
        (330., HoldEntry::Direct),
        (150., HoldEntry::Teardrop),
        (270., HoldEntry::Parallel),
        (200., HoldEntry::Parallel),
    ] {
        let transition = entry_into(hold_at_origin(2), Heading::from_degrees(arrival));
        let super::Kind::HoldEntry(entry) = &transition.kind else { unreachable!() };
        assert_eq!(entry.entry(), expected, "arriving on {arrival}");
        assert!(transition.is_usable());
        assert_ends_on_inbound_course(&transition, Heading::NORTH);
    }
}

#[test]
fn teardrop_turns_back_across_inbound_course() {
    let transition = entry_into(hold_at_origin(2), Heading::from_degrees(150.));
    let super::Kind::HoldEntry(entry) = &transition.kind else { unreachable!() };

    // Outbound on the holding side, then intercepting from the other side.
    let segments = entry.chain().segments();
    assert!(segments.iter().any(|segment| segment.end().long > 0.01));
    let Some(crate::guidance::path::Segment::Line(intercept)) = segments.last() else {
        panic!("expected a final intercept line");
    };
    assert!(intercept.start.long < 0.);
    assert_heading(intercept.final_course, 45., 0.5);
}

#[test]
fn short_hold_entries_still_join_inbound_course() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _ in 0..64 {
        let inbound = Heading::from_degrees(rng.random_range(0. ..360.));
        let arrival = Heading::from_degrees(rng.random_range(0. ..360.));
        let turn = if rng.random_bool(0.5) {
            TurnDirection::Clockwise
        } else {
            TurnDirection::CounterClockwise
        };
        let distance = HoldDistance::Distance(Length::from_nm(rng.random_range(0.1..5.)));
        let hold = Leg::new(
            2,
            LegInfo::default(),
            HoldLeg::new(fix("HOLD", 0., 0.), inbound, turn, distance, HoldTermination::Manual, None),
        );

        let transition = entry_into(hold, arrival);
        if transition.path_vectors().is_empty() {
            let super::Kind::HoldEntry(entry) = &transition.kind else { unreachable!() };
            assert_eq!(entry.entry(), HoldEntry::Null);
            continue;
        }
        assert_ends_on_inbound_course(&transition, inbound);
    }
}

#[test]
fn hold_entry_not_rebuilt_while_active() {
    let prev = computed_leg(
        Leg::new(1, LegInfo::default(), TfLeg::new(fix("A", -1., -1.), fix("HOLD", 0., 0.))),
        state_at(LatLong::new(-1., -1.), 45., 220.),
    );
    let next = hold_at_origin(2);

    let mut transition = Transition::new(1, HoldEntryTransition::default());
    transition.recompute(&prev, &next, &inactive_context(1, 220.)).expect("compute");
    let before = transition.path_vectors();

    let active = recompute_context(1, state_at(LatLong::new(0.01, 0.01), 120., 220.));
    transition.recompute(&prev, &next, &active).expect("recompute while flown");
    assert_eq!(transition.path_vectors(), before);
}

#[test]
fn hold_entry_into_non_hold_fails() {
    let (prev, next) = legs_through_origin(Heading::EAST, Heading::SOUTH);
    let mut transition = Transition::new(1, HoldEntryTransition::default());
    let err = transition
        .recompute(&prev, &next, &inactive_context(1, 220.))
        .expect_err("not a hold");
    assert!(matches!(err, GuidanceError::DegenerateGeometry { index: 1, .. }));
    assert_eq!(transition.state(), TransitionState::Pending);
}

#[test]
fn missing_terminator_leaves_transition_pending() {
    let prev = Leg::new(1, LegInfo::default(), CaLeg::new(Heading::EAST, Length::from_feet(8000.)));
    let next = Leg::new(2, LegInfo::default(), DfLeg::new(fix("C", 0., 1.)));

    let mut transition = Transition::new(1, DirectToFixTransition::default());
    let err = transition
        .recompute(&prev, &next, &inactive_context(1, 250.))
        .expect_err("uncomputed course to altitude has no terminator");
    assert!(matches!(err, GuidanceError::MissingTerminator { index: 1, .. }));
    assert_eq!(transition.terminator(), None);
    assert_eq!(transition.radius(), None);
}
