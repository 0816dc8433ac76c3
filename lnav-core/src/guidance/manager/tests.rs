use math::{Heading, LatLong, Length, Speed};
use store::{LegPath, LegType};

use super::{build_active_geometry, build_full_geometry, build_leg, update_active_geometry};
use crate::guidance::leg::Kind;
use crate::guidance::test_util::{plan, spec, spec_at, state_at, zigzag_plan};
use crate::guidance::transition::{TransitionState, TransitionType};
use crate::guidance::{Guidable, GuidanceError};

fn built(plan: &store::FlightPlan, index: usize) -> crate::guidance::leg::Leg {
    build_leg(plan, index).expect("supported").expect("joined")
}

#[test]
fn discontinuity_leaves_next_leg_unbuilt() {
    let mut plan = zigzag_plan(1);
    plan.legs[1].ends_in_discontinuity = true;

    assert!(build_leg(&plan, 2).expect("no error").is_none());
    assert!(matches!(built(&plan, 3).kind, Kind::Tf(_)));

    plan.legs[2].path = LegPath::If;
    assert!(matches!(built(&plan, 2).kind, Kind::If(_)));
}

#[test]
fn discontinuity_breaks_geometry_chain() {
    let mut plan = zigzag_plan(1);
    plan.legs[1].ends_in_discontinuity = true;
    let geometry = build_full_geometry(&plan);

    assert!(geometry.leg(1).is_some());
    assert!(geometry.leg(2).is_none());
    assert!(geometry.transition(1).is_none());
    assert!(geometry.transition(2).is_none());
    assert!(geometry.diagnostics().is_empty());
}

#[test]
fn track_without_previous_fix_flies_direct() {
    let plan = plan(
        1,
        vec![
            spec(None, LegPath::Ca { course: Heading::NORTH, altitude: Length::from_feet(3000.) }),
            spec_at("B", 1., 0., LegPath::Tf),
        ],
    );
    let leg = built(&plan, 1);
    assert!(matches!(leg.kind, Kind::Df(_)));
    assert_eq!(leg.ident(), "B");
}

#[test]
fn track_from_previous_fix() {
    let plan = zigzag_plan(1);
    let Kind::Tf(tf) = built(&plan, 2).kind else { panic!("expected track to fix") };
    assert_eq!(tf.from.ident, "B");
    assert_eq!(tf.to.ident, "C");
}

#[test]
fn unsupported_type_substitutes_track() {
    let plan = plan(
        1,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec_at("B", 0., 1., LegPath::Other { leg_type: LegType::Cf }),
            spec_at("C", 0., 2., LegPath::Tf),
        ],
    );

    let leg = built(&plan, 1);
    assert!(matches!(leg.kind, Kind::Tf(_)));
    assert_eq!(leg.info.substituted_for, Some(LegType::Cf));
    assert_eq!(leg.repr(), "TF FROM A TO B (FOR CF)");

    let geometry = build_full_geometry(&plan);
    assert_eq!(
        geometry.diagnostics(),
        [GuidanceError::UnsupportedLegType { index: 1, leg_type: LegType::Cf }]
    );
}

#[test]
fn unsupported_type_without_previous_fix_fails() {
    let plan = plan(
        1,
        vec![
            spec(None, LegPath::Vm { heading: Heading::EAST }),
            spec_at("B", 0., 1., LegPath::Other { leg_type: LegType::Fm }),
        ],
    );
    assert_eq!(
        build_leg(&plan, 1).expect_err("nothing to substitute"),
        GuidanceError::UnsupportedLegType { index: 1, leg_type: LegType::Fm }
    );
}

#[test]
fn missing_fix_is_reported() {
    let mut plan = zigzag_plan(1);
    plan.legs[2].fix = None;
    assert_eq!(
        build_leg(&plan, 2).expect_err("track needs a fix"),
        GuidanceError::MissingTerminator { index: 2, leg_type: LegType::Tf }
    );

    let geometry = build_full_geometry(&plan);
    assert!(geometry.leg(2).is_none());
    assert_eq!(
        geometry.diagnostics(),
        [GuidanceError::MissingTerminator { index: 2, leg_type: LegType::Tf }]
    );
}

#[test]
fn arc_needs_previous_fix() {
    let plan = plan(
        1,
        vec![
            spec(None, LegPath::Vm { heading: Heading::EAST }),
            spec_at("B", 0., 1., LegPath::Rf { centre: LatLong::new(0.1, 1.), turn: None }),
        ],
    );
    assert_eq!(
        build_leg(&plan, 1).expect_err("arc needs a start"),
        GuidanceError::MissingTerminator { index: 1, leg_type: LegType::Rf }
    );
}

#[test]
fn hold_takes_speed_constraint() {
    let mut plan = plan(
        1,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec_at(
                "H",
                0.,
                0.,
                LegPath::Hold {
                    inbound_course: Heading::NORTH,
                    turn:           math::TurnDirection::Clockwise,
                    distance:       store::HoldDistance::Minutes(1.),
                    termination:    store::HoldTermination::Fix,
                },
            ),
        ],
    );
    plan.legs[1].speed_constraint = Some(store::SpeedConstraint {
        kind:  store::SpeedConstraintKind::AtOrBelow,
        speed: Speed::from_knots(200.),
    });

    let Kind::Hold(hold) = built(&plan, 1).kind else { panic!("expected hold") };
    assert_eq!(hold.speed_constraint, Some(Speed::from_knots(200.)));
}

#[test]
fn hold_speed_band_follows_coded_altitude() {
    let mut plan = plan(
        1,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec_at(
                "H",
                0.,
                0.,
                LegPath::Hold {
                    inbound_course: Heading::NORTH,
                    turn:           math::TurnDirection::Clockwise,
                    distance:       store::HoldDistance::Minutes(1.),
                    termination:    store::HoldTermination::Manual,
                },
            ),
        ],
    );
    let aircraft_altitude = Length::from_feet(5000.);

    let Kind::Hold(hold) = built(&plan, 1).kind else { panic!("expected hold") };
    assert_eq!(hold.speed_band_altitude(aircraft_altitude), aircraft_altitude);

    plan.legs[1].altitude_constraint =
        Some(store::AltitudeConstraint::AtOrAbove { altitude: Length::from_feet(15000.) });
    let Kind::Hold(hold) = built(&plan, 1).kind else { panic!("expected hold") };
    assert_eq!(hold.speed_band_altitude(aircraft_altitude), Length::from_feet(15000.));
}

#[test]
fn active_window_links_adjacent_legs() {
    let geometry = build_active_geometry(&zigzag_plan(2));
    assert_eq!((geometry.first_index(), geometry.end_index()), (1, 4));
    assert_eq!(geometry.version(), 1);

    let types: Vec<_> = (1..4)
        .map(|index| geometry.transition(index).map(|transition| transition.transition_type()))
        .collect();
    assert_eq!(
        types,
        [Some(TransitionType::FixedRadius), Some(TransitionType::FixedRadius), None]
    );
}

#[test]
fn full_geometry_starts_before_active_leg() {
    let geometry = build_full_geometry(&zigzag_plan(0));
    assert_eq!((geometry.first_index(), geometry.end_index()), (0, 4));

    let geometry = build_full_geometry(&zigzag_plan(3));
    assert_eq!((geometry.first_index(), geometry.end_index()), (2, 4));
}

#[test]
fn unsupported_sequence_joins_directly() {
    let plan = plan(
        1,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec(None, LegPath::Vm { heading: Heading::EAST }),
            spec_at(
                "H",
                1.,
                1.,
                LegPath::Hold {
                    inbound_course: Heading::NORTH,
                    turn:           math::TurnDirection::Clockwise,
                    distance:       store::HoldDistance::Minutes(1.),
                    termination:    store::HoldTermination::Manual,
                },
            ),
        ],
    );
    let geometry = build_full_geometry(&plan);
    assert!(geometry.leg(2).is_some());
    assert!(geometry.transition(1).is_none());
    assert_eq!(
        geometry.diagnostics(),
        [GuidanceError::UnsupportedLegSequence { index: 1, from: LegType::Vm, to: LegType::Hm }]
    );
}

fn long_plan(active_leg: usize) -> store::FlightPlan {
    let mut plan = zigzag_plan(active_leg);
    plan.legs.push(spec_at("E", 0., 2., LegPath::Tf));
    plan
}

#[test]
fn sequencing_shifts_active_window() {
    let mut plan = long_plan(2);
    let mut geometry = build_active_geometry(&plan);
    let state = state_at(LatLong::new(-0.5, 1.), 180., 250.);
    geometry.recompute_with_parameters(2, &state, Speed::from_knots(150.));

    // Freeze the turn out of the active leg.
    let Some(crate::guidance::transition::Kind::FixedRadius(fly_by)) =
        geometry.transition(2).map(|transition| &transition.kind)
    else {
        panic!("expected fly-by");
    };
    let arc = *fly_by.arc().expect("turn");
    let on_turn = arc.point_before_end(arc.length() / 2.).expect("on arc");
    geometry.update_state(2, &state_at(on_turn, 135., 250.));
    assert_eq!(geometry.transition(2).expect("turn").state(), TransitionState::Frozen);

    plan.active_leg = 3;
    assert!(update_active_geometry(&mut geometry, &plan));
    assert_eq!((geometry.first_index(), geometry.end_index()), (2, 5));
    assert_eq!(geometry.active_leg(), 3);
    assert_eq!(geometry.transition(2).expect("kept").state(), TransitionState::Frozen);
    assert!(geometry.leg(4).is_some());
    assert_eq!(
        geometry.transition(3).map(|transition| transition.transition_type()),
        Some(TransitionType::FixedRadius)
    );
}

#[test]
fn edit_rebuilds_active_window() {
    let mut plan = long_plan(2);
    let mut geometry = build_active_geometry(&plan);

    plan.active_leg = 3;
    plan.bump_version();
    assert!(!update_active_geometry(&mut geometry, &plan));
    assert_eq!(geometry.version(), 2);
    assert_eq!((geometry.first_index(), geometry.end_index()), (2, 5));
}

#[test]
fn direct_jump_rebuilds_active_window() {
    let mut plan = long_plan(1);
    let mut geometry = build_active_geometry(&plan);

    plan.active_leg = 3;
    assert!(!update_active_geometry(&mut geometry, &plan));
    assert_eq!(geometry.active_leg(), 3);
    assert_eq!((geometry.first_index(), geometry.end_index()), (2, 5));
}

#[test]
fn unchanged_plan_keeps_window() {
    let plan = long_plan(2);
    let mut geometry = build_active_geometry(&plan);
    assert!(!update_active_geometry(&mut geometry, &plan));
    assert_eq!((geometry.first_index(), geometry.end_index()), (1, 4));
}
