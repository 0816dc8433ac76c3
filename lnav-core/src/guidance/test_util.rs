use math::{Heading, LatLong, Length, Speed};
use store::{Fix, FlightPlan, LegPath, LegSpec, SegmentType};

use super::AircraftState;

pub(crate) fn fix(ident: &str, lat: f64, long: f64) -> Fix {
    Fix { ident: ident.into(), position: LatLong::new(lat, long) }
}

pub(crate) fn state_at(position: LatLong, track_degrees: f64, speed_knots: f64) -> AircraftState {
    AircraftState {
        position,
        true_track: Heading::from_degrees(track_degrees),
        true_airspeed: Speed::from_knots(speed_knots),
        ground_speed: Speed::from_knots(speed_knots),
        altitude: Length::from_feet(5000.),
        vertical_speed: Speed::ZERO,
    }
}

pub(crate) fn assert_nm(actual: Length, expected_nm: f64, tolerance_nm: f64) {
    assert!(
        (actual.into_nm() - expected_nm).abs() <= tolerance_nm,
        "expected {expected_nm} nm, got {actual:?}",
    );
}

pub(crate) fn assert_degrees(actual: math::Angle, expected: f64, tolerance: f64) {
    assert!(
        (actual.into_degrees() - expected).abs() <= tolerance,
        "expected {expected}°, got {actual:?}",
    );
}

pub(crate) fn assert_heading(actual: Heading, expected: f64, tolerance: f64) {
    let error = (actual - Heading::from_degrees(expected)).into_degrees();
    assert!(error.abs() <= tolerance, "expected heading {expected}°, got {actual}");
}

pub(crate) fn recompute_context(index: usize, state: AircraftState) -> super::RecomputeContext {
    super::RecomputeContext {
        index,
        is_active: true,
        state,
        true_airspeed: state.true_airspeed,
        ground_speed: state.ground_speed,
        start: None,
    }
}

pub(crate) fn spec(fix: Option<Fix>, path: LegPath) -> LegSpec {
    LegSpec {
        fix,
        path,
        segment: SegmentType::default(),
        altitude_constraint: None,
        speed_constraint: None,
        predicted_speed: None,
        ends_in_discontinuity: false,
    }
}

/// A leg ending at a fix named `ident`.
pub(crate) fn spec_at(ident: &str, lat: f64, long: f64, path: LegPath) -> LegSpec {
    spec(Some(fix(ident, lat, long)), path)
}

pub(crate) fn plan(active_leg: usize, legs: Vec<LegSpec>) -> FlightPlan {
    FlightPlan { version: 1, active_leg, legs }
}

/// IF A, TF B on course 090, TF C on course 180, TF D on course 090.
pub(crate) fn zigzag_plan(active_leg: usize) -> FlightPlan {
    plan(
        active_leg,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec_at("B", 0., 1., LegPath::Tf),
            spec_at("C", -1., 1., LegPath::Tf),
            spec_at("D", -1., 2., LegPath::Tf),
        ],
    )
}
