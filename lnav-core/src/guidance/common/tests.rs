use math::{Angle, Length, Speed};

use super::{fly_by_bank_angle, max_bank_angle, roll_anticipation_distance};

fn assert_angle(actual: Angle, degrees: f64) {
    assert!(
        (actual.into_degrees() - degrees).abs() < 1e-6,
        "expected {degrees}°, got {:?}",
        actual
    );
}

#[test]
fn bank_schedule_ramps_at_both_ends() {
    assert_angle(max_bank_angle(Speed::ZERO), 15.);
    assert_angle(max_bank_angle(Speed::from_knots(75.)), 20.);
    assert_angle(max_bank_angle(Speed::from_knots(150.)), 25.);
    assert_angle(max_bank_angle(Speed::from_knots(200.)), 25.);
    assert_angle(max_bank_angle(Speed::from_knots(300.)), 25.);
    assert_angle(max_bank_angle(Speed::from_knots(375.)), 22.);
    assert_angle(max_bank_angle(Speed::from_knots(450.)), 19.);
    assert_angle(max_bank_angle(Speed::from_knots(520.)), 19.);
}

#[test]
fn fly_by_bank_is_half_course_change() {
    let tas = Speed::from_knots(250.);
    assert_angle(fly_by_bank_angle(Angle::from_degrees(4.), tas), 5.);
    assert_angle(fly_by_bank_angle(Angle::from_degrees(-30.), tas), 15.);
    assert_angle(fly_by_bank_angle(Angle::from_degrees(90.), tas), 25.);
}

#[test]
fn roll_anticipation_grows_with_speed_and_bank() {
    let slow = roll_anticipation_distance(Speed::from_knots(200.), Angle::from_degrees(25.));
    let fast = roll_anticipation_distance(Speed::from_knots(300.), Angle::from_degrees(25.));
    let shallow = roll_anticipation_distance(Speed::from_knots(300.), Angle::from_degrees(10.));

    assert!(slow < fast);
    assert!(shallow < fast);
    assert!((fast.into_nm() - 0.384).abs() < 0.01, "{fast:?}");
}

#[test]
fn no_anticipation_without_bank_change() {
    let rad = roll_anticipation_distance(Speed::from_knots(250.), Angle::ZERO);
    assert_eq!(rad, Length::ZERO);
}
