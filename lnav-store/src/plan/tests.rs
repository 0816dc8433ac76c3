use math::{Heading, Length, TurnDirection};

use crate::{
    AltitudeConstraint, FlightPlan, HoldDistance, HoldTermination, LegPath, LegType,
    SegmentType, ValidationError,
};

const APPROACH: &str = r#"{
    "version": 3,
    "active_leg": 1,
    "legs": [
        {"fix": {"ident": "ALPHA", "position": {"lat": 47.0, "long": 8.0}}, "path": {"type": "IF"}},
        {
            "fix": {"ident": "BRAVO", "position": {"lat": 47.2, "long": 8.0}},
            "path": {"type": "TF"},
            "segment": "Approach",
            "altitude_constraint": {"type": "AtOrAbove", "altitude": 4000},
            "predicted_speed": 210
        },
        {
            "fix": {"ident": "BRAVO", "position": {"lat": 47.2, "long": 8.0}},
            "path": {
                "type": "HOLD",
                "inbound_course": 180,
                "turn": "CounterClockwise",
                "termination": {"kind": "Altitude", "altitude": 6000}
            }
        },
        {"path": {"type": "CA", "course": 90, "altitude": 2500}, "ends_in_discontinuity": true},
        {"path": {"type": "OTHER", "leg_type": "VI"}}
    ]
}"#;

#[test]
fn parse_handwritten_plan() {
    let plan: FlightPlan = serde_json::from_str(APPROACH).expect("valid json");
    assert_eq!(plan.version, 3);
    assert_eq!(plan.active_leg, 1);
    assert_eq!(plan.legs.len(), 5);

    let bravo = &plan.legs[1];
    assert_eq!(bravo.ident(), "BRAVO");
    assert_eq!(bravo.segment, SegmentType::Approach);
    assert!(
        (bravo.predicted_speed.expect("predicted speed").into_knots() - 210.).abs() < 1e-9
    );
    let Some(AltitudeConstraint::AtOrAbove { altitude }) = bravo.altitude_constraint else {
        panic!("expected an at-or-above constraint, got {:?}", bravo.altitude_constraint)
    };
    assert!((altitude.into_feet() - 4000.).abs() < 1e-9);

    let LegPath::Hold { inbound_course, turn, distance, termination } = plan.legs[2].path else {
        panic!("expected a hold, got {:?}", plan.legs[2].path)
    };
    assert!((inbound_course.degrees() - 180.).abs() < 1e-9);
    assert_eq!(turn, TurnDirection::CounterClockwise);
    assert_eq!(distance, HoldDistance::Minutes(1.));
    assert!(matches!(termination, HoldTermination::Altitude { .. }));

    assert_eq!(plan.legs[2].leg_type(), LegType::Ha);
    assert_eq!(plan.legs[3].leg_type(), LegType::Ca);
    assert!(plan.legs[3].ends_in_discontinuity);
    assert_eq!(plan.legs[4].leg_type(), LegType::Vi);

    plan.validate().expect("plan is consistent");
}

#[test]
fn course_wraps_into_heading_range() {
    let plan: FlightPlan = serde_json::from_str(
        r#"{"legs": [{"path": {"type": "VM", "heading": 370}}]}"#,
    )
    .expect("valid json");
    let LegPath::Vm { heading } = plan.legs[0].path else { panic!("expected VM") };
    assert!((heading - Heading::from_degrees(10.)).abs().into_degrees() < 1e-9);
}

#[test]
fn reject_out_of_range_active_leg() {
    let mut plan: FlightPlan = serde_json::from_str(APPROACH).expect("valid json");
    plan.active_leg = 5;
    assert_eq!(plan.validate(), Err(ValidationError::ActiveLegOutOfRange { active: 5, len: 5 }));
}

#[test]
fn reject_fixless_track() {
    let mut plan: FlightPlan = serde_json::from_str(APPROACH).expect("valid json");
    plan.legs[1].fix = None;
    assert_eq!(
        plan.validate(),
        Err(ValidationError::MissingFix { index: 1, leg_type: LegType::Tf })
    );
}

#[test]
fn reject_empty_hold() {
    let mut plan: FlightPlan = serde_json::from_str(APPROACH).expect("valid json");
    if let LegPath::Hold { distance, .. } = &mut plan.legs[2].path {
        *distance = HoldDistance::Distance(Length::ZERO);
    }
    assert_eq!(plan.validate(), Err(ValidationError::NonPositiveHoldLength { index: 2 }));
}

#[test]
fn reject_climb_to_non_positive_altitude() {
    let plan: FlightPlan = serde_json::from_str(
        r#"{"legs": [{"path": {"type": "CA", "course": 90, "altitude": -500}}]}"#,
    )
    .expect("valid json");
    assert_eq!(plan.validate(), Err(ValidationError::NonPositiveClimbAltitude { index: 0 }));

    let mut plan: FlightPlan = serde_json::from_str(APPROACH).expect("valid json");
    if let LegPath::Ca { altitude, .. } = &mut plan.legs[3].path {
        *altitude = Length::ZERO;
    }
    assert_eq!(plan.validate(), Err(ValidationError::NonPositiveClimbAltitude { index: 3 }));
}

#[test]
fn altitude_constraint_tolerance() {
    let range = AltitudeConstraint::Range {
        lower: Length::from_feet(3000.),
        upper: Length::from_feet(5000.),
    };
    assert!(range.is_satisfied_by(Length::from_feet(2950.), Length::from_feet(100.)));
    assert!(!range.is_satisfied_by(Length::from_feet(5200.), Length::from_feet(100.)));
}
