use std::time::Duration;

use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Messages;
use bevy::time::{self, Time};
use math::{Heading, LatLong, TurnDirection};
use store::{HoldDistance, HoldTermination, LegPath};

use super::test_util::{plan, spec_at, state_at, zigzag_plan};
use super::{
    AircraftState, Controller, FlightPlan, GuidableId, HoldExitRequest, LateralOutput,
    LegSequenced, Plug, PredictedPath, SpawnCommand, leg,
};

fn world_with(plan: store::FlightPlan, state: AircraftState) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(Plug::<()>::default());
    app.init_resource::<Time<time::Virtual>>();

    let aircraft =
        app.world_mut().commands().spawn_empty().queue(SpawnCommand { plan, state }).id();

    app.world_mut().flush();
    (app, aircraft)
}

fn advance_world(app: &mut App, dt: Duration) {
    app.world_mut().resource_mut::<Time<time::Virtual>>().advance_by(dt);
    app.update();
}

fn sequenced_messages(app: &App) -> Vec<LegSequenced> {
    let messages = app.world().resource::<Messages<LegSequenced>>();
    messages.get_cursor().read(messages).cloned().collect()
}

#[test]
fn steers_spawned_aircraft() {
    let (mut app, aircraft) =
        world_with(zigzag_plan(1), state_at(LatLong::new(0., 0.5), 90., 250.));
    app.update();

    let output = app.world().get::<LateralOutput>(aircraft).expect("spawned with output");
    assert!(output.available);
    assert_eq!(output.active_guidable, Some(GuidableId::Leg(1)));
    assert!(sequenced_messages(&app).is_empty());

    let path = app.world().get::<PredictedPath>(aircraft).expect("spawned with path");
    assert_eq!(path.vectors.len(), 5);
}

#[test]
fn sequencing_is_announced() {
    let (mut app, aircraft) =
        world_with(zigzag_plan(1), state_at(LatLong::new(0., 0.5), 90., 250.));
    app.update();

    *app.world_mut().get_mut::<AircraftState>(aircraft).expect("spawned with state") =
        state_at(LatLong::new(-0.01, 1.), 180., 250.);
    advance_world(&mut app, Duration::from_millis(100));

    let plan = app.world().get::<FlightPlan>(aircraft).expect("spawned with plan");
    assert_eq!(plan.0.active_leg, 2);

    let messages = sequenced_messages(&app);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].aircraft, aircraft);
    assert_eq!(messages[0].from_leg, 1);
    assert!(!messages[0].cleared_discontinuity);

    advance_world(&mut app, Duration::from_millis(100));
    let controller = app.world().get::<Controller>(aircraft).expect("spawned with controller");
    assert_eq!(controller.0.active_geometry().active_leg(), 2);
}

#[test]
fn paused_time_skips_guidance() {
    let (mut app, aircraft) =
        world_with(zigzag_plan(1), state_at(LatLong::new(0., 0.5), 90., 250.));
    app.world_mut().resource_mut::<Time<time::Virtual>>().pause();
    app.update();

    let output = app.world().get::<LateralOutput>(aircraft).expect("spawned with output");
    assert!(!output.available);
    let controller = app.world().get::<Controller>(aircraft).expect("spawned with controller");
    assert!(controller.0.active_geometry().leg(1).is_none());
}

#[test]
fn hold_exit_request_reaches_hold() {
    let plan = plan(
        1,
        vec![
            spec_at("A", 0., 0., LegPath::If),
            spec_at(
                "H",
                0.,
                1.,
                LegPath::Hold {
                    inbound_course: Heading::EAST,
                    turn:           TurnDirection::Clockwise,
                    distance:       HoldDistance::Minutes(1.),
                    termination:    HoldTermination::Manual,
                },
            ),
        ],
    );
    let (mut app, aircraft) = world_with(plan, state_at(LatLong::new(0., 0.5), 90., 250.));
    app.update();

    app.world_mut().write_message(HoldExitRequest { aircraft, leg: 1 });
    advance_world(&mut app, Duration::from_millis(100));

    let controller = app.world().get::<Controller>(aircraft).expect("spawned with controller");
    let Some(leg::Kind::Hold(hold)) =
        controller.0.active_geometry().leg(1).map(|leg| &leg.kind)
    else {
        panic!("expected hold");
    };
    assert!(hold.is_exit_requested());
}

#[test]
fn hold_exit_for_unguided_entity_is_ignored() {
    let (mut app, _) = world_with(zigzag_plan(1), state_at(LatLong::new(0., 0.5), 90., 250.));
    let stranger = app.world_mut().spawn_empty().id();

    app.world_mut().write_message(HoldExitRequest { aircraft: stranger, leg: 1 });
    advance_world(&mut app, Duration::from_millis(100));
}

#[test]
fn predicted_path_follows_export_period() {
    let (mut app, aircraft) =
        world_with(zigzag_plan(1), state_at(LatLong::new(0., 0.5), 90., 250.));
    app.update();
    assert_eq!(app.world().get::<PredictedPath>(aircraft).expect("path").vectors.len(), 5);

    let mut plan = app.world_mut().get_mut::<FlightPlan>(aircraft).expect("plan");
    plan.0.legs.truncate(3);
    plan.0.bump_version();

    advance_world(&mut app, Duration::from_millis(500));
    assert_eq!(app.world().get::<PredictedPath>(aircraft).expect("path").vectors.len(), 5);

    advance_world(&mut app, Duration::from_millis(500));
    assert_eq!(app.world().get::<PredictedPath>(aircraft).expect("path").vectors.len(), 3);
}
