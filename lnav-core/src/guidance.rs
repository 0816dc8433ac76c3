//! Lateral guidance along the flight plan.
//!
//! Each aircraft entity carries a [`FlightPlan`] and its [`AircraftState`].
//! The plugin maintains a [`Controller`] on the entity
//! which computes the path geometry and writes [`LateralOutput`] every frame.

use std::marker::PhantomData;
use std::time::Duration;

use bevy::app::{self, App, Plugin};
use bevy::ecs::change_detection::DetectChangesMut;
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::ecs::schedule::{IntoScheduleConfigs, SystemSet};
use bevy::ecs::system::{EntityCommand, Query, Res};
use bevy::ecs::world::EntityWorldMut;
use bevy::time::{self, Time};
use bevy_mod_config::{AppExt, Config, ConfigFieldFor, Manager, ReadConfig};
use math::Speed;

use crate::try_log;
use crate::util::{RateLimit, configure_ordered_system_sets};

pub mod common;
mod error;
pub use error::GuidanceError;
mod guidable;
pub use guidable::{
    AircraftState, ControlLaw, Guidable, GuidableId, GuidanceParameters, RecomputeContext,
};
pub mod controller;
pub use controller::{FlightPlanSource, GuidanceController, Settings};
pub mod geometry;
pub use geometry::{Geometry, GuidanceOutput};
pub mod leg;
pub mod lnav;
pub use lnav::{LateralOutput, LnavDriver};
pub mod manager;
pub mod path;
pub mod picker;
pub mod transition;

#[cfg(test)]
mod test_util;
#[cfg(test)]
mod tests;

pub struct Plug<M>(PhantomData<M>);

impl<M> Default for Plug<M> {
    fn default() -> Self { Self(PhantomData) }
}

impl<M: Manager + Default> Plugin for Plug<M>
where
    Conf: ConfigFieldFor<M>,
{
    fn build(&self, app: &mut App) {
        app.init_config::<M, Conf>("lnav:guidance");
        app.add_message::<LegSequenced>();
        app.add_message::<HoldExitRequest>();
        configure_ordered_system_sets::<SystemSets>(app, app::Update);
        app.add_systems(
            app::Update,
            (hold_exit_system, refresh_system).chain().in_set(SystemSets::Rebuild),
        );
        app.add_systems(app::Update, steer_system.in_set(SystemSets::Guidance));
        app.add_systems(app::Update, export_path_system.in_set(SystemSets::Export));
    }
}

#[derive(Config)]
#[config(expose(read))]
pub struct Conf {
    /// Period between recomputations of the legs around the active leg.
    #[config(default = Duration::from_secs(1))]
    pub active_recompute_period: Duration,
    /// Period between recomputations of the whole flight plan.
    #[config(default = Duration::from_secs(5))]
    pub full_recompute_period:   Duration,
    /// Period between exports of [`PredictedPath`].
    #[config(default = Duration::from_secs(1))]
    pub path_export_period:      Duration,
    /// Whether legs are sequenced automatically when complete.
    #[config(default = true)]
    pub automatic_sequencing:    bool,
    /// Lowest true airspeed in knots assumed for legs without a predicted speed.
    #[config(default = 150.0, min = 0.0, max = 600.0)]
    pub predicted_tas_floor:     f32,
    #[config(default = false)]
    pub log_recomputation:       bool,
    #[config(default = false)]
    pub log_guidance:            bool,
}

impl ConfRead<'_> {
    fn settings(&self) -> Settings {
        Settings {
            active_recompute_period: self.active_recompute_period,
            full_recompute_period:   self.full_recompute_period,
            automatic_sequencing:    self.automatic_sequencing,
            predicted_tas_floor:     Speed::from_knots(f64::from(self.predicted_tas_floor)),
            log_recomputation:       self.log_recomputation,
            log_guidance:            self.log_guidance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet, strum::EnumIter)]
pub enum SystemSets {
    /// Rebuild and recompute geometries.
    Rebuild,
    /// Compute steering output and sequence legs.
    Guidance,
    /// Publish predicted paths for displays.
    Export,
}

/// The flight plan flown by an aircraft.
#[derive(Debug, Clone, Component)]
pub struct FlightPlan(pub store::FlightPlan);

/// Guidance state of an aircraft.
#[derive(Debug, Clone, Default, Component)]
pub struct Controller(pub GuidanceController);

/// Path vectors of the computed flight plan, for display.
#[derive(Debug, Clone, Default, PartialEq, Component)]
pub struct PredictedPath {
    pub vectors: Vec<path::PathVector>,
}

/// Sent when an aircraft sequences its active leg.
#[derive(Debug, Clone, Message)]
pub struct LegSequenced {
    pub aircraft:              Entity,
    /// The leg that was active before sequencing.
    pub from_leg:              usize,
    pub cleared_discontinuity: bool,
}

/// Requests an aircraft to leave the hold at leg `leg` at the next passage of the fix.
#[derive(Debug, Clone, Message)]
pub struct HoldExitRequest {
    pub aircraft: Entity,
    pub leg:      usize,
}

/// Inserts the guidance components on an aircraft entity.
pub struct SpawnCommand {
    pub plan:  store::FlightPlan,
    pub state: AircraftState,
}

impl EntityCommand for SpawnCommand {
    fn apply(self, mut entity: EntityWorldMut) {
        entity.insert((
            FlightPlan(self.plan),
            self.state,
            Controller::default(),
            LateralOutput::default(),
            PredictedPath::default(),
        ));
    }
}

fn hold_exit_system(
    mut reader: MessageReader<HoldExitRequest>,
    mut query: Query<&mut Controller>,
) {
    for request in reader.read() {
        let mut controller = try_log!(
            query.get_mut(request.aircraft),
            expect "hold exit requested for {:?} without guidance" (request.aircraft)
            or continue
        );
        if !controller.0.request_hold_exit(request.leg) {
            bevy::log::warn!("Leg {} of {:?} is not a hold", request.leg, request.aircraft);
        }
    }
}

fn refresh_system(
    time: Res<Time<time::Virtual>>,
    conf: ReadConfig<Conf>,
    query: Query<(&mut Controller, &FlightPlan, &AircraftState)>,
) {
    if time.is_paused() {
        return;
    }

    let settings = conf.read().settings();
    for (mut controller, plan, state) in query {
        controller.0.refresh(time.delta(), &settings, &plan.0, state);
    }
}

fn steer_system(
    time: Res<Time<time::Virtual>>,
    conf: ReadConfig<Conf>,
    query: Query<(Entity, &mut Controller, &mut FlightPlan, &AircraftState, &mut LateralOutput)>,
    mut sequenced_writer: MessageWriter<LegSequenced>,
) {
    if time.is_paused() {
        return;
    }

    let settings = conf.read().settings();
    for (aircraft, mut controller, mut plan, state, mut output) in query {
        let sequenced = controller.0.steer(&settings, &mut plan.0, state);
        output.set_if_neq(*controller.0.output());

        if let Some(sequenced) = sequenced {
            sequenced_writer.write(LegSequenced {
                aircraft,
                from_leg: sequenced.from_leg,
                cleared_discontinuity: sequenced.cleared_discontinuity,
            });
        }
    }
}

fn export_path_system(
    mut rl: RateLimit,
    conf: ReadConfig<Conf>,
    query: Query<(&Controller, &mut PredictedPath)>,
) {
    let conf = conf.read();
    if !rl.should_run(conf.path_export_period) {
        return;
    }

    for (controller, mut path) in query {
        let vectors: Vec<_> = controller.0.full_geometry().path_vectors().collect();
        path.set_if_neq(PredictedPath { vectors });
    }
}
