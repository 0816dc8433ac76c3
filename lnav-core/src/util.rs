use bevy::app::App;
use bevy::ecs::schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet};
use itertools::Itertools;

mod rate_limit;
pub use rate_limit::RateLimit;

/// Orders the variants of a system set enum in declaration order.
pub fn configure_ordered_system_sets<E: strum::IntoEnumIterator + SystemSet + Clone>(
    app: &mut App,
    schedule: impl ScheduleLabel + Clone,
) {
    for (before, after) in E::iter().tuple_windows() {
        app.configure_sets(schedule.clone(), before.before(after));
    }
}
