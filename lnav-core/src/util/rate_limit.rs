use std::time::Duration;

use bevy::ecs::system::{Local, Res, SystemParam};
use bevy::time::{self, Time};

/// Lets a system run at most once per period of virtual time.
#[derive(SystemParam)]
pub struct RateLimit<'w, 's> {
    time:     Res<'w, Time<time::Virtual>>,
    next_run: Local<'s, Option<Duration>>,
}

impl RateLimit<'_, '_> {
    /// Whether the system should run in this frame.
    ///
    /// Never runs while paused or when `period` is zero.
    pub fn should_run(&mut self, period: Duration) -> bool {
        if self.time.is_paused() || period.is_zero() {
            return false;
        }

        let now = self.time.elapsed();
        if self.next_run.is_some_and(|next| now < next) {
            return false;
        }
        *self.next_run = Some(now + period);
        true
    }
}
