//! Logging in place of panics inside systems.

use std::fmt;

/// Unwraps `$expr` through [`TryLog`], evaluating `$never` after logging the failure.
///
/// ```ignore
/// let controller = try_log!(query.get_mut(entity), expect "{entity:?} has no guidance" or continue);
/// ```
#[macro_export]
macro_rules! try_log {
    ($expr:expr, expect $must:literal $(($($args:expr),* $(,)?))? or $never:expr) => {{
        let Some(value) =
            $crate::TryLog::ok_or_log($expr, format_args!($must, $($($args),*)?))
        else {
            $never
        };
        value
    }};
}

pub use try_log;

/// A fallible value that [`try_log!`](crate::try_log!) can unwrap.
pub trait TryLog<T> {
    /// Converts to `Some` on success, or logs `context` and returns `None`.
    fn ok_or_log(self, context: fmt::Arguments<'_>) -> Option<T>;
}

impl<T> TryLog<T> for Option<T> {
    fn ok_or_log(self, context: fmt::Arguments<'_>) -> Option<T> {
        if self.is_none() {
            bevy::log::error!("{context}");
        }
        self
    }
}

impl<T, E: fmt::Display> TryLog<T> for Result<T, E> {
    fn ok_or_log(self, context: fmt::Arguments<'_>) -> Option<T> {
        self.inspect_err(|err| bevy::log::error!("{context}: {err}")).ok()
    }
}
