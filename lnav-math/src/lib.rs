#![allow(
    clippy::excessive_precision,
    clippy::unreadable_literal,
    reason = "we don't really want to read the mathematical constants in this file."
)]

mod units;
pub use units::*;

pub mod geo;
pub use geo::LatLong;

mod physics;
pub use physics::*;
