//! Schema of flight plans consumed by lateral guidance.
//!
//! Angles are written in degrees, altitudes in feet and speeds in knots,
//! matching how procedure data is usually published.

#![warn(clippy::pedantic)]
#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![allow(clippy::collapsible_else_if)] // this is usually intentional
#![allow(clippy::missing_panics_doc)]
#![cfg_attr(not(feature = "precommit-checks"), allow(dead_code, unused_variables, unused_imports))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]
#![cfg_attr(feature = "rust-analyzer", allow(unused_imports))]
#![forbid(missing_docs)]

mod constraint;
pub use constraint::*;

mod leg;
pub use leg::*;

mod leg_type;
pub use leg_type::LegType;

mod plan;
pub use plan::*;

pub mod units;
