use serde::{Deserialize, Serialize};

use crate::{HoldDistance, LegPath, LegSpec, LegType};

#[cfg(test)]
mod tests;

/// Ordered legs of the flight plan, as seen by lateral guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FlightPlan {
    /// Monotonically increasing counter, incremented on every edit of `legs`.
    #[serde(default)]
    pub version:    u64,
    /// Index of the leg currently flown.
    #[serde(default)]
    pub active_leg: usize,
    /// The legs in flying order.
    pub legs:       Vec<LegSpec>,
}

impl FlightPlan {
    /// Checks the structural consistency of the flight plan.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.legs.is_empty() && self.active_leg >= self.legs.len() {
            return Err(ValidationError::ActiveLegOutOfRange {
                active: self.active_leg,
                len:    self.legs.len(),
            });
        }

        for (index, leg) in self.legs.iter().enumerate() {
            let leg_type = leg.leg_type();
            if leg_type.is_fix_terminated() && leg.fix.is_none() {
                return Err(ValidationError::MissingFix { index, leg_type });
            }

            match leg.path {
                LegPath::Hold { distance: HoldDistance::Distance(distance), .. }
                    if !distance.is_positive() =>
                {
                    return Err(ValidationError::NonPositiveHoldLength { index });
                }
                LegPath::Hold { distance: HoldDistance::Minutes(minutes), .. }
                    if !minutes.is_finite() || minutes <= 0. =>
                {
                    return Err(ValidationError::NonPositiveHoldLength { index });
                }
                LegPath::Ca { altitude, .. } if !altitude.is_positive() => {
                    return Err(ValidationError::NonPositiveClimbAltitude { index });
                }
                LegPath::Rf { centre, .. } if !centre.is_finite() => {
                    return Err(ValidationError::NonFinitePosition { index });
                }
                _ => {}
            }

            if let Some(fix) = &leg.fix
                && !fix.position.is_finite()
            {
                return Err(ValidationError::NonFinitePosition { index });
            }
        }

        Ok(())
    }

    /// Increments the version counter after an edit.
    pub fn bump_version(&mut self) { self.version += 1; }
}

/// Structural errors in a [`FlightPlan`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The active leg index does not refer to a leg.
    #[error("active leg {active} is out of range for {len} legs")]
    ActiveLegOutOfRange {
        /// The active leg index.
        active: usize,
        /// Number of legs in the flight plan.
        len:    usize,
    },
    /// A fix-terminated leg has no fix.
    #[error("{leg_type} leg {index} has no terminator fix")]
    MissingFix {
        /// Index of the offending leg.
        index:    usize,
        /// Type of the offending leg.
        leg_type: LegType,
    },
    /// A hold has a zero or negative leg length.
    #[error("hold {index} has a non-positive leg length")]
    NonPositiveHoldLength {
        /// Index of the offending leg.
        index: usize,
    },
    /// A course-to-altitude leg targets an altitude at or below zero.
    #[error("leg {index} climbs to a non-positive altitude")]
    NonPositiveClimbAltitude {
        /// Index of the offending leg.
        index: usize,
    },
    /// A position in the leg is not finite.
    #[error("leg {index} contains a non-finite position")]
    NonFinitePosition {
        /// Index of the offending leg.
        index: usize,
    },
}
