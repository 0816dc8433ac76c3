use store::LegType;

/// Failure to build or compute part of the lateral path.
///
/// None of these abort the geometry as a whole;
/// the affected leg or transition reports unavailable guidance instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuidanceError {
    #[error("no transition is defined from {from} leg {index} to {to} leg")]
    UnsupportedLegSequence { index: usize, from: LegType, to: LegType },
    #[error("{leg_type} leg {index} has no dedicated path geometry")]
    UnsupportedLegType { index: usize, leg_type: LegType },
    #[error("terminator of {leg_type} leg {index} cannot be resolved")]
    MissingTerminator { index: usize, leg_type: LegType },
    #[error("degenerate geometry at {index}: {reason}")]
    DegenerateGeometry { index: usize, reason: &'static str },
}

impl GuidanceError {
    /// Index of the leg, or of the leg preceding the transition, that produced this error.
    #[must_use]
    pub fn index(&self) -> usize {
        match *self {
            Self::UnsupportedLegSequence { index, .. }
            | Self::UnsupportedLegType { index, .. }
            | Self::MissingTerminator { index, .. }
            | Self::DegenerateGeometry { index, .. } => index,
        }
    }
}
