use serde::{Deserialize, Serialize};

/// ARINC 424 path and terminator codes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum LegType {
    /// Initial fix.
    If,
    /// Track to a fix.
    Tf,
    /// Course to a fix.
    Cf,
    /// Direct to a fix.
    Df,
    /// Fix to an altitude.
    Fa,
    /// Track from a fix for a distance.
    Fc,
    /// Track from a fix to a DME distance.
    Fd,
    /// Track from a fix to a manual termination.
    Fm,
    /// Course to an altitude.
    Ca,
    /// Course to a DME distance.
    Cd,
    /// Course to an intercept.
    Ci,
    /// Course to a radial.
    Cr,
    /// Constant radius arc to a fix.
    Rf,
    /// Arc to a fix around a navaid.
    Af,
    /// Heading to an altitude.
    Va,
    /// Heading to a DME distance.
    Vd,
    /// Heading to an intercept.
    Vi,
    /// Heading to a manual termination.
    Vm,
    /// Heading to a radial.
    Vr,
    /// Procedure turn.
    Pi,
    /// Hold terminated at an altitude.
    Ha,
    /// Hold terminated at the fix after one circuit.
    Hf,
    /// Hold with manual termination.
    Hm,
}

impl LegType {
    /// Whether the leg ends at a database fix rather than a floating position.
    #[must_use]
    pub fn is_fix_terminated(self) -> bool {
        matches!(
            self,
            Self::If | Self::Tf | Self::Cf | Self::Df | Self::Rf | Self::Af | Self::Ha | Self::Hf | Self::Hm
        )
    }
}
