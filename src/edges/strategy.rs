//! Edge selection criteria and their textual names.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which extremum (or transition) of the normal gradient profile counts as
/// the target boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EdgeStrategy {
    /// Closest minimum if the gradient at the vertex is negative, closest
    /// maximum if it is positive, no edge if it is zero.
    #[default]
    Extremum,
    ClosestMinimum,
    ClosestMaximum,
    ClosestExtremum,
    StrongestMinimum,
    StrongestMaximum,
    StrongestExtremum,
    /// WM/cGM boundary in T2-weighted neonatal brain MRI.
    NeonatalWhiteSurface,
    /// cGM/CSF boundary in T2-weighted neonatal brain MRI.
    NeonatalPialSurface,
}

impl EdgeStrategy {
    pub const ALL: [EdgeStrategy; 9] = [
        EdgeStrategy::Extremum,
        EdgeStrategy::ClosestMinimum,
        EdgeStrategy::ClosestMaximum,
        EdgeStrategy::ClosestExtremum,
        EdgeStrategy::StrongestMinimum,
        EdgeStrategy::StrongestMaximum,
        EdgeStrategy::StrongestExtremum,
        EdgeStrategy::NeonatalWhiteSurface,
        EdgeStrategy::NeonatalPialSurface,
    ];

    /// Canonical name, accepted again by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            EdgeStrategy::Extremum => "Extremum",
            EdgeStrategy::ClosestMinimum => "ClosestMinimum",
            EdgeStrategy::ClosestMaximum => "ClosestMaximum",
            EdgeStrategy::ClosestExtremum => "ClosestExtremum",
            EdgeStrategy::StrongestMinimum => "StrongestMinimum",
            EdgeStrategy::StrongestMaximum => "StrongestMaximum",
            EdgeStrategy::StrongestExtremum => "StrongestExtremum",
            EdgeStrategy::NeonatalWhiteSurface => "Neonatal T2-w WM/cGM",
            EdgeStrategy::NeonatalPialSurface => "Neonatal T2-w cGM/CSF",
        }
    }

    /// Whether the locator needs the intensity profile regardless of the
    /// configured thresholds.
    pub fn needs_intensity(self) -> bool {
        matches!(self, EdgeStrategy::NeonatalWhiteSurface)
    }

    /// Whether the intensity/padding veto applies to edges of this kind.
    pub fn uses_veto(self) -> bool {
        !matches!(self, EdgeStrategy::NeonatalWhiteSurface)
    }
}

impl fmt::Display for EdgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let strategy = match key.as_str() {
            "extremum" => EdgeStrategy::Extremum,
            "closestminimum" | "closest minimum" | "localminimum" | "local minimum"
            | "minimum" | "min" => EdgeStrategy::ClosestMinimum,
            "closestmaximum" | "closest maximum" | "localmaximum" | "local maximum"
            | "maximum" | "max" => EdgeStrategy::ClosestMaximum,
            "closestextremum" | "closest extremum" => EdgeStrategy::ClosestExtremum,
            "strongestminimum" | "strongest minimum" => EdgeStrategy::StrongestMinimum,
            "strongestmaximum" | "strongest maximum" => EdgeStrategy::StrongestMaximum,
            "strongestextremum" | "strongest extremum" => EdgeStrategy::StrongestExtremum,
            "neonatal white surface" | "neonatal white" | "neonatal t2-w wm/cgm"
            | "neonatal t2-w cgm/wm" => EdgeStrategy::NeonatalWhiteSurface,
            "neonatal pial surface" | "neonatal pial" | "neonatal t2-w cgm/csf"
            | "neonatal t2-w csf/cgm" => EdgeStrategy::NeonatalPialSurface,
            _ => return Err(ConfigError::UnknownEdgeStrategy(s.to_string())),
        };
        Ok(strategy)
    }
}

impl TryFrom<String> for EdgeStrategy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EdgeStrategy> for String {
    fn from(value: EdgeStrategy) -> Self {
        value.name().to_string()
    }
}
