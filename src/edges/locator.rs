//! Strategy dispatch: profile in, edge index out.
use super::neonatal::{neonatal_pial_surface, neonatal_white_surface, TissuePrior};
use super::search::{
    center, closest_extremum, closest_maximum, closest_minimum, extremum, strongest_extremum,
    strongest_maximum, strongest_minimum,
};
use super::strategy::EdgeStrategy;
use super::veto::apply_vetoes;

/// Intensity and gradient thresholds shared by all strategies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeThresholds {
    /// Intensities below this value are background.
    pub padding: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub min_gradient: f64,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            padding: f64::NEG_INFINITY,
            min_intensity: f64::NEG_INFINITY,
            max_intensity: f64::INFINITY,
            min_gradient: 0.0,
        }
    }
}

impl EdgeThresholds {
    pub fn has_intensity_range(&self) -> bool {
        self.min_intensity.is_finite() || self.max_intensity.is_finite()
    }

    pub fn has_padding(&self) -> bool {
        self.padding.is_finite()
    }

    /// Whether edges found by `strategy` need the intensity profile.
    pub fn needs_intensity(&self, strategy: EdgeStrategy) -> bool {
        strategy.needs_intensity()
            || (strategy.uses_veto() && (self.has_intensity_range() || self.has_padding()))
    }
}

type GradientSearch = fn(&[f64]) -> usize;

impl EdgeStrategy {
    /// Search routine for strategies that only look at the gradient.
    fn gradient_search(self) -> Option<GradientSearch> {
        let search: GradientSearch = match self {
            EdgeStrategy::Extremum => extremum,
            EdgeStrategy::ClosestMinimum => closest_minimum,
            EdgeStrategy::ClosestMaximum => closest_maximum,
            EdgeStrategy::ClosestExtremum => closest_extremum,
            EdgeStrategy::StrongestMinimum => strongest_minimum,
            EdgeStrategy::StrongestMaximum => strongest_maximum,
            EdgeStrategy::StrongestExtremum => strongest_extremum,
            EdgeStrategy::NeonatalWhiteSurface | EdgeStrategy::NeonatalPialSurface => {
                return None
            }
        };
        Some(search)
    }
}

/// Locate the edge on a sampled ray.
///
/// `g` is the gradient profile, `f` the intensity profile (required by the
/// neonatal white-surface heuristic and by the vetoes). The result is an
/// index into `g`; the centre index means no edge.
pub fn locate_edge(
    strategy: EdgeStrategy,
    g: &[f64],
    f: Option<&[f64]>,
    thresholds: &EdgeThresholds,
    prior: &TissuePrior,
) -> usize {
    let r = center(g);
    let j = match strategy.gradient_search() {
        Some(search) => search(g),
        None => match strategy {
            EdgeStrategy::NeonatalWhiteSurface => match f {
                Some(f) => neonatal_white_surface(f, g, thresholds, prior),
                None => r,
            },
            _ => neonatal_pial_surface(g, thresholds.min_gradient),
        },
    };
    if strategy.uses_veto() {
        apply_vetoes(j, g, f, thresholds)
    } else {
        j
    }
}
