//! Boundary heuristics for T2-weighted neonatal brain MRI.
//!
//! In T2-weighted neonatal images unmyelinated white matter appears brighter
//! than cortical grey matter, and CSF brighter than both. Walking outward
//! from the white surface therefore crosses a bright-to-dark transition
//! (negative gradient) at the WM/cGM boundary and a dark-to-bright one
//! (positive gradient) at the cGM/CSF boundary.
use super::locator::EdgeThresholds;
use super::search::center;
use crate::stats::TissueStatistics;

/// Tissue intensity model at the vertex voxel.
#[derive(Clone, Copy, Debug)]
pub struct TissuePrior {
    pub white_mean: f64,
    pub white_variance: f64,
    pub grey_mean: f64,
    pub grey_variance: f64,
}

impl TissuePrior {
    /// No statistics: candidates are scored by gradient strength only.
    pub fn unknown() -> Self {
        Self {
            white_mean: f64::NAN,
            white_variance: f64::NAN,
            grey_mean: f64::NAN,
            grey_variance: f64::NAN,
        }
    }

    /// Local (else global) tissue statistics at `voxel`.
    pub fn at_voxel(stats: &TissueStatistics, voxel: [isize; 3]) -> Self {
        let (white_mean, white_variance) = stats.white_matter.at(voxel);
        let (grey_mean, grey_variance) = stats.grey_matter.at(voxel);
        Self {
            white_mean,
            white_variance,
            grey_mean,
            grey_variance,
        }
    }
}

#[inline]
fn gaussian_likelihood(x: f64, mean: f64, variance: f64) -> f64 {
    let d = x - mean;
    (-0.5 * d * d / variance).exp()
}

/// `g[j]` is a strict local extremum of its immediate neighbours.
#[inline]
fn is_turning_point(g: &[f64], j: usize) -> bool {
    (g[j] - g[j - 1]) * (g[j] - g[j + 1]) > 0.0
}

/// Confirm a negative-gradient candidate at `i`: the next turning point after
/// it must be a positive gradient, i.e. the profile rises back through zero.
fn confirm_transition(g: &[f64], i: usize, g1: f64) -> bool {
    let k = g.len();
    let mut j = i + 1;
    while j < k - 2 && !is_turning_point(g, j) {
        j += 1;
    }
    g[i] < g1 && g.get(j).is_some_and(|&v| v > 0.0)
}

/// Inward candidate: a local minimum of the gradient below `-min_gradient`.
fn inward_candidate(g: &[f64], r: usize, g1: f64) -> Option<usize> {
    let mut i = r;
    while i > 1 && !(g[i] < g1 && g[i] < g[i - 1]) {
        i -= 1;
    }
    confirm_transition(g, i, g1).then_some(i)
}

/// Outward candidate: stops at the first sample outside the dead band
/// `[-min_gradient, +min_gradient]` where the gradient starts rising.
fn outward_candidate(g: &[f64], r: usize, g1: f64, g2: f64) -> Option<usize> {
    let k = g.len();
    let mut i = r;
    while i < k - 2 && !((g[i] < g1 || g[i] > g2) && g[i] < g[i + 1]) {
        i += 1;
    }
    confirm_transition(g, i, g1).then_some(i)
}

/// Check the intensities bracketing candidate `i` and score it.
///
/// The bright (white matter) side is the local intensity maximum reached by
/// walking inward, the dark (grey matter) side the local minimum reached by
/// walking outward. Returns `None` if the candidate is rejected.
fn score_candidate(
    f: &[f64],
    g: &[f64],
    i: usize,
    thresholds: &EdgeThresholds,
    prior: &TissuePrior,
) -> Option<f64> {
    let k = f.len();
    let mut iw = i;
    while iw > 0 && f[iw - 1] >= f[iw] {
        iw -= 1;
    }
    let mut ig = i;
    while ig < k - 1 && f[ig + 1] <= f[ig] {
        ig += 1;
    }
    let bright = f[iw];
    let dark = f[ig];
    if bright.is_nan() || dark.is_nan() {
        return None;
    }
    if bright > thresholds.max_intensity {
        return None;
    }
    if dark < thresholds.min_intensity || dark < thresholds.padding {
        return None;
    }

    let wm_unknown = prior.white_mean.is_nan()
        || prior.white_variance.is_nan()
        || prior.white_variance == 0.0;
    let mut score = if wm_unknown {
        g[i].abs()
    } else {
        gaussian_likelihood(bright, prior.white_mean, prior.white_variance)
    };
    if dark > prior.grey_mean && prior.grey_variance > 0.0 {
        score *= gaussian_likelihood(dark, prior.grey_mean, prior.grey_variance);
    }
    Some(score)
}

/// Locate the WM/cGM boundary; returns the centre index if none qualifies.
pub fn neonatal_white_surface(
    f: &[f64],
    g: &[f64],
    thresholds: &EdgeThresholds,
    prior: &TissuePrior,
) -> usize {
    let k = g.len();
    let r = center(g);
    if k < 5 || f.len() != k {
        return r;
    }
    let g1 = -thresholds.min_gradient;
    let g2 = thresholds.min_gradient;

    let scored = |i: Option<usize>| {
        i.and_then(|i| score_candidate(f, g, i, thresholds, prior).map(|s| (i, s)))
    };
    let inward = scored(inward_candidate(g, r, g1));
    let outward = scored(outward_candidate(g, r, g1, g2));

    match (inward, outward) {
        (Some((a, sa)), Some((b, sb))) => {
            if sa < sb {
                b
            } else {
                a
            }
        }
        (Some((a, _)), None) => a,
        (None, Some((b, _))) => b,
        (None, None) => r,
    }
}

/// Locate the cGM/CSF boundary: the nearest local maximum of the gradient
/// above `min_gradient` on either side. Ties go outward.
pub fn neonatal_pial_surface(g: &[f64], min_gradient: f64) -> usize {
    let k = g.len();
    let r = center(g);
    if k == 0 {
        return r;
    }
    let peak = |v: f64, next: f64| v > min_gradient && !(v < next);
    let valid = |i: usize| g[i] > 0.0 && g[i] > min_gradient;

    let mut i = r;
    while i < k - 1 && g[i].is_nan() {
        i += 1;
    }
    while i < k - 1 && !peak(g[i], g[i + 1]) {
        i += 1;
    }
    let outward = valid(i).then_some(i);

    let mut i = r;
    while i > 0 && !peak(g[i], g[i - 1]) {
        i -= 1;
    }
    let inward = valid(i).then_some(i);

    match (inward, outward) {
        (Some(a), Some(b)) => {
            if r.abs_diff(b) <= r.abs_diff(a) {
                b
            } else {
                a
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(min_gradient: f64) -> EdgeThresholds {
        EdgeThresholds {
            min_gradient,
            ..EdgeThresholds::default()
        }
    }

    // Bright WM (inward) to dark GM (outward) with a confirming rebound.
    const WM_GM_F: [f64; 11] = [
        100.0, 100.0, 100.0, 100.0, 100.0, 90.0, 70.0, 55.0, 50.0, 52.0, 54.0,
    ];
    const WM_GM_G: [f64; 11] = [0.0, 0.0, 0.0, 0.0, -2.0, -10.0, -18.0, -10.0, -1.0, 2.0, 1.0];

    #[test]
    fn white_surface_finds_outward_transition() {
        let j = neonatal_white_surface(&WM_GM_F, &WM_GM_G, &thresholds(1.0), &TissuePrior::unknown());
        assert_eq!(j, 6);
    }

    #[test]
    fn white_surface_rejects_too_bright_white_matter() {
        let t = EdgeThresholds {
            min_gradient: 1.0,
            max_intensity: 95.0,
            ..EdgeThresholds::default()
        };
        let j = neonatal_white_surface(&WM_GM_F, &WM_GM_G, &t, &TissuePrior::unknown());
        assert_eq!(j, 5);
    }

    #[test]
    fn white_surface_prefers_likely_tissue_intensities() {
        // Two transitions: 100 -> 55 inward, 62 -> 20 (steeper) outward.
        let f = [
            100.0, 100.0, 80.0, 60.0, 55.0, 58.0, 62.0, 60.0, 40.0, 20.0, 22.0, 24.0, 26.0,
        ];
        let g = [
            0.0, -10.0, -20.0, -10.0, 2.0, 3.0, 1.0, -10.0, -25.0, -10.0, 1.0, 2.0, 1.0,
        ];
        let prior = TissuePrior {
            white_mean: 100.0,
            white_variance: 25.0,
            grey_mean: 60.0,
            grey_variance: 25.0,
        };
        assert_eq!(neonatal_white_surface(&f, &g, &thresholds(1.0), &prior), 2);
        assert_eq!(
            neonatal_white_surface(&f, &g, &thresholds(1.0), &TissuePrior::unknown()),
            8
        );
    }

    #[test]
    fn white_surface_without_transition_returns_centre() {
        let f = [50.0; 9];
        let g = [0.0; 9];
        assert_eq!(neonatal_white_surface(&f, &g, &thresholds(0.5), &TissuePrior::unknown()), 4);
        let nan = [f64::NAN; 9];
        assert_eq!(neonatal_white_surface(&nan, &nan, &thresholds(0.5), &TissuePrior::unknown()), 4);
    }

    #[test]
    fn pial_surface_picks_nearest_positive_peak() {
        let g = [0.0, 0.0, 0.0, 3.0, 1.0, 0.0, 0.5, 1.0, 2.0, 4.0, 1.0];
        assert_eq!(neonatal_pial_surface(&g, 0.5), 3);
        assert_eq!(neonatal_pial_surface(&g, 3.5), 9);
        assert_eq!(neonatal_pial_surface(&g, 5.0), 5);
    }

    #[test]
    fn pial_surface_ignores_nan() {
        let nan = f64::NAN;
        let g = [nan, nan, nan, nan, nan, 1.0, 2.0, 1.0, 0.0];
        assert_eq!(neonatal_pial_surface(&g, 0.0), 6);
        assert_eq!(neonatal_pial_surface(&[nan; 7], 0.0), 3);
    }
}
