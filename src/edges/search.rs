//! Extremum search on a normal gradient profile.
//!
//! A profile of length `k = 2r + 1` is centred on the vertex: index `r` is
//! the vertex itself, smaller indices lie inward, larger ones outward. All
//! searches return an index in `[0, k)`; returning `r` means no edge.
//!
//! NaN samples (outside the image or foreground) are missing information:
//! they are skipped when leaving the centre and never selected as extrema.

/// Extremum polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    Minimum,
    Maximum,
}

impl Polarity {
    /// `a` is strictly more extreme than `b` (false if either is NaN).
    #[inline]
    fn beyond(self, a: f64, b: f64) -> bool {
        match self {
            Polarity::Minimum => a < b,
            Polarity::Maximum => a > b,
        }
    }
}

/// Walking direction along the ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Inward,
    Outward,
}

#[inline]
fn step(i: usize, side: Side, k: usize) -> Option<usize> {
    match side {
        Side::Inward => i.checked_sub(1),
        Side::Outward => (i + 1 < k).then_some(i + 1),
    }
}

/// Index of the centre sample.
#[inline]
pub fn center(g: &[f64]) -> usize {
    g.len().saturating_sub(1) / 2
}

/// First non-NaN sample when leaving `from` towards `side`, if any.
fn first_finite(g: &[f64], from: usize, side: Side) -> Option<usize> {
    let mut i = from;
    loop {
        if !g[i].is_nan() {
            return Some(i);
        }
        i = step(i, side, g.len())?;
    }
}

/// Follow the slope from the first valid sample while the next one is more
/// extreme.
fn descend(g: &[f64], from: usize, side: Side, polarity: Polarity) -> Option<usize> {
    let mut i = first_finite(g, from, side)?;
    while let Some(n) = step(i, side, g.len()) {
        if polarity.beyond(g[n], g[i]) {
            i = n;
        } else {
            break;
        }
    }
    Some(i)
}

/// `g[i]` is finite and no finite neighbour is more extreme.
fn is_local_extremum(g: &[f64], i: usize, polarity: Polarity) -> bool {
    if !g[i].is_finite() {
        return false;
    }
    let lower = i.checked_sub(1).map(|n| g[n]);
    let upper = g.get(i + 1).copied();
    [lower, upper]
        .into_iter()
        .flatten()
        .all(|v| !polarity.beyond(v, g[i]))
}

/// Pick between an inward and an outward candidate by distance to the
/// centre. Exact ties go to the outward side, so results mirror on a
/// reversed profile only when the two candidates are not equidistant.
#[inline]
fn nearer(r: usize, inward: Option<usize>, outward: Option<usize>) -> usize {
    match (inward, outward) {
        (Some(a), Some(b)) => {
            if r.abs_diff(a) < r.abs_diff(b) {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => r,
    }
}

/// Nearest local extremum of the given polarity on either side.
pub fn closest(g: &[f64], polarity: Polarity) -> usize {
    let r = center(g);
    if g.is_empty() {
        return r;
    }
    let side = |s| descend(g, r, s, polarity).filter(|&i| is_local_extremum(g, i, polarity));
    nearer(r, side(Side::Inward), side(Side::Outward))
}

pub fn closest_minimum(g: &[f64]) -> usize {
    closest(g, Polarity::Minimum)
}

pub fn closest_maximum(g: &[f64]) -> usize {
    closest(g, Polarity::Maximum)
}

/// Nearer of the closest minimum and closest maximum; a found edge wins
/// over none, ties go to the maximum.
pub fn closest_extremum(g: &[f64]) -> usize {
    let r = center(g);
    let found = |j: usize| (j != r).then_some(j);
    nearer(r, found(closest_minimum(g)), found(closest_maximum(g)))
}

/// Most extreme sample on one side, seeded by the first valid sample.
fn strongest_on_side(g: &[f64], r: usize, side: Side, polarity: Polarity) -> Option<usize> {
    let mut best = first_finite(g, r, side)?;
    let mut i = best;
    while let Some(n) = step(i, side, g.len()) {
        if polarity.beyond(g[n], g[best]) {
            best = n;
        }
        i = n;
    }
    Some(best)
}

/// Side whose most extreme sample is stronger; ties go outward.
pub fn strongest(g: &[f64], polarity: Polarity) -> usize {
    let r = center(g);
    if g.is_empty() {
        return r;
    }
    let inward = strongest_on_side(g, r, Side::Inward, polarity);
    let outward = strongest_on_side(g, r, Side::Outward, polarity);
    match (inward, outward) {
        (Some(a), Some(b)) => {
            if polarity.beyond(g[a], g[b]) {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => r,
    }
}

pub fn strongest_minimum(g: &[f64]) -> usize {
    strongest(g, Polarity::Minimum)
}

pub fn strongest_maximum(g: &[f64]) -> usize {
    strongest(g, Polarity::Maximum)
}

/// Strongest minimum or maximum, whichever has the larger |gradient|.
pub fn strongest_extremum(g: &[f64]) -> usize {
    let j1 = strongest_minimum(g);
    let j2 = strongest_maximum(g);
    if g.is_empty() {
        return j2;
    }
    if g[j1].abs() > g[j2].abs() {
        j1
    } else {
        j2
    }
}

/// Closest extremum whose polarity matches the sign of the centre sample.
pub fn extremum(g: &[f64]) -> usize {
    let r = center(g);
    match g.get(r) {
        Some(&v) if v < 0.0 => closest_minimum(g),
        Some(&v) if v > 0.0 => closest_maximum(g),
        _ => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: [f64; 7] = [0.1, -0.2, -0.8, -0.3, 0.4, 0.9, 0.2];

    #[test]
    fn closest_minimum_prefers_true_local_minimum() {
        assert_eq!(closest_minimum(&PROFILE), 2);
    }

    #[test]
    fn closest_maximum_walks_uphill_outward() {
        assert_eq!(closest_maximum(&PROFILE), 5);
    }

    #[test]
    fn closest_ties_go_outward() {
        let g = [0.0, -1.0, 0.0, -1.0, 0.0];
        assert_eq!(closest_minimum(&g), 3);
    }

    #[test]
    fn nan_samples_are_skipped_near_centre() {
        let nan = f64::NAN;
        let g = [0.0, -0.5, -1.0, nan, nan, 0.5, 1.0, 0.3, 0.0];
        assert_eq!(closest_maximum(&g), 6);
        let g = [nan, nan, nan, nan, nan, -0.2, -0.6, -0.1, 0.0];
        assert_eq!(closest_minimum(&g), 6);
    }

    #[test]
    fn strongest_selects_global_extremum_per_side() {
        let g = [-3.0, -1.0, -2.0, 0.0, -0.5, -2.5, -1.0];
        assert_eq!(strongest_minimum(&g), 0);
        let g = [1.0, 0.2, 0.0, 0.1, 2.0, 0.5, 4.0];
        assert_eq!(strongest_maximum(&g), 6);
    }

    #[test]
    fn strongest_extremum_compares_magnitudes() {
        let g = [-3.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        assert_eq!(strongest_extremum(&g), 0);
        let g = [-1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        assert_eq!(strongest_extremum(&g), 5);
    }

    #[test]
    fn extremum_with_zero_centre_finds_nothing() {
        let g = [1.0, -2.0, 0.5, 0.0, 3.0, -1.0, 0.0];
        assert_eq!(extremum(&g), 3);
    }

    #[test]
    fn extremum_follows_centre_sign() {
        assert_eq!(extremum(&PROFILE), closest_minimum(&PROFILE));
        let flipped: Vec<f64> = PROFILE.iter().map(|v| -v).collect();
        assert_eq!(extremum(&flipped), 2);
    }

    #[test]
    fn all_nan_profile_has_no_edge() {
        let g = [f64::NAN; 9];
        for f in [
            closest_minimum,
            closest_maximum,
            closest_extremum,
            strongest_minimum,
            strongest_maximum,
            strongest_extremum,
            extremum,
        ] {
            assert_eq!(f(&g), 4);
        }
    }

    #[test]
    fn closest_extremum_mirrors_on_reversed_profile() {
        let profiles: [&[f64]; 4] = [
            &PROFILE,
            &[0.3, 0.1, -0.4, 0.2, 0.6, 0.5, -0.1, -0.7, -0.2],
            &[0.0, 0.2, 0.9, 0.4, -0.1, -0.3, -0.2, 0.0, 0.1],
            &[f64::NAN, -1.0, 0.5, 0.2, 0.1, 0.0, -0.2, f64::NAN, f64::NAN],
        ];
        for g in profiles {
            let k = g.len();
            let reversed: Vec<f64> = g.iter().rev().copied().collect();
            let j = closest_extremum(g);
            let j_rev = closest_extremum(&reversed);
            assert_eq!(j_rev, k - 1 - j, "profile {g:?}");
        }

        // Equidistant minima: the outward one wins in both directions.
        let tie = [0.5, -1.0, 0.0, -1.0, 0.5];
        let reversed: Vec<f64> = tie.iter().rev().copied().collect();
        assert_eq!(closest_extremum(&tie), 3);
        assert_eq!(closest_extremum(&reversed), 3);
    }
}
