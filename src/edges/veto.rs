//! Post-search checks that discard implausible edges.
use super::locator::EdgeThresholds;

/// The intensity at the chosen sample lies outside the configured range.
pub fn outside_intensity_range(f: &[f64], j: usize, thresholds: &EdgeThresholds) -> bool {
    if !thresholds.has_intensity_range() {
        return false;
    }
    let value = f[j];
    value < thresholds.min_intensity || value > thresholds.max_intensity
}

/// Reaching `j` from the centre crosses padding or a gradient sign change.
///
/// Samples from the centre (inclusive) up to `j` (exclusive) are inspected.
pub fn crosses_padding(f: &[f64], g: &[f64], j: usize, thresholds: &EdgeThresholds) -> bool {
    if !thresholds.has_padding() {
        return false;
    }
    let r = super::search::center(g);
    let blocked = |i: usize| f[i] < thresholds.padding || g[i] * g[j] < 0.0;
    if j < r {
        (j + 1..=r).rev().any(blocked)
    } else {
        (r..j).any(blocked)
    }
}

/// Apply both vetoes to a found edge; returns the centre if either rejects it.
pub fn apply_vetoes(j: usize, g: &[f64], f: Option<&[f64]>, thresholds: &EdgeThresholds) -> usize {
    let r = super::search::center(g);
    let Some(f) = f else {
        return j;
    };
    if j == r || f.len() != g.len() {
        return j;
    }
    if outside_intensity_range(f, j, thresholds) || crosses_padding(f, g, j, thresholds) {
        r
    } else {
        j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: [f64; 7] = [0.1, -0.2, -0.8, -0.3, 0.4, 0.9, 0.2];
    const F: [f64; 7] = [80.0, 70.0, 50.0, 30.0, 20.0, 40.0, 60.0];

    #[test]
    fn no_thresholds_keep_edge() {
        let t = EdgeThresholds::default();
        assert_eq!(apply_vetoes(2, &G, Some(&F), &t), 2);
        assert_eq!(apply_vetoes(5, &G, None, &t), 5);
    }

    #[test]
    fn intensity_range_rejects_edge() {
        let t = EdgeThresholds {
            min_intensity: 55.0,
            ..EdgeThresholds::default()
        };
        assert_eq!(apply_vetoes(2, &G, Some(&F), &t), 3);
        let t = EdgeThresholds {
            max_intensity: 60.0,
            ..EdgeThresholds::default()
        };
        assert_eq!(apply_vetoes(2, &G, Some(&F), &t), 2);
    }

    #[test]
    fn padding_between_centre_and_edge_rejects() {
        let t = EdgeThresholds {
            padding: 25.0,
            ..EdgeThresholds::default()
        };
        // Inward path (3, 2] stays above padding with a constant gradient sign.
        assert_eq!(apply_vetoes(2, &G, Some(&F), &t), 2);
        // Outward path starts at a negative gradient, the edge is positive.
        assert_eq!(apply_vetoes(5, &G, Some(&F), &t), 3);
        let t = EdgeThresholds {
            padding: 35.0,
            ..EdgeThresholds::default()
        };
        assert_eq!(apply_vetoes(2, &G, Some(&F), &t), 3);
    }
}
