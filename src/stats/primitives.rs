//! Scalar statistics over per-vertex arrays restricted to active vertices.
use rayon::prelude::*;

/// Mean of `values[i]` over `mask[i] == true`; 0 when nothing is selected.
///
/// Non-finite values are skipped.
pub fn masked_mean(values: &[f64], mask: &[bool]) -> f64 {
    let (sum, count) = values
        .par_iter()
        .zip(mask.par_iter())
        .filter(|&(v, &m)| m && v.is_finite())
        .map(|(v, _)| (*v, 1usize))
        .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// `p`-th percentile (0..=100) of `|values[i]|` over `mask[i] == true`.
///
/// Linearly interpolates between neighbouring order statistics; returns 0
/// when nothing is selected.
pub fn abs_percentile(p: f64, values: &[f64], mask: &[bool]) -> f64 {
    let mut abs: Vec<f64> = values
        .iter()
        .zip(mask)
        .filter(|&(v, &m)| m && v.is_finite())
        .map(|(v, _)| v.abs())
        .collect();
    if abs.is_empty() {
        return 0.0;
    }
    abs.par_sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (abs.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let t = rank - lo as f64;
    abs[lo] + (abs[hi] - abs[lo]) * t
}

/// Zadeh S-shaped membership: 0 below `a`, 1 above `b`, quadratic blend.
pub fn s_shaped_membership(x: f64, a: f64, b: f64) -> f64 {
    if x <= a {
        0.0
    } else if x >= b {
        1.0
    } else {
        let w = b - a;
        if x <= 0.5 * (a + b) {
            let t = (x - a) / w;
            2.0 * t * t
        } else {
            let t = (x - b) / w;
            1.0 - 2.0 * t * t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_ignores_inactive_entries() {
        let v = [1.0, 100.0, 3.0];
        let m = [true, false, true];
        assert!((masked_mean(&v, &m) - 2.0).abs() < 1e-12);
        assert_eq!(masked_mean(&v, &[false; 3]), 0.0);
    }

    #[test]
    fn percentile_of_absolute_values() {
        let v: Vec<f64> = (0..=100).map(|i| if i % 2 == 0 { i as f64 } else { -(i as f64) }).collect();
        let m = vec![true; v.len()];
        assert!((abs_percentile(95.0, &v, &m) - 95.0).abs() < 1e-12);
        assert!((abs_percentile(50.0, &[-1.0, 3.0], &[true, true]) - 2.0).abs() < 1e-12);
        assert_eq!(abs_percentile(95.0, &v, &vec![false; v.len()]), 0.0);
    }

    #[test]
    fn s_shape_is_monotone_and_saturates() {
        assert_eq!(s_shaped_membership(-1.0, 0.0, 2.0), 0.0);
        assert_eq!(s_shaped_membership(2.0, 0.0, 2.0), 1.0);
        assert!((s_shaped_membership(1.0, 0.0, 2.0) - 0.5).abs() < 1e-12);
        assert!((s_shaped_membership(0.5, 0.0, 2.0) - 0.125).abs() < 1e-12);
        assert!((s_shaped_membership(1.5, 0.0, 2.0) - 0.875).abs() < 1e-12);
    }
}
