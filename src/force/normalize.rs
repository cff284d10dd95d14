//! Rescaling of raw edge magnitudes into bounded force magnitudes.
use crate::stats::{abs_percentile, masked_mean, s_shaped_membership};
use rayon::prelude::*;

/// Percentile of |distance| used as the distance scale.
pub const DISTANCE_PERCENTILE: f64 = 95.0;

/// Lower bound of the distance scale (mm).
pub const MIN_DISTANCE_SCALE: f64 = 0.1;

/// Pass-global statistics over active vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassStatistics {
    pub dmax: f64,
    pub mavg: f64,
}

impl PassStatistics {
    pub fn compute(distances: &[f64], magnitudes: &[f64], active: &[bool]) -> Self {
        Self {
            dmax: abs_percentile(DISTANCE_PERCENTILE, distances, active),
            mavg: masked_mean(magnitudes, active),
        }
    }

    /// No usable scale; every magnitude becomes zero.
    pub fn is_degenerate(&self) -> bool {
        !(self.dmax > 0.0 && self.mavg > 0.0)
    }

    /// Bounded magnitude for one vertex with the sign of `distance`.
    #[inline]
    pub fn magnitude(&self, raw_magnitude: f64, distance: f64) -> f64 {
        let m1 = s_shaped_membership(raw_magnitude, 0.0, self.mavg);
        let scale = 1.0 / self.dmax.max(MIN_DISTANCE_SCALE);
        let d = scale * distance;
        let d2 = d * d;
        let m2 = d2 / (1.0 + d2);
        m1 * m2.copysign(distance)
    }
}

/// Replace raw magnitudes by normalized ones in place.
///
/// Returns the statistics used; inactive vertices and degenerate passes get
/// zero magnitude.
pub fn normalize_magnitudes(
    distances: &[f64],
    magnitudes: &mut [f64],
    active: &[bool],
) -> PassStatistics {
    let stats = PassStatistics::compute(distances, magnitudes, active);
    if stats.is_degenerate() {
        log::warn!(
            "degenerate edge statistics (dmax={:.4}, mavg={:.4}), zeroing magnitudes",
            stats.dmax,
            stats.mavg
        );
        magnitudes.par_iter_mut().for_each(|m| *m = 0.0);
        return stats;
    }
    magnitudes
        .par_iter_mut()
        .zip(distances.par_iter())
        .zip(active.par_iter())
        .for_each(|((m, &d), &is_active)| {
            *m = if is_active { stats.magnitude(*m, d) } else { 0.0 };
        });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturated_magnitude_takes_distance_sign() {
        let stats = PassStatistics {
            dmax: 2.0,
            mavg: 1.0,
        };
        let m = stats.magnitude(1.0, -1.0);
        assert!((m + 0.2).abs() < 1e-12, "got {m}");
        assert!((stats.magnitude(1.0, 1.0) - 0.2).abs() < 1e-12);
        assert_eq!(stats.magnitude(1.0, 0.0), 0.0);
    }

    #[test]
    fn small_distance_scale_is_clamped() {
        let stats = PassStatistics {
            dmax: 0.01,
            mavg: 1.0,
        };
        // d / 0.1 = 1 => m2 = 0.5
        assert!((stats.magnitude(2.0, 0.1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn inactive_and_degenerate_are_zero() {
        let distances = [1.0, -2.0, 0.5];
        let mut magnitudes = [1.0, 1.0, 1.0];
        let active = [true, true, false];
        let stats = normalize_magnitudes(&distances, &mut magnitudes, &active);
        assert!(!stats.is_degenerate());
        assert_eq!(magnitudes[2], 0.0);
        assert!(magnitudes[0] > 0.0 && magnitudes[1] < 0.0);

        let mut magnitudes = [1.0, 1.0, 1.0];
        let stats = normalize_magnitudes(&[0.0; 3], &mut magnitudes, &active);
        assert!(stats.is_degenerate());
        assert_eq!(magnitudes, [0.0; 3]);
    }
}
