//! White/grey matter intensity models used by the neonatal white-surface
//! edge heuristic.
//!
//! Statistics are estimated once during initialization and are read-only
//! afterwards; every vertex worker of a pass shares the same snapshot.
use super::local::{local_statistics, LocalStatsField};
use super::moments::masked_moments;
use crate::error::ForceError;
use crate::image::Volume;
use log::debug;

/// Global and optional local intensity statistics of one tissue class.
#[derive(Clone, Debug)]
pub struct TissueClassStats {
    pub global_mean: f64,
    pub global_variance: f64,
    pub local: Option<LocalStatsField>,
}

impl Default for TissueClassStats {
    /// Unknown statistics (NaN); scoring falls back to gradient strength.
    fn default() -> Self {
        Self {
            global_mean: f64::NAN,
            global_variance: f64::NAN,
            local: None,
        }
    }
}

impl TissueClassStats {
    /// `(mean, variance)` at a voxel: local if available, else global.
    pub fn at(&self, voxel: [isize; 3]) -> (f64, f64) {
        self.local
            .as_ref()
            .and_then(|l| l.at(voxel[0], voxel[1], voxel[2]))
            .unwrap_or((self.global_mean, self.global_variance))
    }

    pub fn is_known(&self) -> bool {
        !self.global_mean.is_nan() && !self.global_variance.is_nan()
    }

    pub fn sigma(&self) -> f64 {
        self.global_variance.max(0.0).sqrt()
    }
}

/// Frozen white and grey matter statistics.
#[derive(Clone, Debug, Default)]
pub struct TissueStatistics {
    pub white_matter: TissueClassStats,
    pub grey_matter: TissueClassStats,
}

/// Estimate statistics of `image` under `mask`.
///
/// `window_width > 0` additionally computes dense local statistics. A mask
/// whose lattice differs from the image is a fatal configuration error.
pub fn estimate_tissue_stats(
    image: &Volume,
    mask: &Volume,
    window_width: usize,
    label: &'static str,
) -> Result<TissueClassStats, ForceError> {
    if !mask.geometry.same_geometry(&image.geometry) {
        return Err(ForceError::GeometryMismatch { mask: label });
    }
    let moments = masked_moments(image, mask);
    let global_mean = moments.mean();
    let global_variance = moments.variance();
    debug!(
        "{label} statistics: n={} mean={global_mean:.3} var={global_variance:.3}",
        moments.count
    );
    let local = (window_width > 0)
        .then(|| local_statistics(image, mask, window_width, global_mean, global_variance));
    Ok(TissueClassStats {
        global_mean,
        global_variance,
        local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::VolumeGeometry;

    #[test]
    fn mismatched_mask_is_rejected() {
        let image = Volume::new(VolumeGeometry::new([4, 4, 4], [1.0; 3], [0.0; 3]));
        let mask = Volume::new(VolumeGeometry::new([4, 4, 5], [1.0; 3], [0.0; 3]));
        let err = estimate_tissue_stats(&image, &mask, 0, "white matter").unwrap_err();
        assert_eq!(err, ForceError::GeometryMismatch { mask: "white matter" });
    }

    #[test]
    fn global_statistics_under_mask() {
        let geom = VolumeGeometry::new([4, 4, 4], [1.0; 3], [0.0; 3]);
        let image = Volume::from_fn(geom.clone(), |i, _, _| if i < 2 { 100.0 } else { 50.0 });
        let mask = Volume::from_fn(geom, |i, _, _| if i < 2 { 1.0 } else { 0.0 });
        let stats = estimate_tissue_stats(&image, &mask, 0, "white matter").unwrap();
        assert!((stats.global_mean - 100.0).abs() < 1e-12);
        assert!(stats.global_variance.abs() < 1e-9);
        assert!(stats.local.is_none());
        assert_eq!(stats.at([1, 1, 1]), (stats.global_mean, stats.global_variance));
    }

    #[test]
    fn default_statistics_are_unknown() {
        let stats = TissueClassStats::default();
        assert!(!stats.is_known());
        let (m, v) = stats.at([0, 0, 0]);
        assert!(m.is_nan() && v.is_nan());
    }
}
