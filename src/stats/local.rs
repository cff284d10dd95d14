//! Dense windowed intensity statistics.
//!
//! For every voxel the mean and variance of the masked intensities inside a
//! cubic window of radius `width / 2` (clipped to the lattice) are stored in
//! two volumes sharing the image geometry. Windows with too few masked
//! samples report the global statistics instead.
use super::moments::IntensityMoments;
use crate::image::{Volume, VolumeGeometry};
use rayon::prelude::*;

/// Minimum share (percent) of the full window that must be masked for a
/// local estimate to be used.
pub const LOCAL_STATS_MIN_SAMPLE_PERCENT: usize = 5;

/// Local mean/variance grids on the image lattice.
#[derive(Clone, Debug)]
pub struct LocalStatsField {
    pub mean: Volume,
    pub variance: Volume,
}

impl LocalStatsField {
    /// `(mean, variance)` at voxel `(i, j, k)` if inside the lattice.
    pub fn at(&self, i: isize, j: isize, k: isize) -> Option<(f64, f64)> {
        Some((self.mean.try_get(i, j, k)?, self.variance.try_get(i, j, k)?))
    }
}

/// Number of masked samples below which the window falls back to the global
/// statistics.
pub fn min_local_samples(geometry: &VolumeGeometry, width: usize) -> usize {
    let max_samples = geometry
        .dims
        .iter()
        .filter(|&&n| n > 1)
        .fold(1usize, |acc, _| acc * width);
    LOCAL_STATS_MIN_SAMPLE_PERCENT * max_samples / 100
}

/// Compute windowed statistics of `image` under `mask` (non-zero = tissue).
///
/// `global` supplies the fallback values; both volumes must share geometry.
pub fn local_statistics(
    image: &Volume,
    mask: &Volume,
    width: usize,
    global_mean: f64,
    global_variance: f64,
) -> LocalStatsField {
    let geometry = image.geometry.clone();
    let [nx, ny, nz] = geometry.dims;
    let radius = width / 2;
    let min_samples = min_local_samples(&geometry, width);

    let mut mean = Volume::new(geometry.clone());
    let mut variance = Volume::new(geometry.clone());
    let plane = nx * ny;
    if plane == 0 || nz == 0 {
        return LocalStatsField { mean, variance };
    }

    mean.data
        .par_chunks_mut(plane)
        .zip(variance.data.par_chunks_mut(plane))
        .enumerate()
        .for_each(|(ck, (mean_plane, var_plane))| {
            let k1 = ck.saturating_sub(radius);
            let k2 = (ck + radius).min(nz - 1);
            for cj in 0..ny {
                let j1 = cj.saturating_sub(radius);
                let j2 = (cj + radius).min(ny - 1);
                for ci in 0..nx {
                    let i1 = ci.saturating_sub(radius);
                    let i2 = (ci + radius).min(nx - 1);
                    let mut acc = IntensityMoments::default();
                    for k in k1..=k2 {
                        for j in j1..=j2 {
                            let row = geometry.index(0, j, k);
                            for i in i1..=i2 {
                                if mask.data[row + i] != 0.0 {
                                    acc.push(image.data[row + i]);
                                }
                            }
                        }
                    }
                    let out = cj * nx + ci;
                    if acc.count > 0 && acc.count >= min_samples {
                        mean_plane[out] = acc.mean();
                        var_plane[out] = acc.variance();
                    } else {
                        mean_plane[out] = global_mean;
                        var_plane[out] = global_variance;
                    }
                }
            }
        });

    LocalStatsField { mean, variance }
}
