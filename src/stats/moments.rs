//! First and second intensity moments under a binary mask.
//!
//! The accumulator is a split/join reduction: `split` yields an empty
//! partial, `join` adds counts and sums. Any partition of the voxel range
//! therefore produces the same totals up to floating-point summation order.
use crate::image::Volume;
use rayon::prelude::*;

/// Voxels per rayon task when reducing over the lattice.
const MIN_CHUNK: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntensityMoments {
    pub count: usize,
    pub sum: f64,
    pub sum_sq: f64,
}

impl IntensityMoments {
    /// Empty partial accumulator for a new sub-range.
    #[inline]
    pub fn split(&self) -> Self {
        Self::default()
    }

    #[inline]
    pub fn join(mut self, other: Self) -> Self {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self
    }

    #[inline]
    pub fn push(&mut self, v: f64) {
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;
    }

    /// Mean, or 0 without samples.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Population variance `E[v^2] - E[v]^2`, or 0 without samples.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        self.sum_sq / self.count as f64 - mean * mean
    }

    /// Accumulate the masked voxels of `image[range]`.
    pub fn accumulate(mut self, image: &[f64], mask: &[f64], range: std::ops::Range<usize>) -> Self {
        for idx in range {
            if mask[idx] != 0.0 {
                self.push(image[idx]);
            }
        }
        self
    }
}

/// Moments of `image` over the voxels where `mask != 0`.
///
/// Both volumes must share the same lattice; the caller checks geometry.
pub fn masked_moments(image: &Volume, mask: &Volume) -> IntensityMoments {
    let n = image.data.len().min(mask.data.len());
    let root = IntensityMoments::default();
    image.data[..n]
        .par_chunks(MIN_CHUNK)
        .zip(mask.data[..n].par_chunks(MIN_CHUNK))
        .fold(
            || root.split(),
            |acc, (img, msk)| acc.accumulate(img, msk, 0..img.len()),
        )
        .reduce(|| root.split(), IntensityMoments::join)
}
