//! Mean absolute distance as an associative split/join reduction.
use rayon::prelude::*;

const MIN_CHUNK: usize = 1024;

/// Partial sum of |distance| over a block of vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsDistanceSum {
    pub sum: f64,
}

impl AbsDistanceSum {
    /// Fresh zero accumulator for another partition.
    pub fn split(&self) -> Self {
        Self::default()
    }

    pub fn join(mut self, other: Self) -> Self {
        self.sum += other.sum;
        self
    }

    pub fn accumulate(mut self, distances: &[f64]) -> Self {
        self.sum += distances.iter().map(|d| d.abs()).sum::<f64>();
        self
    }
}

/// Mean |distance| using blocks of `block` vertices; 0 for no vertices.
pub fn mean_abs_distance_blocked(distances: &[f64], block: usize) -> f64 {
    if distances.is_empty() {
        return 0.0;
    }
    let total = distances
        .par_chunks(block.max(1))
        .fold(AbsDistanceSum::default, |acc, chunk| acc.accumulate(chunk))
        .reduce(AbsDistanceSum::default, AbsDistanceSum::join);
    total.sum / distances.len() as f64
}

/// Mean |distance| over all vertices.
pub fn mean_abs_distance(distances: &[f64]) -> f64 {
    let block = (distances.len() / rayon::current_num_threads().max(1)).max(MIN_CHUNK);
    mean_abs_distance_blocked(distances, block)
}
