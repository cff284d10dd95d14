//! Per-vertex force vectors along the surface normal.
use nalgebra::Vector3;
use rayon::prelude::*;

/// Add `scale * (-magnitude[i] * normal[i])` to `gradient[i]`.
///
/// A positive magnitude (edge outside) yields a gradient against the normal,
/// so a descent step moves the vertex towards the edge.
pub fn accumulate_normal_forces(
    normals: &[Vector3<f64>],
    magnitudes: &[f64],
    gradient: &mut [Vector3<f64>],
    scale: f64,
) {
    gradient
        .par_iter_mut()
        .zip(normals.par_iter())
        .zip(magnitudes.par_iter())
        .for_each(|((g, n), &m)| {
            *g += n * (-m * scale);
        });
}
