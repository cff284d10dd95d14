//! Trilinear interpolation of a [`Volume`] and of its voxel gradients.
//!
//! - Border handling clamps to the lattice (replicate), so evaluation is
//!   defined everywhere; callers gate samples with `is_foreground_at`.
//! - Derivatives are central differences at the voxels (one-sided at the
//!   border), trilinearly interpolated, so they vary continuously along a
//!   ray instead of being constant per cell.
//! - Axes with a single voxel have zero derivative.
use super::geometry::VolumeGeometry;
use super::traits::VolumeSampler;
use super::volume::Volume;
use nalgebra::{Point3, Vector3};

#[derive(Clone, Copy, Debug)]
pub struct LinearInterpolator<'a> {
    volume: &'a Volume,
}

/// Cell corner index and fractional offset along one axis.
#[derive(Clone, Copy, Debug)]
struct AxisCell {
    i0: usize,
    i1: usize,
    t: f64,
}

#[inline]
fn axis_cell(x: f64, n: usize) -> AxisCell {
    if n <= 1 || !x.is_finite() {
        return AxisCell { i0: 0, i1: 0, t: 0.0 };
    }
    let max = (n - 1) as f64;
    let xc = x.clamp(0.0, max);
    let i0 = (xc.floor() as usize).min(n - 2);
    AxisCell {
        i0,
        i1: i0 + 1,
        t: xc - i0 as f64,
    }
}

impl<'a> LinearInterpolator<'a> {
    pub fn new(volume: &'a Volume) -> Self {
        Self { volume }
    }

    pub fn volume(&self) -> &'a Volume {
        self.volume
    }

    #[inline]
    fn corners(&self, p: &Point3<f64>) -> ([AxisCell; 3], [f64; 8]) {
        let [nx, ny, nz] = self.volume.dims();
        let cx = axis_cell(p.x, nx);
        let cy = axis_cell(p.y, ny);
        let cz = axis_cell(p.z, nz);
        let v = |i, j, k| self.volume.get(i, j, k);
        let c = [
            v(cx.i0, cy.i0, cz.i0),
            v(cx.i1, cy.i0, cz.i0),
            v(cx.i0, cy.i1, cz.i0),
            v(cx.i1, cy.i1, cz.i0),
            v(cx.i0, cy.i0, cz.i1),
            v(cx.i1, cy.i0, cz.i1),
            v(cx.i0, cy.i1, cz.i1),
            v(cx.i1, cy.i1, cz.i1),
        ];
        ([cx, cy, cz], c)
    }

    /// Central difference along `axis` at a voxel, one-sided at the border.
    #[inline]
    fn central_difference(&self, idx: [usize; 3], axis: usize) -> f64 {
        let n = self.volume.dims()[axis];
        if n <= 1 {
            return 0.0;
        }
        let c = idx[axis];
        let (lo, hi) = (c.saturating_sub(1), (c + 1).min(n - 1));
        let (mut a, mut b) = (idx, idx);
        a[axis] = lo;
        b[axis] = hi;
        let v = |q: [usize; 3]| self.volume.get(q[0], q[1], q[2]);
        (v(b) - v(a)) / (hi - lo) as f64
    }

    fn voxel_gradient(&self, idx: [usize; 3]) -> Vector3<f64> {
        Vector3::new(
            self.central_difference(idx, 0),
            self.central_difference(idx, 1),
            self.central_difference(idx, 2),
        )
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl VolumeSampler for LinearInterpolator<'_> {
    fn geometry(&self) -> &VolumeGeometry {
        &self.volume.geometry
    }

    fn evaluate(&self, p: &Point3<f64>) -> f64 {
        if self.volume.is_empty() {
            return f64::NAN;
        }
        let ([cx, cy, cz], c) = self.corners(p);
        let c00 = lerp(c[0], c[1], cx.t);
        let c10 = lerp(c[2], c[3], cx.t);
        let c01 = lerp(c[4], c[5], cx.t);
        let c11 = lerp(c[6], c[7], cx.t);
        let c0 = lerp(c00, c10, cy.t);
        let c1 = lerp(c01, c11, cy.t);
        lerp(c0, c1, cz.t)
    }

    fn jacobian(&self, p: &Point3<f64>) -> Vector3<f64> {
        if self.volume.is_empty() {
            return Vector3::repeat(f64::NAN);
        }
        let [nx, ny, nz] = self.volume.dims();
        let cx = axis_cell(p.x, nx);
        let cy = axis_cell(p.y, ny);
        let cz = axis_cell(p.z, nz);
        let weights = |c: AxisCell| [(c.i0, 1.0 - c.t), (c.i1, c.t)];
        let mut g = Vector3::zeros();
        for (k, wz) in weights(cz) {
            for (j, wy) in weights(cy) {
                for (i, wx) in weights(cx) {
                    let w = wx * wy * wz;
                    if w != 0.0 {
                        g += self.voxel_gradient([i, j, k]) * w;
                    }
                }
            }
        }
        g
    }

    fn is_foreground(&self, i: isize, j: isize, k: isize) -> bool {
        self.volume.is_inside(i, j, k)
            && self
                .volume
                .is_foreground(i as usize, j as usize, k as usize)
    }
}
