//! Voxel lattice geometry and the world <-> image coordinate mapping.
//!
//! Image coordinates are continuous voxel indices: voxel `(i, j, k)` has its
//! centre at image point `(i, j, k)`. World coordinates are millimetres:
//!
//! `world = origin + axes * diag(spacing) * image`
//!
//! where the columns of `axes` are the unit direction cosines of the three
//! lattice axes.
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

const GEOMETRY_TOL: f64 = 1e-6;

/// Spatial attributes of a regular 3D voxel lattice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeGeometry {
    /// Number of voxels along x, y and z.
    pub dims: [usize; 3],
    /// Voxel size (mm) along each lattice axis.
    pub spacing: Vector3<f64>,
    /// World position of the centre of voxel (0, 0, 0).
    pub origin: Point3<f64>,
    /// Direction cosines; column `c` is the world direction of lattice axis `c`.
    pub axes: Matrix3<f64>,
}

impl VolumeGeometry {
    /// Axis-aligned lattice with the given size, voxel spacing and origin.
    pub fn new(dims: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> Self {
        Self {
            dims,
            spacing: Vector3::from(spacing),
            origin: Point3::from(origin),
            axes: Matrix3::identity(),
        }
    }

    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Linear index of voxel `(i, j, k)`, x fastest.
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.dims[1] + j) * self.dims[0] + i
    }

    /// Inverse of [`VolumeGeometry::index`].
    #[inline]
    pub fn lattice(&self, idx: usize) -> [usize; 3] {
        let nx = self.dims[0];
        let ny = self.dims[1];
        [idx % nx, (idx / nx) % ny, idx / (nx * ny)]
    }

    #[inline]
    pub fn is_inside(&self, i: isize, j: isize, k: isize) -> bool {
        i >= 0
            && j >= 0
            && k >= 0
            && (i as usize) < self.dims[0]
            && (j as usize) < self.dims[1]
            && (k as usize) < self.dims[2]
    }

    /// Length of the voxel diagonal in mm.
    pub fn voxel_diagonal(&self) -> f64 {
        self.spacing.norm()
    }

    /// Length in mm of the diagonal through the whole lattice.
    pub fn extent_diagonal(&self) -> f64 {
        Vector3::new(
            self.dims[0] as f64 * self.spacing.x,
            self.dims[1] as f64 * self.spacing.y,
            self.dims[2] as f64 * self.spacing.z,
        )
        .norm()
    }

    fn image_to_world_matrix(&self) -> Matrix3<f64> {
        self.axes * Matrix3::from_diagonal(&self.spacing)
    }

    fn world_to_image_matrix(&self) -> Matrix3<f64> {
        self.image_to_world_matrix()
            .try_inverse()
            .unwrap_or_else(Matrix3::zeros)
    }

    pub fn world_to_image(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.world_to_image_matrix() * (p - self.origin))
    }

    pub fn world_to_image_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.world_to_image_matrix() * v
    }

    pub fn image_to_world(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.image_to_world_matrix() * p.coords
    }

    /// Whether two lattices share size, spacing, origin and orientation.
    pub fn same_geometry(&self, other: &VolumeGeometry) -> bool {
        self.dims == other.dims
            && (self.spacing - other.spacing).amax() <= GEOMETRY_TOL
            && (self.origin - other.origin).amax() <= GEOMETRY_TOL
            && (self.axes - other.axes).amax() <= GEOMETRY_TOL
    }

    /// Number of lattice axes with more than one voxel.
    pub fn dimensionality(&self) -> usize {
        self.dims.iter().filter(|&&n| n > 1).count()
    }
}
