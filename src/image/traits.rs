use super::geometry::VolumeGeometry;
use nalgebra::{Point3, Vector3};

/// Continuous, read-only view of a scalar volume.
///
/// Points passed to `evaluate`/`jacobian` are in image coordinates (see
/// [`VolumeGeometry`]). Implementations are queried concurrently from every
/// vertex worker of an evaluation pass and must not mutate shared state.
pub trait VolumeSampler: Sync {
    fn geometry(&self) -> &VolumeGeometry;

    /// Interpolated intensity.
    fn evaluate(&self, p: &Point3<f64>) -> f64;

    /// Intensity derivatives with respect to the three image axes.
    fn jacobian(&self, p: &Point3<f64>) -> Vector3<f64>;

    fn is_inside(&self, i: isize, j: isize, k: isize) -> bool {
        self.geometry().is_inside(i, j, k)
    }

    fn is_foreground(&self, i: isize, j: isize, k: isize) -> bool;

    fn world_to_image(&self, p: &Point3<f64>) -> Point3<f64> {
        self.geometry().world_to_image(p)
    }

    fn world_to_image_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.geometry().world_to_image_vector(v)
    }

    /// Inside-and-foreground test at the voxel nearest to `p`.
    fn is_foreground_at(&self, p: &Point3<f64>) -> bool {
        let [i, j, k] = nearest_voxel(p);
        self.is_inside(i, j, k) && self.is_foreground(i, j, k)
    }
}

/// Voxel nearest to an image-space point.
#[inline]
pub fn nearest_voxel(p: &Point3<f64>) -> [isize; 3] {
    [
        p.x.round() as isize,
        p.y.round() as isize,
        p.z.round() as isize,
    ]
}
