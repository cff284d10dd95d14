use nalgebra::{Point3, Vector3};
use surface_edge_force::image::{Volume, VolumeGeometry};
use surface_edge_force::mesh::{icosphere, vertex_normals, EdgeTable};

/// Isotropic 1 mm lattice of `size`^3 voxels at the origin.
pub fn cube_geometry(size: usize) -> VolumeGeometry {
    VolumeGeometry::new([size; 3], [1.0; 3], [0.0; 3])
}

/// World position of the lattice centre.
pub fn centre(geometry: &VolumeGeometry) -> Point3<f64> {
    let c = |n: usize| (n as f64 - 1.0) / 2.0;
    let [nx, ny, nz] = geometry.dims;
    geometry.image_to_world(&Point3::new(c(nx), c(ny), c(nz)))
}

/// Volume whose value depends only on the distance to the lattice centre.
pub fn radial_volume(size: usize, profile: impl Fn(f64) -> f64) -> Volume {
    let geometry = cube_geometry(size);
    let c = centre(&geometry);
    let g = geometry.clone();
    Volume::from_fn(geometry, |i, j, k| {
        let p = g.image_to_world(&Point3::new(i as f64, j as f64, k as f64));
        profile((p - c).norm())
    })
}

/// Smooth step from `inside` to `outside` at `radius`.
pub fn ball_profile(radius: f64, inside: f64, outside: f64, blur: f64) -> impl Fn(f64) -> f64 {
    move |r| {
        let t = 0.5 * (1.0 + ((r - radius) / blur).tanh());
        inside + (outside - inside) * t
    }
}

/// Bright ball (100) on a dark background (20) with its boundary at `radius`.
pub fn bright_ball(size: usize, radius: f64) -> Volume {
    radial_volume(size, ball_profile(radius, 100.0, 20.0, 1.5))
}

/// T2-weighted neonatal-like phantom: bright white matter core (100) inside
/// `white_radius`, a dark cortical shell (50) up to `pial_radius`, bright
/// CSF (120) outside.
pub fn layered_brain(size: usize, white_radius: f64, pial_radius: f64) -> Volume {
    let wm_gm = ball_profile(white_radius, 100.0, 50.0, 1.0);
    radial_volume(size, move |r| {
        wm_gm(r) + 35.0 * (1.0 + ((r - pial_radius) / 1.0).tanh())
    })
}

/// Binary mask of `lo <= r < hi` on the same lattice as `radial_volume`.
pub fn shell_mask(size: usize, lo: f64, hi: f64) -> Volume {
    radial_volume(size, |r| if r >= lo && r < hi { 1.0 } else { 0.0 })
}

/// Icosphere surface of the given radius around the lattice centre.
pub struct SphereSurface {
    pub points: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub triangles: Vec<[usize; 3]>,
    pub edges: EdgeTable,
}

impl SphereSurface {
    pub fn new(geometry: &VolumeGeometry, radius: f64, subdivisions: usize) -> Self {
        let c = centre(geometry);
        let (unit, triangles) = icosphere(subdivisions);
        let points: Vec<Point3<f64>> = unit.iter().map(|p| c + p.coords * radius).collect();
        let normals = vertex_normals(&points, &triangles);
        let edges = EdgeTable::from_triangles(points.len(), &triangles);
        Self {
            points,
            normals,
            triangles,
            edges,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
