//! Owned single-channel f64 volume in x-fastest layout.
//!
//! Used for intensity images, tissue masks (non-zero = inside) and the dense
//! local statistics grids. The optional `background` value marks voxels that
//! are not part of the image foreground.
use super::geometry::VolumeGeometry;

#[derive(Clone, Debug)]
pub struct Volume {
    /// Lattice attributes
    pub geometry: VolumeGeometry,
    /// Voxel values, `geometry.index(i, j, k)` addressing
    pub data: Vec<f64>,
    /// Voxels with exactly this value are background
    pub background: Option<f64>,
}

impl Volume {
    /// Zero-initialized volume on the given lattice.
    pub fn new(geometry: VolumeGeometry) -> Self {
        Self::filled(geometry, 0.0)
    }

    pub fn filled(geometry: VolumeGeometry, value: f64) -> Self {
        let n = geometry.num_voxels();
        Self {
            geometry,
            data: vec![value; n],
            background: None,
        }
    }

    /// Build a volume by evaluating `f(i, j, k)` at every voxel.
    pub fn from_fn(geometry: VolumeGeometry, mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut vol = Self::new(geometry);
        let [nx, ny, nz] = vol.geometry.dims;
        let mut idx = 0;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    vol.data[idx] = f(i, j, k);
                    idx += 1;
                }
            }
        }
        vol
    }

    pub fn with_background(mut self, value: f64) -> Self {
        self.background = Some(value);
        self
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.geometry.dims
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.geometry.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, v: f64) {
        let idx = self.geometry.index(i, j, k);
        self.data[idx] = v;
    }

    #[inline]
    pub fn is_inside(&self, i: isize, j: isize, k: isize) -> bool {
        self.geometry.is_inside(i, j, k)
    }

    /// Foreground test for an in-bounds voxel.
    #[inline]
    pub fn is_foreground(&self, i: usize, j: usize, k: usize) -> bool {
        let v = self.get(i, j, k);
        match self.background {
            Some(bg) => v.is_finite() && v != bg,
            None => !v.is_nan(),
        }
    }

    /// Value at a voxel index given as signed lattice coordinates, if inside.
    #[inline]
    pub fn try_get(&self, i: isize, j: isize, k: isize) -> Option<f64> {
        self.is_inside(i, j, k)
            .then(|| self.get(i as usize, j as usize, k as usize))
    }

    /// Largest absolute finite voxel value (0 for empty volumes).
    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0f64, |acc, v| acc.max(v.abs()))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Slice of the z-plane `k`.
    pub fn plane(&self, k: usize) -> &[f64] {
        let [nx, ny, _] = self.geometry.dims;
        let start = k * nx * ny;
        &self.data[start..start + nx * ny]
    }
}
