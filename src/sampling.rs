//! Ray profile sampling along vertex normals.
//!
//! A ray of radius `r` holds `k = 2r + 1` samples at a fixed step length,
//! index `r` being the vertex itself. Samples whose nearest voxel is outside
//! the image or the foreground are NaN.
use crate::image::VolumeSampler;
use nalgebra::{Point3, Vector3};

/// Upper bound of the ray radius in samples.
pub const MAX_RAY_RADIUS: usize = 1 << 16;

/// Number of samples on each side of the vertex, at most [`MAX_RAY_RADIUS`].
#[inline]
pub fn ray_radius(max_distance: f64, step: f64) -> usize {
    if step > 0.0 && max_distance.is_finite() && max_distance > 0.0 {
        ((max_distance / step).floor() as usize).min(MAX_RAY_RADIUS)
    } else {
        0
    }
}

#[inline]
fn ray_len(radius: usize) -> usize {
    radius.saturating_mul(2).saturating_add(1)
}

/// Reusable per-worker sample buffers.
#[derive(Clone, Debug, Default)]
pub struct RayProfile {
    gradient: Vec<f64>,
    intensity: Vec<f64>,
    has_intensity: bool,
}

impl RayProfile {
    pub fn with_radius(radius: usize) -> Self {
        let k = ray_len(radius);
        Self {
            gradient: vec![f64::NAN; k],
            intensity: vec![f64::NAN; k],
            has_intensity: false,
        }
    }

    pub fn len(&self) -> usize {
        self.gradient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradient.is_empty()
    }

    pub fn center(&self) -> usize {
        self.len().saturating_sub(1) / 2
    }

    /// Directional derivative along the normal at each sample.
    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    /// Intensity samples, if requested from the sampler.
    pub fn intensity(&self) -> Option<&[f64]> {
        self.has_intensity.then_some(self.intensity.as_slice())
    }
}

/// Samples gradient (and optionally intensity) profiles from a volume.
#[derive(Clone, Copy, Debug)]
pub struct RayProfileSampler<'a, S: VolumeSampler> {
    sampler: &'a S,
    step: f64,
    radius: usize,
    sample_intensity: bool,
}

impl<'a, S: VolumeSampler> RayProfileSampler<'a, S> {
    pub fn new(sampler: &'a S, step: f64, max_distance: f64) -> Self {
        Self {
            sampler,
            step,
            radius: ray_radius(max_distance, step),
            sample_intensity: false,
        }
    }

    pub fn with_intensity(mut self, enabled: bool) -> Self {
        self.sample_intensity = enabled;
        self
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Buffer sized for this sampler.
    pub fn profile(&self) -> RayProfile {
        RayProfile::with_radius(self.radius)
    }

    /// Sample the ray through world point `point` along world direction
    /// `normal` (unit length) into `out`.
    pub fn sample(&self, point: &Point3<f64>, normal: &Vector3<f64>, out: &mut RayProfile) {
        let k = ray_len(self.radius);
        out.gradient.resize(k, f64::NAN);
        out.intensity.resize(k, f64::NAN);
        out.has_intensity = self.sample_intensity;

        let p = self.sampler.world_to_image(point);
        let dp = self.sampler.world_to_image_vector(&(normal * self.step));
        let n = match dp.try_normalize(f64::EPSILON) {
            Some(n) => n,
            None => {
                out.gradient.fill(f64::NAN);
                out.intensity.fill(f64::NAN);
                return;
            }
        };

        for i in 0..k {
            let offset = i as f64 - self.radius as f64;
            let q = p + dp * offset;
            if self.sampler.is_foreground_at(&q) {
                out.gradient[i] = n.dot(&self.sampler.jacobian(&q));
                if self.sample_intensity {
                    out.intensity[i] = self.sampler.evaluate(&q);
                }
            } else {
                out.gradient[i] = f64::NAN;
                out.intensity[i] = f64::NAN;
            }
        }
    }
}
