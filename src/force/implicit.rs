//! Distance of the surface to an implicit surface given as a distance image.
//!
//! The implicit surface is the `offset` level set of the distance image. The
//! minimum distance of a vertex is the image value at the vertex minus the
//! offset; the normal distance is measured along the vertex normal towards
//! the level set. Both are positive outside, so the energy gradient points
//! along the normal there and descent moves the vertex inward.

use super::energy::mean_abs_distance;
use super::options::{normalize_key, parse_value};
use super::{set_weight, ForceTerm};
use crate::error::{ConfigError, ForceError};
use crate::image::{LinearInterpolator, VolumeSampler};
use crate::types::ForceInput;
use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest marching step (mm) of the normal distance search.
const MIN_MARCH_STEP: f64 = 1e-3;

/// How the distance of a vertex to the implicit surface is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DistanceMeasure {
    #[default]
    Minimum,
    Normal,
}

impl DistanceMeasure {
    pub fn name(self) -> &'static str {
        match self {
            DistanceMeasure::Minimum => "Minimum",
            DistanceMeasure::Normal => "Normal",
        }
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMeasure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimum" | "min" | "minimum distance" => Ok(DistanceMeasure::Minimum),
            "normal" | "normal distance" => Ok(DistanceMeasure::Normal),
            _ => Err(ConfigError::UnknownDistanceMeasure(s.to_string())),
        }
    }
}

impl TryFrom<String> for DistanceMeasure {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DistanceMeasure> for String {
    fn from(value: DistanceMeasure) -> Self {
        value.name().to_string()
    }
}

/// Signed distance to the implicit surface at `point`, plain lookup.
fn minimum_distance(sampler: &impl VolumeSampler, point: &Point3<f64>, offset: f64) -> f64 {
    sampler.evaluate(&sampler.world_to_image(point)) - offset
}

/// Distance along the normal to the level set, signed like the minimum
/// distance; `max_distance` if the level set is not reached within
/// `march_limit`.
///
/// Marches towards the surface with steps of the current absolute distance
/// (never below [`MIN_MARCH_STEP`]) until the sign changes.
fn normal_distance(
    sampler: &impl VolumeSampler,
    point: &Point3<f64>,
    normal: &Vector3<f64>,
    offset: f64,
    max_distance: f64,
    march_limit: f64,
) -> f64 {
    let mind = minimum_distance(sampler, point, offset);
    if mind == 0.0 || !mind.is_finite() {
        return mind;
    }
    // Positive values lie outside: the surface is behind the vertex.
    let dir = if mind > 0.0 { -normal } else { *normal };
    let mut travelled = 0.0;
    let mut value = mind;
    while travelled < march_limit {
        let step = value.abs().max(MIN_MARCH_STEP).min(march_limit - travelled);
        let next = travelled + step;
        let v = minimum_distance(sampler, &(*point + dir * next), offset);
        if v == 0.0 || v.signum() != mind.signum() {
            return next.copysign(mind);
        }
        travelled = next;
        value = v;
    }
    max_distance.copysign(mind)
}

/// Attraction to an implicit surface.
#[derive(Clone, Debug)]
pub struct ImplicitSurfaceForce {
    name: String,
    weight: f64,
    measure: DistanceMeasure,
    offset: f64,
    max_distance: f64,
    resolved_max_distance: Option<f64>,
    march_limit: f64,
    distances: Vec<f64>,
    normals: Vec<Vector3<f64>>,
    revision: Option<u64>,
}

impl ImplicitSurfaceForce {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            measure: DistanceMeasure::Minimum,
            offset: 0.0,
            max_distance: 0.0,
            resolved_max_distance: None,
            march_limit: 0.0,
            distances: Vec::new(),
            normals: Vec::new(),
            revision: None,
        }
    }

    pub fn measure(&self) -> DistanceMeasure {
        self.measure
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Marching limit; the maximum absolute image value once initialized if
    /// configured `<= 0`.
    pub fn max_distance(&self) -> f64 {
        self.resolved_max_distance.unwrap_or(self.max_distance)
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }
}

impl ForceTerm for ImplicitSurfaceForce {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if set_weight(&mut self.weight, key, value)? {
            return Ok(());
        }
        let name = normalize_key(key);
        let name = name.strip_prefix("implicit surface distance ").unwrap_or(&name);
        match name {
            "measure" => self.measure = value.parse()?,
            "offset" => self.offset = parse_value(key, value)?,
            "maximum" | "maximum distance" => {
                let max_distance: f64 = parse_value(key, value)?;
                if !max_distance.is_finite() {
                    return Err(ConfigError::InvalidValue {
                        param: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.max_distance = max_distance;
            }
            _ => return Err(ConfigError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    fn parameters(&self) -> Vec<(String, String)> {
        vec![
            ("Weight".to_string(), self.weight.to_string()),
            (
                "Implicit surface distance measure".to_string(),
                self.measure.to_string(),
            ),
            (
                "Implicit surface distance offset".to_string(),
                self.offset.to_string(),
            ),
            ("Maximum distance".to_string(), self.max_distance.to_string()),
        ]
    }

    fn initialize(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError> {
        input.surface.validate()?;
        let extent = input.image.geometry.extent_diagonal();
        let max_distance = if self.max_distance > 0.0 {
            self.max_distance
        } else {
            input.image.max_abs()
        };
        // Marching further than across the image only samples clamped border values.
        self.march_limit = max_distance.min(extent);
        debug!(
            "{}: {} distance, offset {}, max distance {max_distance:.4}",
            self.name, self.measure, self.offset
        );
        self.resolved_max_distance = Some(max_distance);
        let n = input.surface.len();
        self.distances = match self.measure {
            DistanceMeasure::Minimum => vec![f64::INFINITY; n],
            DistanceMeasure::Normal => vec![max_distance; n],
        };
        self.normals = input.surface.normals.to_vec();
        self.revision = None;
        Ok(())
    }

    fn update(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError> {
        let max_distance = self.resolved_max_distance.ok_or(ForceError::NotInitialized)?;
        let surface = &input.surface;
        surface.validate()?;
        if surface.len() != self.distances.len() {
            return Err(ForceError::LengthMismatch {
                what: "points",
                expected: self.distances.len(),
                found: surface.len(),
            });
        }
        if self.revision == Some(surface.revision) {
            return Ok(());
        }
        let interp = LinearInterpolator::new(input.image);
        let (measure, offset, march_limit) = (self.measure, self.offset, self.march_limit);
        self.distances
            .par_iter_mut()
            .enumerate()
            .for_each(|(v, d)| {
                let p = &surface.points[v];
                *d = match measure {
                    DistanceMeasure::Minimum => minimum_distance(&interp, p, offset),
                    DistanceMeasure::Normal => {
                        normal_distance(
                        &interp,
                        p,
                        &surface.normals[v],
                        offset,
                        max_distance,
                        march_limit,
                    )
                    }
                };
            });
        self.normals.clear();
        self.normals.extend_from_slice(surface.normals);
        self.revision = Some(surface.revision);
        Ok(())
    }

    fn evaluate(&self) -> f64 {
        mean_abs_distance(&self.distances)
    }

    fn evaluate_gradient(
        &self,
        gradient: &mut [Vector3<f64>],
        weight: f64,
    ) -> Result<(), ForceError> {
        let max_distance = self.resolved_max_distance.ok_or(ForceError::NotInitialized)?;
        let n = self.distances.len();
        if gradient.len() != n {
            return Err(ForceError::LengthMismatch {
                what: "gradient",
                expected: n,
                found: gradient.len(),
            });
        }
        if n == 0 || max_distance <= 0.0 {
            return Ok(());
        }
        let scale = weight / n as f64;
        gradient
            .par_iter_mut()
            .zip(self.distances.par_iter())
            .zip(self.normals.par_iter())
            .for_each(|((g, &d), normal)| {
                if d.is_finite() {
                    *g += normal * ((d / max_distance) * scale);
                }
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Volume, VolumeGeometry};
    use crate::types::SurfaceView;

    // Signed distance to the plane x = 10.
    fn plane_distance() -> Volume {
        let geom = VolumeGeometry::new([21, 3, 3], [1.0; 3], [0.0; 3]);
        Volume::from_fn(geom, |i, _, _| i as f64 - 10.0)
    }

    #[test]
    fn measure_parsing_is_recoverable() {
        assert_eq!("NORMAL".parse(), Ok(DistanceMeasure::Normal));
        assert_eq!(
            "closest".parse::<DistanceMeasure>(),
            Err(ConfigError::UnknownDistanceMeasure("closest".into()))
        );
        let mut force = ImplicitSurfaceForce::new("implicit", 1.0);
        assert!(force
            .set_parameter("Implicit surface distance measure", "bogus")
            .is_err());
        assert_eq!(force.measure(), DistanceMeasure::Minimum);
    }

    #[test]
    fn minimum_and_normal_distances() {
        let volume = plane_distance();
        let points = [Point3::new(13.0, 1.0, 1.0), Point3::new(6.5, 1.0, 1.0)];
        let normals = [Vector3::x(), Vector3::x()];
        let input = ForceInput::new(&volume, SurfaceView::new(&points, &normals));

        let mut force = ImplicitSurfaceForce::new("implicit", 1.0);
        force.initialize(&input).unwrap();
        assert_eq!(force.max_distance(), 10.0);
        force.update(&input).unwrap();
        assert!((force.distances()[0] - 3.0).abs() < 1e-12);
        assert!((force.distances()[1] + 3.5).abs() < 1e-12);
        assert!((force.evaluate() - 3.25).abs() < 1e-12);

        force.set_parameter("Measure", "normal").unwrap();
        force.set_parameter("Offset", "1").unwrap();
        force.initialize(&input).unwrap();
        force.update(&input).unwrap();
        // Level set x = 11: 2 mm behind the first vertex, 4.5 mm ahead of the second.
        assert!((force.distances()[0] - 2.0).abs() < 1e-2);
        assert!((force.distances()[1] + 4.5).abs() < 1e-2);
    }

    #[test]
    fn infinite_maximum_distance_is_rejected() {
        let mut force = ImplicitSurfaceForce::new("implicit", 1.0);
        force.set_parameter("Maximum distance", "8").unwrap();
        assert_eq!(
            force.set_parameter("Maximum distance", "inf"),
            Err(ConfigError::InvalidValue {
                param: "Maximum distance".into(),
                value: "inf".into(),
            })
        );
        assert_eq!(force.max_distance(), 8.0);
    }

    #[test]
    fn normal_facing_away_from_level_set_stops_at_image_extent() {
        let volume = plane_distance();
        // Outside the plane with the normal pointing further out.
        let points = [Point3::new(15.0, 1.0, 1.0)];
        let normals = [-Vector3::x()];
        let input = ForceInput::new(&volume, SurfaceView::new(&points, &normals));
        let mut force = ImplicitSurfaceForce::new("implicit", 1.0);
        force.set_parameter("Measure", "normal").unwrap();
        force.set_parameter("Maximum distance", "1e300").unwrap();
        force.initialize(&input).unwrap();
        force.update(&input).unwrap();
        assert_eq!(force.distances()[0], 1e300);
    }

    #[test]
    fn gradient_pulls_towards_surface() {
        let volume = plane_distance();
        let points = [Point3::new(15.0, 1.0, 1.0)];
        let normals = [Vector3::x()];
        let input = ForceInput::new(&volume, SurfaceView::new(&points, &normals));
        let mut force = ImplicitSurfaceForce::new("implicit", 1.0);
        force.initialize(&input).unwrap();
        force.update(&input).unwrap();
        let mut g = [Vector3::zeros()];
        force.evaluate_gradient(&mut g, 1.0).unwrap();
        // Descent moves the vertex back towards x = 10.
        assert!((g[0].x - 0.5).abs() < 1e-12);
    }
}
