//! Image edge distance force.
//!
//! For every vertex a ray is cast along the normal, the edge selected by the
//! configured [`EdgeStrategy`] is located on its gradient profile, and the
//! signed distance to it together with the gradient magnitude at it are
//! stored. After optional smoothing over the mesh the magnitudes are
//! normalized with pass-global statistics; the gradient of the term pulls
//! each vertex along its normal towards its edge.
//!
//! Per-vertex work is an independent parallel map with one writer per output
//! slot. Tissue statistics are computed once in [`ForceTerm::initialize`] and
//! only read afterwards.

use super::energy::mean_abs_distance;
use super::normalize::normalize_magnitudes;
use super::options::EdgeDistanceParams;
use super::projector::accumulate_normal_forces;
use super::{set_weight, ForceTerm};
use crate::diagnostics::{PassReport, TimingBreakdown};
use crate::edges::{locate_edge, EdgeStrategy, EdgeThresholds, TissuePrior};
use crate::error::{ConfigError, ForceError};
use crate::image::{nearest_voxel, LinearInterpolator, Volume, VolumeSampler};
use crate::mesh::{median_filter, smooth_values, Weighting};
use crate::sampling::RayProfileSampler;
use crate::stats::{estimate_tissue_stats, TissueClassStats, TissueStatistics};
use crate::types::{ForceInput, SurfaceView};
use log::{debug, warn};
use nalgebra::Vector3;
use rayon::prelude::*;
use std::time::Instant;

/// Number of standard deviations for derived intensity bounds.
const DERIVED_BOUND_SIGMAS: f64 = 5.0;

/// State created by `initialize` and refreshed by `update`.
#[derive(Clone, Debug)]
struct PassState {
    step: f64,
    max_distance: f64,
    thresholds: EdgeThresholds,
    tissue: TissueStatistics,
    distances: Vec<f64>,
    magnitudes: Vec<f64>,
    normals: Vec<Vector3<f64>>,
    revision: Option<u64>,
    report: PassReport,
}

/// Signed distance to and strength of the nearest relevant image edge.
#[derive(Clone, Debug)]
pub struct EdgeDistanceForce {
    name: String,
    weight: f64,
    params: EdgeDistanceParams,
    state: Option<PassState>,
}

impl EdgeDistanceForce {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self::with_params(name, weight, EdgeDistanceParams::default())
    }

    pub fn with_params(name: impl Into<String>, weight: f64, params: EdgeDistanceParams) -> Self {
        Self {
            name: name.into(),
            weight,
            params,
            state: None,
        }
    }

    pub fn params(&self) -> &EdgeDistanceParams {
        &self.params
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Ray step length (mm); a quarter voxel diagonal once initialized.
    pub fn step_length(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.step)
    }

    /// Resolved ray length (mm) on each side of the vertex.
    pub fn max_distance(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.max_distance)
    }

    /// Thresholds after derivation of NaN intensity bounds.
    pub fn thresholds(&self) -> Option<&EdgeThresholds> {
        self.state.as_ref().map(|s| &s.thresholds)
    }

    pub fn tissue_statistics(&self) -> Option<&TissueStatistics> {
        self.state.as_ref().map(|s| &s.tissue)
    }

    /// Signed edge distances (mm) of the last update.
    pub fn distances(&self) -> &[f64] {
        self.state.as_ref().map_or(&[], |s| &s.distances)
    }

    /// Normalized force magnitudes of the last update.
    pub fn magnitudes(&self) -> &[f64] {
        self.state.as_ref().map_or(&[], |s| &s.magnitudes)
    }

    pub fn report(&self) -> Option<&PassReport> {
        self.state.as_ref().map(|s| &s.report)
    }
}

fn tissue_class(
    image: &Volume,
    mask: Option<&Volume>,
    window_width: usize,
    label: &'static str,
) -> Result<TissueClassStats, ForceError> {
    match mask {
        Some(mask) => estimate_tissue_stats(image, mask, window_width, label),
        None => {
            warn!("no {label} mask, {label} statistics unavailable");
            Ok(TissueClassStats::default())
        }
    }
}

/// Fill NaN intensity bounds from tissue statistics.
fn derive_thresholds(mut thresholds: EdgeThresholds, tissue: &TissueStatistics) -> EdgeThresholds {
    if thresholds.min_intensity.is_nan() {
        let gm = &tissue.grey_matter;
        thresholds.min_intensity = gm.global_mean - DERIVED_BOUND_SIGMAS * gm.sigma();
        debug!("derived lower intensity bound {:.3}", thresholds.min_intensity);
    }
    if thresholds.max_intensity.is_nan() {
        let wm = &tissue.white_matter;
        thresholds.max_intensity = wm.global_mean + DERIVED_BOUND_SIGMAS * wm.sigma();
        debug!("derived upper intensity bound {:.3}", thresholds.max_intensity);
    }
    thresholds
}

/// Raw per-vertex distances and magnitudes; returns `(edges found, NaN edges)`.
#[allow(clippy::too_many_arguments)]
fn compute_raw_edges(
    image: &Volume,
    surface: &SurfaceView<'_>,
    strategy: EdgeStrategy,
    thresholds: &EdgeThresholds,
    tissue: &TissueStatistics,
    step: f64,
    max_distance: f64,
    distances: &mut [f64],
    magnitudes: &mut [f64],
) -> (usize, usize) {
    let interp = LinearInterpolator::new(image);
    let sampler = RayProfileSampler::new(&interp, step, max_distance)
        .with_intensity(thresholds.needs_intensity(strategy));
    let r = sampler.radius() as f64;
    let use_prior = strategy == EdgeStrategy::NeonatalWhiteSurface;

    distances
        .par_iter_mut()
        .zip(magnitudes.par_iter_mut())
        .enumerate()
        .map_init(
            || sampler.profile(),
            |profile, (v, (d, m))| {
                if !surface.is_active(v) {
                    *d = 0.0;
                    *m = 0.0;
                    return (0, 0);
                }
                let p = &surface.points[v];
                sampler.sample(p, &surface.normals[v], profile);
                let prior = if use_prior {
                    TissuePrior::at_voxel(tissue, nearest_voxel(&interp.world_to_image(p)))
                } else {
                    TissuePrior::unknown()
                };
                let g = profile.gradient();
                let j = locate_edge(strategy, g, profile.intensity(), thresholds, &prior);
                *d = (j as f64 - r) * step;
                let nan = g[j].is_nan();
                *m = if nan { 0.0 } else { g[j].abs() };
                (usize::from(j != profile.center()), usize::from(nan))
            },
        )
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
}

impl PassState {
    /// Median filtering and smoothing over mesh connectivity.
    fn smooth(&mut self, params: &EdgeDistanceParams, surface: &SurfaceView<'_>, timings: &mut TimingBreakdown) {
        let requested = params.median_filter_radius > 0
            || params.distance_smoothing > 0
            || params.magnitude_smoothing > 0;
        let Some(edges) = surface.edges else {
            if requested {
                warn!("surface has no edge table, skipping edge distance smoothing");
            }
            return;
        };
        if params.median_filter_radius > 0 {
            let start = Instant::now();
            self.distances = median_filter(&self.distances, edges, params.median_filter_radius);
            timings.record("edge distance median filtering", start);
        }
        if params.distance_smoothing > 0 {
            let start = Instant::now();
            self.distances = smooth_values(
                &self.distances,
                surface.points,
                edges,
                params.distance_smoothing,
                Weighting::Gaussian,
            );
            timings.record("edge distance smoothing", start);
        }
        if params.magnitude_smoothing > 0 {
            let start = Instant::now();
            self.magnitudes = smooth_values(
                &self.magnitudes,
                surface.points,
                edges,
                params.magnitude_smoothing,
                Weighting::Combinatorial,
            );
            timings.record("edge magnitude smoothing", start);
        }
    }
}

impl ForceTerm for EdgeDistanceForce {
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
        self.params.set_parameter(key, value)
    }

    fn parameters(&self) -> Vec<(String, String)> {
        let mut params = vec![("Weight".to_string(), self.weight.to_string())];
        params.extend(self.params.parameters());
        params
    }

    fn initialize(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError> {
        let surface = &input.surface;
        surface.validate()?;
        let image = input.image;
        let res = image.geometry.voxel_diagonal();
        let step = 0.25 * res;
        let mut max_distance = if self.params.max_distance > 0.0 {
            self.params.max_distance
        } else {
            4.0 * res
        };
        let extent = image.geometry.extent_diagonal();
        if max_distance > extent {
            warn!(
                "{}: maximum distance {max_distance} mm exceeds the image extent, using {extent:.4} mm",
                self.name
            );
            max_distance = extent;
        }

        let mut tissue = TissueStatistics::default();
        let mut thresholds = self.params.thresholds();
        if self.params.strategy == EdgeStrategy::NeonatalWhiteSurface {
            tissue.white_matter = tissue_class(
                image,
                input.white_matter_mask,
                self.params.white_matter_window_width,
                "white matter",
            )?;
            tissue.grey_matter = tissue_class(
                image,
                input.grey_matter_mask,
                self.params.grey_matter_window_width,
                "grey matter",
            )?;
            thresholds = derive_thresholds(thresholds, &tissue);
        }
        debug!(
            "{}: {} vertices, strategy {}, step {step:.4} mm, max distance {max_distance:.4} mm",
            self.name,
            surface.len(),
            self.params.strategy
        );

        let n = surface.len();
        self.state = Some(PassState {
            step,
            max_distance,
            thresholds,
            tissue,
            distances: vec![0.0; n],
            magnitudes: vec![0.0; n],
            normals: surface.normals.to_vec(),
            revision: None,
            report: PassReport {
                vertex_count: n,
                ..PassReport::default()
            },
        });
        Ok(())
    }

    fn update(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError> {
        let state = self.state.as_mut().ok_or(ForceError::NotInitialized)?;
        let surface = &input.surface;
        surface.validate()?;
        if surface.len() != state.distances.len() {
            return Err(ForceError::LengthMismatch {
                what: "points",
                expected: state.distances.len(),
                found: surface.len(),
            });
        }
        if state.revision == Some(surface.revision) {
            debug!("{}: surface revision {} unchanged", self.name, surface.revision);
            return Ok(());
        }

        let pass_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let start = Instant::now();
        let (edges_found, nan_edges) = compute_raw_edges(
            input.image,
            surface,
            self.params.strategy,
            &state.thresholds,
            &state.tissue,
            state.step,
            state.max_distance,
            &mut state.distances,
            &mut state.magnitudes,
        );
        timings.record("computing edge distances", start);

        state.smooth(&self.params, surface, &mut timings);

        let start = Instant::now();
        let active = surface.active_mask();
        let stats = normalize_magnitudes(&state.distances, &mut state.magnitudes, &active);
        timings.record("computing edge force magnitude", start);

        let start = Instant::now();
        let energy = mean_abs_distance(&state.distances);
        timings.record("edge distance energy", start);

        state.normals.clear();
        state.normals.extend_from_slice(surface.normals);
        state.revision = Some(surface.revision);
        timings.total_ms = crate::diagnostics::elapsed_ms(pass_start);
        state.report = PassReport {
            vertex_count: surface.len(),
            active_count: active.iter().filter(|&&a| a).count(),
            edges_found,
            nan_edges,
            dmax: stats.dmax,
            mavg: stats.mavg,
            energy,
            degenerate: stats.is_degenerate(),
            timings,
        };
        Ok(())
    }

    fn evaluate(&self) -> f64 {
        self.state
            .as_ref()
            .map_or(0.0, |s| mean_abs_distance(&s.distances))
    }

    fn evaluate_gradient(
        &self,
        gradient: &mut [Vector3<f64>],
        weight: f64,
    ) -> Result<(), ForceError> {
        let state = self.state.as_ref().ok_or(ForceError::NotInitialized)?;
        let n = state.magnitudes.len();
        if gradient.len() != n {
            return Err(ForceError::LengthMismatch {
                what: "gradient",
                expected: n,
                found: gradient.len(),
            });
        }
        if n == 0 {
            return Ok(());
        }
        accumulate_normal_forces(&state.normals, &state.magnitudes, gradient, weight / n as f64);
        Ok(())
    }
}
