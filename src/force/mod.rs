//! External force terms of a deformable surface model.
//!
//! A force term is configured by string parameters, initialized once with
//! the image and the initial surface, then updated once per optimizer
//! iteration. After an update it reports its energy and adds its weighted
//! gradient to a buffer shared with the other terms.

pub mod edge_distance;
pub mod energy;
pub mod implicit;
pub mod normalize;
pub mod options;
pub mod projector;
pub mod registry;

pub use edge_distance::EdgeDistanceForce;
pub use implicit::{DistanceMeasure, ImplicitSurfaceForce};
pub use normalize::PassStatistics;
pub use options::EdgeDistanceParams;
pub use registry::{register_builtin_forces, ForceRegistry};

use crate::error::{ConfigError, ForceError};
use crate::types::ForceInput;
use nalgebra::Vector3;

/// Capabilities of a surface force term.
pub trait ForceTerm: Send {
    fn name(&self) -> &str;

    /// Weight of the term in the total energy.
    fn weight(&self) -> f64;

    /// Set a parameter by (case-insensitive, optionally prefixed) name.
    fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Current parameters as `(key, value)` pairs.
    fn parameters(&self) -> Vec<(String, String)>;

    /// Prepare for evaluation with the given image and initial surface.
    fn initialize(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError>;

    /// Recompute per-vertex state for the current surface snapshot.
    fn update(&mut self, input: &ForceInput<'_>) -> Result<(), ForceError>;

    /// Unweighted energy of the last update.
    fn evaluate(&self) -> f64;

    /// Add `weight / n` times the per-vertex energy gradient to `gradient`.
    fn evaluate_gradient(&self, gradient: &mut [Vector3<f64>], weight: f64)
        -> Result<(), ForceError>;
}

/// Handle the `Weight` parameter shared by all force terms.
pub(crate) fn set_weight(weight: &mut f64, key: &str, value: &str) -> Result<bool, ConfigError> {
    if options::normalize_key(key) == "weight" {
        *weight = options::parse_value(key, value)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
