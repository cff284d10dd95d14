//! Configuration of the image edge distance force.
//!
//! Parameters can be set programmatically, loaded from JSON (snake_case
//! fields, every field optional) or set by string key/value pairs as read
//! from parameter files. String keys are case-insensitive and may carry one
//! of the prefixes in [`PARAMETER_PREFIXES`].

use crate::edges::{EdgeStrategy, EdgeThresholds};
use crate::error::ConfigError;
use serde::Deserialize;
use std::str::FromStr;

/// Optional prefixes of string parameter keys.
pub const PARAMETER_PREFIXES: [&str; 3] = [
    "Image edge distance ",
    "Intensity edge distance ",
    "Edge distance ",
];

/// Knobs of [`EdgeDistanceForce`](super::EdgeDistanceForce).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeDistanceParams {
    #[serde(rename = "type")]
    pub strategy: EdgeStrategy,
    /// Ray length (mm) on each side of the vertex; `<= 0` selects four voxel
    /// diagonals at initialization.
    pub max_distance: f64,
    /// Background threshold for the padding-crossing veto.
    pub padding: f64,
    /// Lower intensity bound of accepted edges. NaN is derived from the grey
    /// matter statistics for the neonatal white-surface heuristic.
    pub min_intensity: f64,
    /// Upper intensity bound of accepted edges. NaN is derived from the white
    /// matter statistics for the neonatal white-surface heuristic.
    pub max_intensity: f64,
    pub min_gradient: f64,
    /// Ring radius of the distance median filter (0 = off).
    pub median_filter_radius: usize,
    /// Gaussian-weighted distance smoothing iterations.
    pub distance_smoothing: usize,
    /// Combinatorial magnitude smoothing iterations.
    pub magnitude_smoothing: usize,
    /// Local white matter statistics window in voxels (0 = global only).
    pub white_matter_window_width: usize,
    /// Local grey matter statistics window in voxels (0 = global only).
    pub grey_matter_window_width: usize,
}

impl Default for EdgeDistanceParams {
    fn default() -> Self {
        Self {
            strategy: EdgeStrategy::Extremum,
            max_distance: 0.0,
            padding: f64::NEG_INFINITY,
            min_intensity: f64::NEG_INFINITY,
            max_intensity: f64::INFINITY,
            min_gradient: 0.0,
            median_filter_radius: 0,
            distance_smoothing: 0,
            magnitude_smoothing: 2,
            white_matter_window_width: 0,
            grey_matter_window_width: 0,
        }
    }
}

/// Lower-cased key with an optional parameter prefix removed.
pub fn normalize_key(key: &str) -> String {
    let lower = key.trim().to_lowercase();
    PARAMETER_PREFIXES
        .iter()
        .find_map(|p| lower.strip_prefix(&p.to_lowercase()).map(str::to_string))
        .unwrap_or(lower)
}

/// Parse `value` for parameter `param`, accepting `inf`, `-inf` and `nan`.
pub fn parse_value<T: FromStr>(param: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            param: param.to_string(),
            value: value.to_string(),
        })
}

fn radius_to_width(param: &str, value: &str) -> Result<usize, ConfigError> {
    let radius: usize = parse_value(param, value)?;
    Ok(2 * radius + 1)
}

impl EdgeDistanceParams {
    /// Set one parameter by name.
    pub fn set_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let name = normalize_key(key);
        match name.as_str() {
            "type" | "mode" => self.strategy = value.parse()?,
            "maximum" | "maximum distance" => self.max_distance = parse_value(key, value)?,
            "intensity threshold" | "padding" => self.padding = parse_value(key, value)?,
            "lower intensity threshold" | "lower threshold" | "lower intensity"
            | "minimum intensity" => self.min_intensity = parse_value(key, value)?,
            "upper intensity threshold" | "upper intensity" | "maximum intensity" => {
                self.max_intensity = parse_value(key, value)?
            }
            "minimum gradient" | "minimum gradient magnitude" => {
                self.min_gradient = parse_value(key, value)?
            }
            "median filtering" | "median filter radius" => {
                self.median_filter_radius = parse_value(key, value)?
            }
            "smoothing iterations" | "distance smoothing" | "distance smoothing iterations" => {
                self.distance_smoothing = parse_value(key, value)?
            }
            "magnitude smoothing" | "magnitude smoothing iterations" => {
                self.magnitude_smoothing = parse_value(key, value)?
            }
            "local white matter window width" => {
                self.white_matter_window_width = parse_value(key, value)?
            }
            "local white matter window radius" => {
                self.white_matter_window_width = radius_to_width(key, value)?
            }
            "local grey matter window width" => {
                self.grey_matter_window_width = parse_value(key, value)?
            }
            "local grey matter window radius" => {
                self.grey_matter_window_width = radius_to_width(key, value)?
            }
            "local window width" => {
                let width = parse_value(key, value)?;
                self.white_matter_window_width = width;
                self.grey_matter_window_width = width;
            }
            "local window radius" => {
                let width = radius_to_width(key, value)?;
                self.white_matter_window_width = width;
                self.grey_matter_window_width = width;
            }
            _ => return Err(ConfigError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }

    /// Current configuration as prefixed `(key, value)` pairs.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let prefix = PARAMETER_PREFIXES[0];
        let entries: [(&str, String); 11] = [
            ("Type", self.strategy.to_string()),
            ("Maximum", self.max_distance.to_string()),
            ("Intensity threshold", self.padding.to_string()),
            ("Lower intensity", self.min_intensity.to_string()),
            ("Upper intensity", self.max_intensity.to_string()),
            ("Minimum gradient magnitude", self.min_gradient.to_string()),
            ("Median filter radius", self.median_filter_radius.to_string()),
            ("Smoothing iterations", self.distance_smoothing.to_string()),
            ("Magnitude smoothing", self.magnitude_smoothing.to_string()),
            (
                "Local white matter window width",
                self.white_matter_window_width.to_string(),
            ),
            (
                "Local grey matter window width",
                self.grey_matter_window_width.to_string(),
            ),
        ];
        entries
            .into_iter()
            .map(|(k, v)| (format!("{prefix}{k}"), v))
            .collect()
    }

    pub fn thresholds(&self) -> EdgeThresholds {
        EdgeThresholds {
            padding: self.padding,
            min_intensity: self.min_intensity,
            max_intensity: self.max_intensity,
            min_gradient: self.min_gradient,
        }
    }
}
